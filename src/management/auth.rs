use std::sync::Arc;

use chrono::Utc;
use reqwest::Client;
use serde_json::Value;

use crate::{
    Res,
    config::Credentials,
    spotify,
    storage::{self, ObjectStore},
    types::Token,
};

/// Seconds before the real expiry at which a token is already refreshed.
const EXPIRY_MARGIN_SECS: i64 = 240;

/// Owns one user's OAuth token and keeps its cache object in sync.
pub struct TokenManager {
    token: Token,
    credentials: Credentials,
    store: Arc<dyn ObjectStore>,
    bucket: String,
    key: String,
    token_url: String,
    http: Client,
}

impl TokenManager {
    pub fn new(
        token: Token,
        credentials: Credentials,
        store: Arc<dyn ObjectStore>,
        bucket: String,
        key: String,
        token_url: String,
    ) -> Self {
        TokenManager {
            token,
            credentials,
            store,
            bucket,
            key,
            token_url,
            http: Client::new(),
        }
    }

    /// Storage key of a user's token cache.
    pub fn cache_key(user_id: &str) -> String {
        format!(".cache-{user_id}")
    }

    /// Reads a cached token. A missing object and an empty document both
    /// mean "no cache".
    pub async fn load_cached(store: &dyn ObjectStore, bucket: &str, user_id: &str) -> Res<Option<Token>> {
        let key = Self::cache_key(user_id);
        let value: Option<Value> = storage::load_optional(store, bucket, &key).await?;

        match value {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(map)) if map.is_empty() => Ok(None),
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
        }
    }

    pub async fn persist(&self) -> Res<()> {
        storage::save_document(self.store.as_ref(), &self.bucket, &self.key, &self.token).await
    }

    /// Returns an access token that is valid for at least a few minutes,
    /// refreshing and re-persisting the cache first if necessary.
    pub async fn get_valid_token(&mut self) -> Res<String> {
        if self.is_expired(Utc::now().timestamp()) {
            self.token = spotify::auth::refresh_token(
                &self.http,
                &self.token_url,
                &self.credentials,
                &self.token.refresh_token,
            )
            .await?;
            self.persist().await?;
        }

        Ok(self.token.access_token.clone())
    }

    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.token.expires_at - EXPIRY_MARGIN_SECS
    }
}
