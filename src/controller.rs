//! Run controller: one pass over every registered user.
//!
//! Users are handled strictly one after another. The registry snapshot is
//! the only state shared between them; it is loaded once, lent to the
//! playlist orchestrators of each user, and written back in full after every
//! processed user. A failure therefore loses at most the user that was in
//! flight.

use std::{fmt, sync::Arc};

use chrono::NaiveDate;

use crate::{
    Res,
    config::{Config, CredentialSource, EnvCredentials},
    info,
    management::{RegistryManager, TokenManager, UserList},
    playlist::CategorySync,
    spotify::{SessionFactory, SpotifySessions},
    storage::{self, ObjectStore},
    success,
    types::Category,
    utils, warning,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingCredentials,
    MissingTokenCache,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingCredentials => f.write_str("missing credentials"),
            SkipReason::MissingTokenCache => f.write_str("missing token cache"),
        }
    }
}

/// Which users a run processed and which it skipped, in list order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub processed: Vec<String>,
    pub skipped: Vec<(String, SkipReason)>,
}

pub struct RunController {
    config: Config,
    store: Arc<dyn ObjectStore>,
    sessions: Box<dyn SessionFactory>,
    credentials: Box<dyn CredentialSource>,
    date: Option<NaiveDate>,
}

impl RunController {
    pub fn new(
        config: Config,
        store: Arc<dyn ObjectStore>,
        sessions: Box<dyn SessionFactory>,
        credentials: Box<dyn CredentialSource>,
    ) -> Self {
        Self {
            config,
            store,
            sessions,
            credentials,
            date: None,
        }
    }

    /// Wires the production collaborators: the store selected by the
    /// configuration, real Spotify sessions and credentials from the
    /// environment.
    pub async fn from_config(config: Config) -> Res<Self> {
        config.validate()?;
        let store = storage::open(&config).await?;
        let sessions = SpotifySessions::new(config.clone(), Arc::clone(&store));
        Ok(Self::new(
            config,
            store,
            Box::new(sessions),
            Box::new(EnvCredentials),
        ))
    }

    /// Fixes the date used in playlist descriptions instead of today.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Processes every user of the user list.
    ///
    /// A user without credentials or without a token cache is skipped and
    /// leaves no trace in the registry. Any other failure stops the run and
    /// is returned; users processed before it keep their persisted state.
    pub async fn run(&self) -> Res<RunReport> {
        let bucket = self.config.bucket.as_str();
        let store = self.store.as_ref();

        let users = UserList::load(store, bucket, &self.config.users_key).await?;
        let mut registry = RegistryManager::load(store, bucket, &self.config.registry_key).await?;
        let today = self.date.unwrap_or_else(utils::today);

        info!("Processing {} users.", users.len());
        let mut report = RunReport::default();

        for user_id in users.iter() {
            let is_new = registry.is_new_user(user_id);
            if is_new {
                registry.make_new_user(user_id);
            }

            let Some(credentials) = self.credentials.credentials(user_id) else {
                warning!(
                    "Skipping {} because no client id or client secret was found.",
                    user_id
                );
                if is_new {
                    registry.remove_user(user_id);
                }
                report
                    .skipped
                    .push((user_id.to_string(), SkipReason::MissingCredentials));
                continue;
            };

            let Some(token) = TokenManager::load_cached(store, bucket, user_id).await? else {
                warning!(
                    "No token cache for {}. Please authenticate this user first with `topsync auth --user {}`.",
                    user_id,
                    user_id
                );
                if is_new {
                    registry.remove_user(user_id);
                }
                report
                    .skipped
                    .push((user_id.to_string(), SkipReason::MissingTokenCache));
                continue;
            };

            let api = self.sessions.open(user_id, credentials, token).await?;
            let user = api.current_user().await?;
            success!(
                "user_id: {}, username: {} is now logged in.",
                user_id,
                user.display_name.as_deref().unwrap_or(&user.id)
            );

            for category in Category::ALL {
                CategorySync::new(api.as_ref(), category, &self.config)
                    .run(user_id, &user, &mut registry, today)
                    .await?;
            }

            registry
                .persist(store, bucket, &self.config.registry_key)
                .await?;
            report.processed.push(user_id.to_string());
        }

        Ok(report)
    }
}
