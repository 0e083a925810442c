mod common;

use std::{collections::HashMap, sync::Arc};

use chrono::{NaiveDate, Utc};
use common::{BUCKET, credentials, token_json};
use topsync::{
    Error,
    config::{Config, CredentialSource, StaticCredentials, StoreKind},
    handler,
    management::TokenManager,
    spotify::auth::{authorize_url, token_from_response},
    storage::MemoryStore,
    types::{Category, TimeRange, Token, TokenResponse},
    utils::*,
};

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name: &str| map.get(name).cloned()
}

fn token(expires_at: i64) -> Token {
    Token {
        access_token: "access".to_string(),
        token_type: "Bearer".to_string(),
        expires_in: 3600,
        scope: String::new(),
        expires_at,
        refresh_token: "refresh".to_string(),
    }
}

#[test]
fn test_generate_state() {
    let state = generate_state();

    assert_eq!(state.len(), 32);
    assert!(state.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_ne!(state, generate_state());
}

#[test]
fn test_playlist_id_from_uri() {
    assert_eq!(
        playlist_id("spotify:playlist:37i9dQZF1DXcBWIGoYBM5M").unwrap(),
        "37i9dQZF1DXcBWIGoYBM5M"
    );
    assert_eq!(playlist_id("37i9dQZF1DX").unwrap(), "37i9dQZF1DX");
}

#[test]
fn test_playlist_id_rejects_other_uris() {
    for uri in [
        "",
        "spotify:playlist:",
        "spotify:track:abc",
        "https://open.spotify.com/playlist/abc",
        "spotify:playlist:../x",
    ] {
        assert!(
            matches!(playlist_id(uri), Err(Error::InvalidUri(_))),
            "{uri}"
        );
    }
}

#[test]
fn test_playlist_description() {
    let date = NaiveDate::from_ymd_opt(2024, 2, 5).unwrap();
    assert_eq!(
        playlist_description(TimeRange::MediumTerm, date),
        "my medium_term playlist on 2024-02-05"
    );
}

#[test]
fn test_playlist_names() {
    assert_eq!(
        Category::TopTracks.playlist_name(TimeRange::ShortTerm),
        "short_term top tracks"
    );
    assert_eq!(
        Category::TopArtistsTracks.playlist_name(TimeRange::LongTerm),
        "long_term top artists tracks"
    );
}

#[test]
fn test_config_defaults() {
    let config = Config::from_lookup(lookup(&[("TOPSYNC_BUCKET", "bucket")])).unwrap();

    assert_eq!(config.top_track_count, 20);
    assert_eq!(config.top_artist_count, 20);
    assert_eq!(config.users_key, "playlist_update_users.json");
    assert_eq!(config.registry_key, "playlists_info.json");
    assert_eq!(config.market, "US");
    assert_eq!(config.store, StoreKind::S3);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_from_variables() {
    let config = Config::from_lookup(lookup(&[
        ("TOPSYNC_TOP_TRACK_NUM", "10"),
        ("TOPSYNC_TOP_ARTIST_NUM", " 5 "),
        ("TOPSYNC_STORE", "fs"),
        ("TOPSYNC_STORE_ROOT", "/tmp/topsync"),
        ("TOPSYNC_MARKET", "DE"),
        ("TOPSYNC_USERS_KEY", "users.json"),
    ]))
    .unwrap();

    assert_eq!(config.top_track_count, 10);
    assert_eq!(config.top_artist_count, 5);
    assert_eq!(config.store, StoreKind::Fs);
    assert_eq!(config.store_root, std::path::PathBuf::from("/tmp/topsync"));
    assert_eq!(config.market, "DE");
    assert_eq!(config.users_key, "users.json");
    // the filesystem store does not need a bucket
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_rejects_bad_values() {
    assert!(Config::from_lookup(lookup(&[("TOPSYNC_TOP_TRACK_NUM", "many")])).is_err());
    assert!(Config::from_lookup(lookup(&[("TOPSYNC_STORE", "ftp")])).is_err());

    let no_bucket = Config::from_lookup(lookup(&[])).unwrap();
    assert!(matches!(no_bucket.validate(), Err(Error::Config(_))));

    let too_many =
        Config::from_lookup(lookup(&[("TOPSYNC_BUCKET", "b"), ("TOPSYNC_TOP_ARTIST_NUM", "51")]))
            .unwrap();
    assert!(too_many.validate().is_err());

    let zero =
        Config::from_lookup(lookup(&[("TOPSYNC_BUCKET", "b"), ("TOPSYNC_TOP_TRACK_NUM", "0")]))
            .unwrap();
    assert!(zero.validate().is_err());
}

#[test]
fn test_credentials_lookup() {
    let creds = StaticCredentials::new().with_user("42", credentials());

    assert_eq!(creds.credentials("42"), Some(credentials()));
    assert_eq!(creds.credentials("43"), None);

    let manual = StaticCredentials::new()
        .set("E7ClientId", "id")
        .set("E7ClientSecret", "secret")
        .set("E7RedirectUrl", "http://localhost/callback");
    assert_eq!(manual.credentials("7").unwrap().client_id, "id");
}

#[test]
fn test_token_cache_format() {
    let token: Token = serde_json::from_str(token_json()).unwrap();

    assert_eq!(token.access_token, "BQC-access");
    assert_eq!(token.expires_at, 4102444800);

    let value = serde_json::to_value(&token).unwrap();
    for field in [
        "access_token",
        "token_type",
        "expires_in",
        "scope",
        "expires_at",
        "refresh_token",
    ] {
        assert!(value.get(field).is_some(), "{field}");
    }
}

#[test]
fn test_token_expiry_margin() {
    let store = Arc::new(MemoryStore::new());
    let manager = TokenManager::new(
        token(10_000),
        credentials(),
        store,
        BUCKET.to_string(),
        TokenManager::cache_key("alice"),
        "http://127.0.0.1:1/token".to_string(),
    );

    assert!(!manager.is_expired(9_000));
    assert!(!manager.is_expired(9_759));
    assert!(manager.is_expired(9_760));
    assert!(manager.is_expired(10_001));
}

#[tokio::test]
async fn test_valid_token_is_not_refreshed() {
    let store = Arc::new(MemoryStore::new());
    let mut manager = TokenManager::new(
        token(Utc::now().timestamp() + 3600),
        credentials(),
        store.clone(),
        BUCKET.to_string(),
        TokenManager::cache_key("alice"),
        "http://127.0.0.1:1/token".to_string(),
    );

    assert_eq!(manager.get_valid_token().await.unwrap(), "access");
    assert!(store.writes().is_empty());
}

#[tokio::test]
async fn test_load_cached_token() {
    let store = MemoryStore::new();
    assert!(TokenManager::load_cached(&store, BUCKET, "alice")
        .await
        .unwrap()
        .is_none());

    store.insert(BUCKET, ".cache-alice", "{}");
    assert!(TokenManager::load_cached(&store, BUCKET, "alice")
        .await
        .unwrap()
        .is_none());

    store.insert(BUCKET, ".cache-alice", token_json());
    let token = TokenManager::load_cached(&store, BUCKET, "alice")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(token.refresh_token, "AQD-refresh");
}

#[test]
fn test_token_from_response_keeps_previous_refresh_token() {
    let body = TokenResponse {
        access_token: "new".to_string(),
        token_type: "Bearer".to_string(),
        expires_in: 3600,
        scope: None,
        refresh_token: None,
    };
    let before = Utc::now().timestamp();

    let token = token_from_response(body, Some("old-refresh")).unwrap();

    assert_eq!(token.access_token, "new");
    assert_eq!(token.refresh_token, "old-refresh");
    assert!(token.expires_at >= before + 3600);
}

#[test]
fn test_token_from_response_requires_refresh_token() {
    let body = TokenResponse {
        access_token: "new".to_string(),
        token_type: "Bearer".to_string(),
        expires_in: 3600,
        scope: None,
        refresh_token: None,
    };

    assert!(matches!(
        token_from_response(body, None),
        Err(Error::Auth(_))
    ));
}

#[test]
fn test_authorize_url() {
    let url = authorize_url(
        "https://accounts.spotify.com/authorize",
        &credentials(),
        "abc123",
    )
    .unwrap();

    assert!(url.starts_with("https://accounts.spotify.com/authorize?"));
    assert!(url.contains("client_id=client"));
    assert!(url.contains("response_type=code"));
    assert!(url.contains("state=abc123"));
    assert!(url.contains("user-top-read"));
}

#[test]
fn test_respond_success() {
    let response = handler::respond(Ok(()));

    assert_eq!(response.status_code, 200);
    assert_eq!(response.body, r#"{"message":"Success"}"#);
}

#[test]
fn test_respond_failure() {
    let response = handler::respond(Err(Error::Storage("bucket is gone".to_string())));

    assert_eq!(response.status_code, 500);
    let body: serde_json::Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(body["error"], "storage error: bucket is gone");
    assert_eq!(body["traceback"], "storage error: bucket is gone");

    let wrapper: serde_json::Value = serde_json::from_str(&response.to_json()).unwrap();
    assert_eq!(wrapper["statusCode"], 500);
}

#[test]
fn test_error_trace_lists_causes() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let error = Error::from(io);

    let trace = error.trace();

    assert!(trace.starts_with("io error: denied"));
}
