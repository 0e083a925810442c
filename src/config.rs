//! Configuration management for topsync.
//!
//! All tunables live in one [`Config`] value that is built once at start-up
//! and handed to the run controller. Values come from three layers:
//!
//! 1. Command-line flags (highest priority, applied by the CLI)
//! 2. Environment variables, optionally loaded from a `.env` file in the
//!    local data directory
//! 3. Built-in defaults
//!
//! Per-user Spotify credentials are not part of [`Config`]; they are looked
//! up for each user through a [`CredentialSource`].

use std::{collections::HashMap, env, path::PathBuf, str::FromStr};

use crate::{Error, Res};

pub const DEFAULT_TOP_TRACK_NUM: u32 = 20;
pub const DEFAULT_TOP_ARTIST_NUM: u32 = 20;
pub const DEFAULT_USERS_KEY: &str = "playlist_update_users.json";
pub const DEFAULT_REGISTRY_KEY: &str = "playlists_info.json";
pub const DEFAULT_MARKET: &str = "US";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";

pub const SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";
pub const SPOTIFY_API_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const SPOTIFY_API_AUTH_URL: &str = "https://accounts.spotify.com/authorize";

/// Scopes requested when a user authorizes topsync.
pub const SPOTIFY_SCOPE: &str = "user-top-read user-read-private playlist-read-private playlist-modify-private playlist-modify-public";

/// Loads environment variables from a `.env` file in the local data directory.
///
/// The file is looked up at `<data_local_dir>/topsync/.env`. A missing file
/// is not an error: deployments such as scheduled functions provide the
/// variables directly and may not have a writable data directory at all.
/// Nothing is created on disk.
///
/// # Errors
///
/// Returns an error if an existing `.env` file cannot be parsed.
pub async fn load_env() -> Res<()> {
    let Some(mut path) = dirs::data_local_dir() else {
        return Ok(());
    };
    path.push("topsync/.env");

    let is_file = async_fs::metadata(&path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false);
    if is_file {
        dotenv::from_path(&path).map_err(|e| Error::Config(e.to_string()))?;
    }
    Ok(())
}

/// Where storage documents are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    S3,
    Fs,
}

impl FromStr for StoreKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s3" => Ok(StoreKind::S3),
            "fs" | "file" | "local" => Ok(StoreKind::Fs),
            other => Err(Error::Config(format!("unknown store backend: {other}"))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Number of top tracks fetched per time range.
    pub top_track_count: u32,
    /// Number of top artists fetched per time range.
    pub top_artist_count: u32,
    pub bucket: String,
    pub users_key: String,
    pub registry_key: String,
    /// Market passed to the artist top-tracks endpoint.
    pub market: String,
    pub store: StoreKind,
    /// Root directory of the filesystem store.
    pub store_root: PathBuf,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
    pub api_url: String,
    pub token_url: String,
    pub authorize_url: String,
    pub server_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            top_track_count: DEFAULT_TOP_TRACK_NUM,
            top_artist_count: DEFAULT_TOP_ARTIST_NUM,
            bucket: String::new(),
            users_key: DEFAULT_USERS_KEY.to_string(),
            registry_key: DEFAULT_REGISTRY_KEY.to_string(),
            market: DEFAULT_MARKET.to_string(),
            store: StoreKind::S3,
            store_root: default_store_root(),
            s3_region: None,
            s3_endpoint: None,
            api_url: SPOTIFY_API_URL.to_string(),
            token_url: SPOTIFY_API_TOKEN_URL.to_string(),
            authorize_url: SPOTIFY_API_AUTH_URL.to_string(),
            server_addr: DEFAULT_SERVER_ADDRESS.to_string(),
        }
    }
}

impl Config {
    /// Builds a configuration from `TOPSYNC_*` and related environment
    /// variables, falling back to defaults for anything unset.
    ///
    /// The result is not validated yet so that command-line overrides can be
    /// applied first; call [`Config::validate`] before using it.
    ///
    /// # Errors
    ///
    /// Fails if a numeric variable does not parse or the store backend is
    /// unknown.
    pub fn from_env() -> Res<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`Config::from_env`] but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Res<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Config::default();

        let parse_count = |name: &str, default: u32| -> Res<u32> {
            match get(name) {
                Some(v) => v
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| Error::Config(format!("{name} must be a positive integer"))),
                None => Ok(default),
            }
        };

        let config = Config {
            top_track_count: parse_count("TOPSYNC_TOP_TRACK_NUM", defaults.top_track_count)?,
            top_artist_count: parse_count("TOPSYNC_TOP_ARTIST_NUM", defaults.top_artist_count)?,
            bucket: get("TOPSYNC_BUCKET").unwrap_or(defaults.bucket),
            users_key: get("TOPSYNC_USERS_KEY").unwrap_or(defaults.users_key),
            registry_key: get("TOPSYNC_REGISTRY_KEY").unwrap_or(defaults.registry_key),
            market: get("TOPSYNC_MARKET").unwrap_or(defaults.market),
            store: match get("TOPSYNC_STORE") {
                Some(v) => v.parse()?,
                None => defaults.store,
            },
            store_root: get("TOPSYNC_STORE_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.store_root),
            s3_region: get("S3_REGION"),
            s3_endpoint: get("S3_ENDPOINT"),
            api_url: get("SPOTIFY_API_URL").unwrap_or(defaults.api_url),
            token_url: get("SPOTIFY_API_TOKEN_URL").unwrap_or(defaults.token_url),
            authorize_url: get("SPOTIFY_API_AUTH_URL").unwrap_or(defaults.authorize_url),
            server_addr: get("SERVER_ADDRESS").unwrap_or(defaults.server_addr),
        };

        Ok(config)
    }

    /// Checks the invariants the rest of the crate relies on.
    pub fn validate(&self) -> Res<()> {
        if self.top_track_count == 0 || self.top_track_count > 50 {
            return Err(Error::Config(
                "top track count must be between 1 and 50".to_string(),
            ));
        }
        if self.top_artist_count == 0 || self.top_artist_count > 50 {
            return Err(Error::Config(
                "top artist count must be between 1 and 50".to_string(),
            ));
        }
        if self.store == StoreKind::S3 && self.bucket.trim().is_empty() {
            return Err(Error::Config(
                "TOPSYNC_BUCKET must be set for the s3 store".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_store_root() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("topsync/store");
    path
}

/// Spotify application credentials of one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
}

/// Resolves per-user credentials.
pub trait CredentialSource: Send + Sync {
    /// Returns `None` when any of the three values is missing.
    fn credentials(&self, user_id: &str) -> Option<Credentials>;
}

pub fn client_id_var(user_id: &str) -> String {
    format!("E{user_id}ClientId")
}

pub fn client_secret_var(user_id: &str) -> String {
    format!("E{user_id}ClientSecret")
}

pub fn redirect_url_var(user_id: &str) -> String {
    format!("E{user_id}RedirectUrl")
}

fn resolve_credentials<F>(user_id: &str, lookup: F) -> Option<Credentials>
where
    F: Fn(&str) -> Option<String>,
{
    Some(Credentials {
        client_id: lookup(&client_id_var(user_id))?,
        client_secret: lookup(&client_secret_var(user_id))?,
        redirect_url: lookup(&redirect_url_var(user_id))?,
    })
}

/// Reads `E{user_id}ClientId`, `E{user_id}ClientSecret` and
/// `E{user_id}RedirectUrl` from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentials;

impl CredentialSource for EnvCredentials {
    fn credentials(&self, user_id: &str) -> Option<Credentials> {
        resolve_credentials(user_id, |name| env::var(name).ok())
    }
}

/// Credentials held in memory under the same variable names as
/// [`EnvCredentials`] uses.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    vars: HashMap<String, String>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user_id: &str, credentials: Credentials) -> Self {
        self.vars
            .insert(client_id_var(user_id), credentials.client_id);
        self.vars
            .insert(client_secret_var(user_id), credentials.client_secret);
        self.vars
            .insert(redirect_url_var(user_id), credentials.redirect_url);
        self
    }

    pub fn set(mut self, name: &str, value: &str) -> Self {
        self.vars.insert(name.to_string(), value.to_string());
        self
    }
}

impl CredentialSource for StaticCredentials {
    fn credentials(&self, user_id: &str) -> Option<Credentials> {
        resolve_credentials(user_id, |name| self.vars.get(name).cloned())
    }
}
