//! Spotify Top Playlists Sync Library
//!
//! This library keeps a set of "top tracks" and "top artists' tracks"
//! playlists up to date for several Spotify users. Per-user state (the
//! playlist URIs created so far and each user's OAuth token cache) lives in
//! object storage, so every invocation starts from scratch and picks up where
//! the previous one stopped.
//!
//! # Modules
//!
//! - `api` - HTTP endpoints of the local OAuth callback server
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration structure and environment loading
//! - `controller` - Run controller iterating over all registered users
//! - `error` - Crate error type
//! - `handler` - Invocation wrapper mapping a run to a status response
//! - `management` - Registry, user list and token cache documents
//! - `playlist` - Playlist reconciliation and per-category orchestration
//! - `server` - Local HTTP server for OAuth callbacks
//! - `spotify` - Spotify Web API capability trait and reqwest adapter
//! - `storage` - Object storage abstraction (S3, local filesystem)
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use topsync::{config, controller::RunController, handler};
//!
//! #[tokio::main]
//! async fn main() -> topsync::Res<()> {
//!     config::load_env().await?;
//!     let config = config::Config::from_env()?;
//!     let controller = RunController::from_config(config).await?;
//!     let response = handler::invoke(&controller).await;
//!     println!("{}", response.to_json());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod handler;
pub mod management;
pub mod playlist;
pub mod server;
pub mod spotify;
pub mod storage;
pub mod types;
pub mod utils;

pub use error::Error;

/// A convenient Result type alias for operations that may fail.
///
/// Every fallible operation in the crate reports a [`Error`]. Skips that the
/// run controller recovers from (missing credentials, missing token cache)
/// are not errors and never travel through this type.
pub type Res<T> = std::result::Result<T, Error>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Loading registry from {}", key);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Playlist {} modified", uri);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only used for start-up failures where nothing has been done yet. Errors
/// raised while users are processed go through [`failure!`] instead so the
/// invocation handler can still build its response.
///
/// # Example
///
/// ```
/// error!("Failed to load configuration: {}", e);
/// // Program exits here
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints an error message with a red exclamation mark without exiting.
#[macro_export]
macro_rules! failure {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for recoverable situations such as a user being skipped because
/// credentials or a token cache are missing.
///
/// # Example
///
/// ```
/// warning!("Skipping {} because no client id or client secret was found.", user_id);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
