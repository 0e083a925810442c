//! Error type shared by every module of the crate.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("spotify api returned {status}: {message}")]
    Api { status: StatusCode, message: String },
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("auth error: {0}")]
    Auth(String),
    #[error("batch of {0} items exceeds the limit of {max}", max = crate::playlist::MAX_BATCH_SIZE)]
    BatchTooLarge(usize),
    #[error("invalid spotify uri: {0}")]
    InvalidUri(String),
}

impl Error {
    /// Renders the error followed by every underlying cause, one per line.
    ///
    /// The invocation handler reports this as the diagnostic trace of a
    /// failed run.
    pub fn trace(&self) -> String {
        let mut lines = vec![self.to_string()];
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            lines.push(format!("caused by: {cause}"));
            source = cause.source();
        }
        lines.join("\n")
    }
}
