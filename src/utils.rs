use chrono::{Local, NaiveDate};
use rand::{Rng, distr::Alphanumeric};

use crate::{Error, Res, types::TimeRange};

/// Random value for the `state` parameter of the authorize request.
pub fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Extracts the playlist id from `spotify:playlist:<id>`. A bare id is
/// returned unchanged.
pub fn playlist_id(uri: &str) -> Res<&str> {
    let id = match uri.strip_prefix("spotify:playlist:") {
        Some(id) => id,
        None if !uri.contains(':') && !uri.contains('/') => uri,
        None => return Err(Error::InvalidUri(uri.to_string())),
    };

    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(Error::InvalidUri(uri.to_string()));
    }
    Ok(id)
}

pub fn playlist_description(range: TimeRange, date: NaiveDate) -> String {
    format!("my {range} playlist on {}", date.format("%Y-%m-%d"))
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
