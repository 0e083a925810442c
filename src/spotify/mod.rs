//! # Spotify Integration Module
//!
//! This module is the only place that talks to the Spotify Web API. The rest
//! of the crate sees Spotify through the [`SpotifyApi`] trait, which lists
//! exactly the operations topsync consumes:
//!
//! | Operation                   | Endpoint                          |
//! |-----------------------------|-----------------------------------|
//! | [`current_user`]            | `GET /me`                         |
//! | [`my_playlists`]            | `GET /me/playlists`               |
//! | [`create_playlist`]         | `POST /users/{id}/playlists`      |
//! | [`change_playlist_details`] | `PUT /playlists/{id}`             |
//! | [`remove_items`]            | `DELETE /playlists/{id}/tracks`   |
//! | [`add_items`]               | `POST /playlists/{id}/tracks`     |
//! | [`playlist_items`]          | `GET /playlists/{id}/tracks`      |
//! | [`top_tracks`]              | `GET /me/top/tracks`              |
//! | [`top_artists`]             | `GET /me/top/artists`             |
//! | [`artist_top_tracks`]       | `GET /artists/{id}/top-tracks`    |
//!
//! [`current_user`]: SpotifyApi::current_user
//! [`my_playlists`]: SpotifyApi::my_playlists
//! [`create_playlist`]: SpotifyApi::create_playlist
//! [`change_playlist_details`]: SpotifyApi::change_playlist_details
//! [`remove_items`]: SpotifyApi::remove_items
//! [`add_items`]: SpotifyApi::add_items
//! [`playlist_items`]: SpotifyApi::playlist_items
//! [`top_tracks`]: SpotifyApi::top_tracks
//! [`top_artists`]: SpotifyApi::top_artists
//! [`artist_top_tracks`]: SpotifyApi::artist_top_tracks
//!
//! ## Submodules
//!
//! - [`auth`] - token endpoint calls and the interactive authorization flow
//!   used to seed a user's token cache
//! - [`client`] - [`SpotifyClient`], the reqwest implementation of
//!   [`SpotifyApi`], and [`SpotifySessions`], which opens one client per user
//!
//! ## Error Handling
//!
//! Non-success responses are turned into [`Error::Api`] carrying the status
//! code and the response body. Nothing is retried: a rate-limited or failed
//! call aborts the current run and the error reaches the invocation handler.
//!
//! ## Batch Limits
//!
//! Spotify accepts at most 100 items per add or remove request. The client
//! rejects larger batches with [`Error::BatchTooLarge`] instead of sending
//! them; splitting is the caller's job (see [`crate::playlist::reconcile`]).

pub mod auth;
pub mod client;

pub use client::{SessionFactory, SpotifyClient, SpotifySessions};

use async_trait::async_trait;
use reqwest::Response;

use crate::{
    Error, Res,
    types::{Artist, CreatePlaylistRequest, Playlist, PlaylistDetailsRequest, TimeRange, Track, User},
};

/// Capability interface over the Spotify Web API.
///
/// Playlists are addressed by URI (`spotify:playlist:<id>`), the form that is
/// stored in the registry.
#[async_trait]
pub trait SpotifyApi: Send + Sync {
    async fn current_user(&self) -> Res<User>;

    /// Every playlist in the current user's collection, all pages.
    async fn my_playlists(&self) -> Res<Vec<Playlist>>;

    async fn create_playlist(&self, user_id: &str, request: &CreatePlaylistRequest) -> Res<Playlist>;

    async fn change_playlist_details(&self, playlist_uri: &str, details: &PlaylistDetailsRequest) -> Res<()>;

    /// Removes all occurrences of each URI. At most 100 URIs per call.
    async fn remove_items(&self, playlist_uri: &str, uris: &[String]) -> Res<()>;

    /// Appends URIs in order. At most 100 URIs per call.
    async fn add_items(&self, playlist_uri: &str, uris: &[String]) -> Res<()>;

    /// Track URIs of the playlist in playlist order, all pages.
    async fn playlist_items(&self, playlist_uri: &str) -> Res<Vec<String>>;

    async fn top_tracks(&self, range: TimeRange, limit: u32) -> Res<Vec<Track>>;

    async fn top_artists(&self, range: TimeRange, limit: u32) -> Res<Vec<Artist>>;

    async fn artist_top_tracks(&self, artist_id: &str) -> Res<Vec<Track>>;
}

/// Passes successful responses through and converts anything else into
/// [`Error::Api`] with the response body as message.
pub(crate) async fn error_for_status(response: Response) -> Res<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    Err(Error::Api { status, message })
}
