#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use reqwest::StatusCode;
use topsync::{
    Error, Res,
    config::{Config, Credentials, StoreKind},
    playlist::MAX_BATCH_SIZE,
    spotify::{SessionFactory, SpotifyApi},
    types::{
        Artist, CreatePlaylistRequest, Playlist, PlaylistDetailsRequest, TimeRange, Token, Track,
        User,
    },
};

pub const BUCKET: &str = "test-bucket";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreatePlaylist { name: String, description: String, public: bool, collaborative: bool },
    ChangeDetails { uri: String, description: Option<String> },
    Remove { uri: String, uris: Vec<String> },
    Add { uri: String, uris: Vec<String> },
}

#[derive(Debug, Default)]
pub struct FakeState {
    pub user: Option<User>,
    pub library: Vec<Playlist>,
    pub contents: HashMap<String, Vec<String>>,
    pub top_tracks: HashMap<TimeRange, Vec<String>>,
    pub top_artists: HashMap<TimeRange, Vec<String>>,
    pub artist_tracks: HashMap<String, Vec<String>>,
    pub calls: Vec<Call>,
    /// Number of successful add calls before every further add fails.
    pub fail_adds_after: Option<usize>,
    pub fail_current_user: bool,
    next_id: usize,
}

/// In-memory stand-in for the Spotify Web API.
#[derive(Debug, Clone, Default)]
pub struct FakeSpotify {
    state: Arc<Mutex<FakeState>>,
}

impl FakeSpotify {
    pub fn new(user_id: &str) -> Self {
        let fake = Self::default();
        fake.state().user = Some(User {
            id: user_id.to_string(),
            display_name: Some(format!("{user_id} display")),
        });
        fake
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    pub fn mutating_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Remove { .. } | Call::Add { .. }))
            .collect()
    }

    pub fn removes(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Remove { uris, .. } => Some(uris),
                _ => None,
            })
            .collect()
    }

    pub fn adds(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Add { uris, .. } => Some(uris),
                _ => None,
            })
            .collect()
    }

    /// Adds an existing playlist to the library with the given content.
    pub fn with_playlist(self, uri: &str, tracks: &[String]) -> Self {
        {
            let mut state = self.state();
            let id = uri.trim_start_matches("spotify:playlist:").to_string();
            state.library.push(Playlist {
                id: id.clone(),
                name: id,
                uri: uri.to_string(),
                description: None,
            });
            state.contents.insert(uri.to_string(), tracks.to_vec());
        }
        self
    }

    pub fn set_top_tracks(&self, range: TimeRange, uris: &[String]) {
        self.state().top_tracks.insert(range, uris.to_vec());
    }

    pub fn set_top_artists(&self, range: TimeRange, artist_ids: &[&str]) {
        self.state()
            .top_artists
            .insert(range, artist_ids.iter().map(|a| a.to_string()).collect());
    }

    pub fn set_artist_tracks(&self, artist_id: &str, uris: &[String]) {
        self.state()
            .artist_tracks
            .insert(artist_id.to_string(), uris.to_vec());
    }

    pub fn contents(&self, uri: &str) -> Vec<String> {
        self.state().contents.get(uri).cloned().unwrap_or_default()
    }

    pub fn delete_playlist(&self, uri: &str) {
        let mut state = self.state();
        state.library.retain(|p| p.uri != uri);
        state.contents.remove(uri);
    }
}

fn not_found(what: &str) -> Error {
    Error::Api {
        status: StatusCode::NOT_FOUND,
        message: format!("{what} not found"),
    }
}

fn check_batch(uris: &[String]) -> Res<()> {
    if uris.len() > MAX_BATCH_SIZE {
        return Err(Error::BatchTooLarge(uris.len()));
    }
    Ok(())
}

#[async_trait]
impl SpotifyApi for FakeSpotify {
    async fn current_user(&self) -> Res<User> {
        let state = self.state();
        if state.fail_current_user {
            return Err(Error::Api {
                status: StatusCode::UNAUTHORIZED,
                message: "invalid access token".to_string(),
            });
        }
        state.user.clone().ok_or_else(|| not_found("user"))
    }

    async fn my_playlists(&self) -> Res<Vec<Playlist>> {
        Ok(self.state().library.clone())
    }

    async fn create_playlist(&self, user_id: &str, request: &CreatePlaylistRequest) -> Res<Playlist> {
        let mut state = self.state();
        if state.user.as_ref().map(|u| u.id.as_str()) != Some(user_id) {
            return Err(not_found("user"));
        }

        state.next_id += 1;
        let id = format!("created{}", state.next_id);
        let playlist = Playlist {
            id: id.clone(),
            name: request.name.clone(),
            uri: format!("spotify:playlist:{id}"),
            description: Some(request.description.clone()),
        };
        state.library.push(playlist.clone());
        state.contents.insert(playlist.uri.clone(), Vec::new());
        state.calls.push(Call::CreatePlaylist {
            name: request.name.clone(),
            description: request.description.clone(),
            public: request.public,
            collaborative: request.collaborative,
        });
        Ok(playlist)
    }

    async fn change_playlist_details(&self, playlist_uri: &str, details: &PlaylistDetailsRequest) -> Res<()> {
        let mut state = self.state();
        let playlist = state
            .library
            .iter_mut()
            .find(|p| p.uri == playlist_uri)
            .ok_or_else(|| not_found(playlist_uri))?;
        if let Some(description) = &details.description {
            playlist.description = Some(description.clone());
        }
        state.calls.push(Call::ChangeDetails {
            uri: playlist_uri.to_string(),
            description: details.description.clone(),
        });
        Ok(())
    }

    async fn remove_items(&self, playlist_uri: &str, uris: &[String]) -> Res<()> {
        check_batch(uris)?;
        let mut state = self.state();
        let content = state
            .contents
            .get_mut(playlist_uri)
            .ok_or_else(|| not_found(playlist_uri))?;
        content.retain(|t| !uris.contains(t));
        state.calls.push(Call::Remove {
            uri: playlist_uri.to_string(),
            uris: uris.to_vec(),
        });
        Ok(())
    }

    async fn add_items(&self, playlist_uri: &str, uris: &[String]) -> Res<()> {
        check_batch(uris)?;
        let mut state = self.state();
        let adds_so_far = state
            .calls
            .iter()
            .filter(|c| matches!(c, Call::Add { .. }))
            .count();
        if state.fail_adds_after.is_some_and(|limit| adds_so_far >= limit) {
            return Err(Error::Api {
                status: StatusCode::BAD_GATEWAY,
                message: "upstream failure".to_string(),
            });
        }

        state
            .contents
            .get_mut(playlist_uri)
            .ok_or_else(|| not_found(playlist_uri))?
            .extend(uris.iter().cloned());
        state.calls.push(Call::Add {
            uri: playlist_uri.to_string(),
            uris: uris.to_vec(),
        });
        Ok(())
    }

    async fn playlist_items(&self, playlist_uri: &str) -> Res<Vec<String>> {
        self.state()
            .contents
            .get(playlist_uri)
            .cloned()
            .ok_or_else(|| not_found(playlist_uri))
    }

    async fn top_tracks(&self, range: TimeRange, limit: u32) -> Res<Vec<Track>> {
        Ok(self
            .state()
            .top_tracks
            .get(&range)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .take(limit as usize)
            .map(track)
            .collect())
    }

    async fn top_artists(&self, range: TimeRange, limit: u32) -> Res<Vec<Artist>> {
        Ok(self
            .state()
            .top_artists
            .get(&range)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .take(limit as usize)
            .map(|id| Artist {
                name: format!("artist {id}"),
                id,
            })
            .collect())
    }

    async fn artist_top_tracks(&self, artist_id: &str) -> Res<Vec<Track>> {
        Ok(self
            .state()
            .artist_tracks
            .get(artist_id)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(track)
            .collect())
    }
}

fn track(uri: String) -> Track {
    Track {
        id: uri.rsplit(':').next().map(str::to_string),
        name: format!("track {uri}"),
        uri,
    }
}

/// Hands out the fake registered for each user id.
#[derive(Default)]
pub struct FakeSessions {
    sessions: HashMap<String, FakeSpotify>,
    opened: Arc<Mutex<Vec<(String, Credentials, Token)>>>,
}

impl FakeSessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user_id: &str, fake: FakeSpotify) -> Self {
        self.sessions.insert(user_id.to_string(), fake);
        self
    }

    /// Shared log of every opened session.
    pub fn opened(&self) -> Arc<Mutex<Vec<(String, Credentials, Token)>>> {
        Arc::clone(&self.opened)
    }
}

#[async_trait]
impl SessionFactory for FakeSessions {
    async fn open(&self, user_id: &str, credentials: Credentials, token: Token) -> Res<Box<dyn SpotifyApi>> {
        self.opened
            .lock()
            .unwrap()
            .push((user_id.to_string(), credentials, token));
        let fake = self
            .sessions
            .get(user_id)
            .cloned()
            .ok_or_else(|| Error::Auth(format!("no session for {user_id}")))?;
        Ok(Box::new(fake))
    }
}

pub fn uris(prefix: &str, count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("spotify:track:{prefix}{i}"))
        .collect()
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn test_config() -> Config {
    Config {
        bucket: BUCKET.to_string(),
        store: StoreKind::Fs,
        ..Config::default()
    }
}

pub fn credentials() -> Credentials {
    Credentials {
        client_id: "client".to_string(),
        client_secret: "secret".to_string(),
        redirect_url: "http://127.0.0.1:8888/callback".to_string(),
    }
}

pub fn token_json() -> &'static str {
    r#"{
    "access_token": "BQC-access",
    "token_type": "Bearer",
    "expires_in": 3600,
    "scope": "user-top-read playlist-modify-private",
    "expires_at": 4102444800,
    "refresh_token": "AQD-refresh"
}"#
}
