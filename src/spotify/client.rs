use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::Mutex;

use crate::{
    Error, Res,
    config::{Config, Credentials},
    management::TokenManager,
    playlist::MAX_BATCH_SIZE,
    spotify::{SpotifyApi, error_for_status},
    storage::ObjectStore,
    types::{
        AddTrackToPlaylistRequest, Artist, ArtistTopTracksResponse, CreatePlaylistRequest, Page,
        Playlist, PlaylistDetailsRequest, PlaylistItem, RemoveTracksFromPlaylistRequest,
        SnapshotResponse, TimeRange, Token, Track, TrackReference, User,
    },
    utils,
};

/// Opens an authenticated [`SpotifyApi`] session for one user.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn open(&self, user_id: &str, credentials: Credentials, token: Token) -> Res<Box<dyn SpotifyApi>>;
}

/// Production [`SessionFactory`] creating a [`SpotifyClient`] whose token
/// refreshes are written back to the user's cache object.
pub struct SpotifySessions {
    config: Config,
    store: Arc<dyn ObjectStore>,
}

impl SpotifySessions {
    pub fn new(config: Config, store: Arc<dyn ObjectStore>) -> Self {
        Self { config, store }
    }
}

#[async_trait]
impl SessionFactory for SpotifySessions {
    async fn open(&self, user_id: &str, credentials: Credentials, token: Token) -> Res<Box<dyn SpotifyApi>> {
        let tokens = TokenManager::new(
            token,
            credentials,
            Arc::clone(&self.store),
            self.config.bucket.clone(),
            TokenManager::cache_key(user_id),
            self.config.token_url.clone(),
        );

        Ok(Box::new(SpotifyClient::new(
            self.config.api_url.clone(),
            self.config.market.clone(),
            tokens,
        )))
    }
}

/// reqwest implementation of [`SpotifyApi`].
pub struct SpotifyClient {
    http: Client,
    api_url: String,
    market: String,
    tokens: Mutex<TokenManager>,
}

impl SpotifyClient {
    pub fn new(api_url: String, market: String, tokens: TokenManager) -> Self {
        Self {
            http: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            market,
            tokens: Mutex::new(tokens),
        }
    }

    async fn bearer(&self) -> Res<String> {
        self.tokens.lock().await.get_valid_token().await
    }

    async fn get_json<T>(&self, url: &str) -> Res<T>
    where
        T: DeserializeOwned,
    {
        let token = self.bearer().await?;
        let response = self.http.get(url).bearer_auth(token).send().await?;
        Ok(error_for_status(response).await?.json::<T>().await?)
    }

    async fn send_json<B>(&self, method: Method, url: &str, body: &B) -> Res<reqwest::Response>
    where
        B: Serialize + ?Sized,
    {
        let token = self.bearer().await?;
        let response = self
            .http
            .request(method, url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        error_for_status(response).await
    }

    /// Follows `next` links until the last page.
    async fn get_all_pages<T>(&self, first_url: String) -> Res<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let mut items = Vec::new();
        let mut next = Some(first_url);

        while let Some(url) = next {
            let page: Page<T> = self.get_json(&url).await?;
            items.extend(page.items);
            next = page.next;
        }

        Ok(items)
    }

    fn playlist_url(&self, playlist_uri: &str) -> Res<String> {
        let id = utils::playlist_id(playlist_uri)?;
        Ok(format!("{uri}/playlists/{id}", uri = self.api_url))
    }
}

fn check_batch(uris: &[String]) -> Res<()> {
    if uris.len() > MAX_BATCH_SIZE {
        return Err(Error::BatchTooLarge(uris.len()));
    }
    Ok(())
}

#[async_trait]
impl SpotifyApi for SpotifyClient {
    async fn current_user(&self) -> Res<User> {
        self.get_json(&format!("{uri}/me", uri = self.api_url)).await
    }

    async fn my_playlists(&self) -> Res<Vec<Playlist>> {
        self.get_all_pages(format!("{uri}/me/playlists?limit=50", uri = self.api_url))
            .await
    }

    async fn create_playlist(&self, user_id: &str, request: &CreatePlaylistRequest) -> Res<Playlist> {
        let url = format!("{uri}/users/{user_id}/playlists", uri = self.api_url);
        let response = self.send_json(Method::POST, &url, request).await?;
        Ok(response.json::<Playlist>().await?)
    }

    async fn change_playlist_details(&self, playlist_uri: &str, details: &PlaylistDetailsRequest) -> Res<()> {
        let url = self.playlist_url(playlist_uri)?;
        self.send_json(Method::PUT, &url, details).await?;
        Ok(())
    }

    async fn remove_items(&self, playlist_uri: &str, uris: &[String]) -> Res<()> {
        check_batch(uris)?;
        if uris.is_empty() {
            return Ok(());
        }

        let url = format!("{}/tracks", self.playlist_url(playlist_uri)?);
        let body = RemoveTracksFromPlaylistRequest {
            tracks: uris
                .iter()
                .map(|uri| TrackReference { uri: uri.clone() })
                .collect(),
        };
        let response = self.send_json(Method::DELETE, &url, &body).await?;
        response.json::<SnapshotResponse>().await?;
        Ok(())
    }

    async fn add_items(&self, playlist_uri: &str, uris: &[String]) -> Res<()> {
        check_batch(uris)?;
        if uris.is_empty() {
            return Ok(());
        }

        let url = format!("{}/tracks", self.playlist_url(playlist_uri)?);
        let body = AddTrackToPlaylistRequest {
            uris: uris.to_vec(),
        };
        let response = self.send_json(Method::POST, &url, &body).await?;
        response.json::<SnapshotResponse>().await?;
        Ok(())
    }

    async fn playlist_items(&self, playlist_uri: &str) -> Res<Vec<String>> {
        let url = format!(
            "{}/tracks?limit=100&fields=items(track(uri)),next",
            self.playlist_url(playlist_uri)?
        );
        let items: Vec<PlaylistItem> = self.get_all_pages(url).await?;

        // local files and removed tracks come back as `"track": null`
        Ok(items
            .into_iter()
            .filter_map(|item| item.track.map(|track| track.uri))
            .collect())
    }

    async fn top_tracks(&self, range: TimeRange, limit: u32) -> Res<Vec<Track>> {
        let url = format!(
            "{uri}/me/top/tracks?limit={limit}&offset=0&time_range={range}",
            uri = self.api_url
        );
        let page: Page<Track> = self.get_json(&url).await?;
        Ok(page.items)
    }

    async fn top_artists(&self, range: TimeRange, limit: u32) -> Res<Vec<Artist>> {
        let url = format!(
            "{uri}/me/top/artists?limit={limit}&offset=0&time_range={range}",
            uri = self.api_url
        );
        let page: Page<Artist> = self.get_json(&url).await?;
        Ok(page.items)
    }

    async fn artist_top_tracks(&self, artist_id: &str) -> Res<Vec<Track>> {
        let url = format!(
            "{uri}/artists/{artist_id}/top-tracks?market={market}",
            uri = self.api_url,
            market = self.market
        );
        let response: ArtistTopTracksResponse = self.get_json(&url).await?;
        Ok(response.tracks)
    }
}
