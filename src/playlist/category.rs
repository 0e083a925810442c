use chrono::NaiveDate;

use crate::{
    Res,
    config::Config,
    info,
    management::RegistryManager,
    playlist::reconcile,
    spotify::SpotifyApi,
    success,
    types::{Category, CreatePlaylistRequest, PlaylistDetailsRequest, TimeRange, User},
    utils, warning,
};

/// Result of one time range of a [`CategorySync`] run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermOutcome {
    pub range: TimeRange,
    pub playlist_uri: String,
    /// A new playlist was created for this range.
    pub created: bool,
    /// The playlist content was replaced.
    pub changed: bool,
}

/// Maintains the three playlists of one [`Category`] for one user.
pub struct CategorySync<'a> {
    api: &'a dyn SpotifyApi,
    category: Category,
    config: &'a Config,
}

impl<'a> CategorySync<'a> {
    pub fn new(api: &'a dyn SpotifyApi, category: Category, config: &'a Config) -> Self {
        Self {
            api,
            category,
            config,
        }
    }

    /// Ordered track URIs the playlist for `range` should contain.
    ///
    /// For [`Category::TopTracks`] these are the user's top tracks in ranking
    /// order. For [`Category::TopArtistsTracks`] the top tracks of every top
    /// artist are concatenated, artist by artist in ranking order.
    pub async fn desired_tracks(&self, range: TimeRange) -> Res<Vec<String>> {
        match self.category {
            Category::TopTracks => {
                let tracks = self
                    .api
                    .top_tracks(range, self.config.top_track_count)
                    .await?;
                Ok(tracks.into_iter().map(|t| t.uri).collect())
            }
            Category::TopArtistsTracks => {
                let artists = self
                    .api
                    .top_artists(range, self.config.top_artist_count)
                    .await?;

                let mut uris = Vec::new();
                for artist in artists {
                    let tracks = self.api.artist_top_tracks(&artist.id).await?;
                    uris.extend(tracks.into_iter().map(|t| t.uri));
                }
                Ok(uris)
            }
        }
    }

    /// Runs all three time ranges for `user_id`.
    ///
    /// `user` is the Spotify account behind the session and owns newly
    /// created playlists. URIs of created playlists are recorded in
    /// `registry` right away; persisting the registry is left to the caller.
    pub async fn run(
        &self,
        user_id: &str,
        user: &User,
        registry: &mut RegistryManager,
        today: NaiveDate,
    ) -> Res<Vec<TermOutcome>> {
        let my_playlists = self.api.my_playlists().await?;
        let mut outcomes = Vec::with_capacity(TimeRange::ALL.len());

        for range in TimeRange::ALL {
            info!("====={} {}=====", self.category, range);

            let desired = self.desired_tracks(range).await?;
            let description = utils::playlist_description(range, today);
            let recorded = registry.uri_for(user_id, self.category, range).to_string();

            let existing = my_playlists
                .iter()
                .find(|p| !recorded.is_empty() && p.uri == recorded);

            let (playlist_uri, created) = match existing {
                Some(playlist) => {
                    info!("playlist exists.");
                    let details = PlaylistDetailsRequest {
                        description: Some(description),
                        ..Default::default()
                    };
                    self.api
                        .change_playlist_details(&playlist.uri, &details)
                        .await?;
                    info!("details are changed.");
                    (playlist.uri.clone(), false)
                }
                None => {
                    if !recorded.is_empty() {
                        warning!(
                            "Recorded playlist {} is no longer in the library of {}, creating a new one.",
                            recorded,
                            user_id
                        );
                    }
                    let request = CreatePlaylistRequest {
                        name: self.category.playlist_name(range),
                        description,
                        public: false,
                        collaborative: false,
                    };
                    let playlist = self.api.create_playlist(&user.id, &request).await?;
                    registry.record_uri(user_id, self.category, range, playlist.uri.clone());
                    info!("playlist is made.");
                    (playlist.uri, true)
                }
            };

            let previous = self.api.playlist_items(&playlist_uri).await?;
            let changed = reconcile(self.api, &playlist_uri, &desired, &previous).await?;
            if changed {
                success!("modified");
            } else {
                info!("NOT modified");
            }

            outcomes.push(TermOutcome {
                range,
                playlist_uri,
                created,
                changed,
            });
        }

        Ok(outcomes)
    }
}
