use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    Res,
    storage::{self, ObjectStore},
    types::{Category, RegistryTableRow, TimeRange},
};

/// Playlist URI per time range. An empty string means "not created yet".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TermUris {
    pub short_term: String,
    pub medium_term: String,
    pub long_term: String,
}

impl TermUris {
    pub fn get(&self, range: TimeRange) -> &str {
        match range {
            TimeRange::ShortTerm => &self.short_term,
            TimeRange::MediumTerm => &self.medium_term,
            TimeRange::LongTerm => &self.long_term,
        }
    }

    pub fn set(&mut self, range: TimeRange, uri: String) {
        match range {
            TimeRange::ShortTerm => self.short_term = uri,
            TimeRange::MediumTerm => self.medium_term = uri,
            TimeRange::LongTerm => self.long_term = uri,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (TimeRange, &str)> {
        TimeRange::ALL.into_iter().map(|range| (range, self.get(range)))
    }
}

/// Registry record of one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPlaylists {
    #[serde(alias = "current_user_top_tracks_uris")]
    pub top_tracks_uris: TermUris,
    pub artist_top_tracks_uris: TermUris,
}

impl UserPlaylists {
    pub fn uris(&self, category: Category) -> &TermUris {
        match category {
            Category::TopTracks => &self.top_tracks_uris,
            Category::TopArtistsTracks => &self.artist_top_tracks_uris,
        }
    }

    pub fn uris_mut(&mut self, category: Category) -> &mut TermUris {
        match category {
            Category::TopTracks => &mut self.top_tracks_uris,
            Category::TopArtistsTracks => &mut self.artist_top_tracks_uris,
        }
    }
}

pub type Registry = BTreeMap<String, UserPlaylists>;

/// In-memory registry snapshot with load/persist against the object store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistryManager {
    registry: Registry,
}

impl RegistryManager {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    pub async fn load(store: &dyn ObjectStore, bucket: &str, key: &str) -> Res<Self> {
        let registry: Registry = storage::load_document(store, bucket, key).await?;
        Ok(Self { registry })
    }

    /// Writes the whole snapshot, replacing the stored document.
    pub async fn persist(&self, store: &dyn ObjectStore, bucket: &str, key: &str) -> Res<()> {
        storage::save_document(store, bucket, key, &self.registry).await
    }

    pub fn is_new_user(&self, user_id: &str) -> bool {
        !self.registry.contains_key(user_id)
    }

    /// Adds an all-empty record for `user_id`, replacing any existing one.
    pub fn make_new_user(&mut self, user_id: &str) -> &mut UserPlaylists {
        let record = self.registry.entry(user_id.to_string()).or_default();
        *record = UserPlaylists::default();
        record
    }

    pub fn remove_user(&mut self, user_id: &str) -> Option<UserPlaylists> {
        self.registry.remove(user_id)
    }

    pub fn user(&self, user_id: &str) -> Option<&UserPlaylists> {
        self.registry.get(user_id)
    }

    /// Recorded URI, or `""` if the user or the playlist is unknown.
    pub fn uri_for(&self, user_id: &str, category: Category, range: TimeRange) -> &str {
        self.registry
            .get(user_id)
            .map(|record| record.uris(category).get(range))
            .unwrap_or("")
    }

    pub fn record_uri(&mut self, user_id: &str, category: Category, range: TimeRange, uri: String) {
        self.registry
            .entry(user_id.to_string())
            .or_default()
            .uris_mut(category)
            .set(range, uri);
    }

    pub fn count_users(&self) -> usize {
        self.registry.len()
    }

    pub fn all(&self) -> &Registry {
        &self.registry
    }

    pub fn table_rows(&self) -> Vec<RegistryTableRow> {
        self.registry
            .iter()
            .flat_map(|(user, record)| {
                Category::ALL.into_iter().flat_map(move |category| {
                    record.uris(category).iter().map(move |(range, uri)| RegistryTableRow {
                        user: user.clone(),
                        category: category.to_string(),
                        term: range.to_string(),
                        playlist: if uri.is_empty() {
                            "-".to_string()
                        } else {
                            uri.to_string()
                        },
                    })
                })
            })
            .collect()
    }
}
