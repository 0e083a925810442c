use serde::Deserialize;

use crate::{Res, storage::ObjectStore};

/// The `{"users": [...]}` document listing every user to process.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UserList {
    #[serde(default)]
    pub users: Vec<String>,
}

impl UserList {
    pub async fn load(store: &dyn ObjectStore, bucket: &str, key: &str) -> Res<Self> {
        crate::storage::load_document(store, bucket, key).await
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.users.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
