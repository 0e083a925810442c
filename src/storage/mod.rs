//! # Storage Module
//!
//! Key-value persistence of JSON documents between invocations. Every piece
//! of state topsync keeps (the user list, the playlist registry and each
//! user's token cache) is one JSON object addressed by bucket and key.
//!
//! Backends implement [`ObjectStore`], which only moves raw bytes. The
//! free functions [`load_document`] and [`save_document`] add the JSON layer
//! on top:
//!
//! - a missing object loads as the document's default value, never as an
//!   error;
//! - documents are written as UTF-8, pretty-printed with a 4-space indent.
//!
//! ## Backends
//!
//! - [`S3Store`] - Amazon S3 or any S3-compatible endpoint
//! - [`FsStore`] - a directory tree on the local filesystem
//! - [`MemoryStore`] - process memory, for tests and dry runs

mod fs;
mod memory;
mod s3;

pub use fs::FsStore;
pub use memory::MemoryStore;
pub use s3::S3Store;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    Res,
    config::{Config, StoreKind},
};

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Reads an object. `Ok(None)` means the object does not exist.
    async fn get(&self, bucket: &str, key: &str) -> Res<Option<Vec<u8>>>;

    /// Writes an object, replacing any previous content.
    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>) -> Res<()>;
}

/// Opens the backend selected by `config.store`.
pub async fn open(config: &Config) -> Res<Arc<dyn ObjectStore>> {
    match config.store {
        StoreKind::S3 => Ok(Arc::new(
            S3Store::connect(config.s3_region.clone(), config.s3_endpoint.clone()).await,
        )),
        StoreKind::Fs => Ok(Arc::new(FsStore::new(config.store_root.clone()))),
    }
}

/// Loads a JSON document, returning `None` if the object does not exist.
pub async fn load_optional<T>(store: &dyn ObjectStore, bucket: &str, key: &str) -> Res<Option<T>>
where
    T: DeserializeOwned,
{
    match store.get(bucket, key).await? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

/// Loads a JSON document, treating a missing object as an empty document.
pub async fn load_document<T>(store: &dyn ObjectStore, bucket: &str, key: &str) -> Res<T>
where
    T: DeserializeOwned + Default,
{
    match load_optional(store, bucket, key).await? {
        Some(doc) => Ok(doc),
        None => {
            crate::info!("No {} found in {}, starting empty.", key, bucket);
            Ok(T::default())
        }
    }
}

/// Serializes and writes a JSON document.
pub async fn save_document<T>(store: &dyn ObjectStore, bucket: &str, key: &str, doc: &T) -> Res<()>
where
    T: Serialize + ?Sized,
{
    store.put(bucket, key, to_pretty_json(doc)?).await
}

/// Renders `value` as UTF-8 JSON indented with four spaces.
pub fn to_pretty_json<T>(value: &T) -> Res<Vec<u8>>
where
    T: Serialize + ?Sized,
{
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(buf)
}
