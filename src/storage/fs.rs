use std::{io::ErrorKind, path::PathBuf};

use async_trait::async_trait;

use super::ObjectStore;
use crate::{Error, Res};

/// Stores objects as files under `<root>/<bucket>/<key>`.
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn get_path(&self, bucket: &str, key: &str) -> Res<PathBuf> {
        if key.is_empty() || key.split('/').any(|part| part == "..") {
            return Err(Error::Storage(format!("invalid object key: {key}")));
        }
        let mut path = self.root.clone();
        path.push(bucket);
        path.push(key);
        Ok(path)
    }
}

#[async_trait]
impl ObjectStore for FsStore {
    async fn get(&self, bucket: &str, key: &str) -> Res<Option<Vec<u8>>> {
        let path = self.get_path(bucket, key)?;
        match async_fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Io(e)),
        }
    }

    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>) -> Res<()> {
        let path = self.get_path(bucket, key)?;
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent).await?;
        }
        async_fs::write(&path, body).await?;
        Ok(())
    }
}
