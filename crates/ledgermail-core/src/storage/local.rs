//! Filesystem-backed object store: one directory per bucket.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, info};

use super::{ObjectStore, Result};
use crate::error::StorageError;

/// Object store rooted at a local directory.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path of `bucket`/`key`, refusing anything that escapes the root.
    pub fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf> {
        for part in [bucket, key] {
            let relative = Path::new(part);
            let escapes = part.is_empty()
                || relative
                    .components()
                    .any(|c| !matches!(c, Component::Normal(_)));
            if escapes {
                return Err(StorageError::InvalidKey(format!("{bucket}/{key}")));
            }
        }
        Ok(self.root.join(bucket).join(key))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let path = self.object_path(bucket, key)?;
        debug!(path = %path.display(), "Reading object");

        fs::read(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            },
            _ => StorageError::Io(e),
        })
    }

    async fn upload(&self, bucket: &str, key: &str, path: &Path) -> Result<()> {
        let archival = |reason: String| StorageError::ArchivalUpload {
            key: key.to_string(),
            reason,
        };

        let target = self.object_path(bucket, key)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| archival(e.to_string()))?;
        }

        let size = fs::copy(path, &target).await.map_err(|e| {
            archival(format!("cannot copy {}: {e}", path.display()))
        })?;

        info!(bucket, key, size_bytes = size, "Archived attachment");
        Ok(())
    }
}
