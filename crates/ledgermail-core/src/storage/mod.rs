//! Object storage abstraction.
//!
//! The raw email is fetched from, and the archival copy of the attachment is
//! written to, an [`ObjectStore`]. Buckets and keys follow S3 naming.

mod local;
#[cfg(feature = "s3")]
mod s3;

pub use local::LocalObjectStore;
#[cfg(feature = "s3")]
pub use s3::S3ObjectStore;

use std::path::Path;

use async_trait::async_trait;

use crate::error::StorageError;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Bucket/key object storage.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch the bytes stored under `bucket`/`key`.
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;

    /// Upload the file at `path` to `bucket`/`key`.
    ///
    /// Failures are reported as [`StorageError::ArchivalUpload`].
    async fn upload(&self, bucket: &str, key: &str, path: &Path) -> Result<()>;
}
