//! S3-backed object store.

use std::path::Path;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{error, info};

use super::{ObjectStore, Result};
use crate::error::StorageError;

/// Object store backed by Amazon S3.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    /// Create a store from the ambient AWS configuration (region, credentials).
    pub async fn from_env() -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest()).load().await;
        Self {
            client: Client::new(&config),
        }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| match &e {
                SdkError::ServiceError(service_err)
                    if matches!(service_err.err(), GetObjectError::NoSuchKey(_)) =>
                {
                    StorageError::NotFound {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                    }
                }
                _ => {
                    error!(error = %e, bucket, key, "S3 fetch failed");
                    StorageError::Backend(e.to_string())
                }
            })?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(data.into_bytes().to_vec())
    }

    async fn upload(&self, bucket: &str, key: &str, path: &Path) -> Result<()> {
        let archival = |reason: String| StorageError::ArchivalUpload {
            key: key.to_string(),
            reason,
        };

        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| archival(format!("cannot read {}: {e}", path.display())))?;

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, bucket, key, "S3 upload failed");
                archival(e.to_string())
            })?;

        info!(bucket, key, "Archived attachment");
        Ok(())
    }
}
