//! Object storage for resumes and job-description files.
//!
//! Two backends implement [`ObjectStore`]: S3 (selected when `S3_BUCKET` is
//! set) and a local directory whose download links are HMAC-signed and served
//! by `GET /files/*key`.

pub mod local;
pub mod s3;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::config::StorageConfig;
use crate::error::{Error, Result};

pub use local::LocalObjectStore;
pub use s3::S3ObjectStore;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<()>;

    async fn get(&self, key: &str) -> Result<Bytes>;

    async fn delete(&self, key: &str) -> Result<()>;

    async fn presigned_get_url(&self, key: &str, ttl: Duration) -> Result<String>;

    fn backend(&self) -> &'static str;
}

pub type SharedObjectStore = Arc<dyn ObjectStore>;

pub async fn build_object_store(config: &StorageConfig) -> Result<SharedObjectStore> {
    match &config.s3_bucket {
        Some(bucket) => {
            let store = S3ObjectStore::connect(
                bucket.clone(),
                config.s3_region.clone(),
                config.s3_endpoint.clone(),
            )
            .await;
            tracing::info!(bucket = %bucket, "using S3 object store");
            Ok(Arc::new(store))
        }
        None => {
            let store = LocalObjectStore::new(
                config.uploads_dir.clone(),
                config.public_base_url.clone(),
                config.signing_key.clone(),
            );
            tracing::info!(dir = %config.uploads_dir, "using local object store");
            Ok(Arc::new(store))
        }
    }
}

/// Keys are relative, slash-separated and may not climb out of their prefix.
pub fn validate_key(key: &str) -> Result<()> {
    let bad = key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..");
    if bad {
        return Err(Error::BadRequest(format!("Invalid storage key '{}'", key)));
    }
    Ok(())
}
