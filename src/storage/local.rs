use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;

use super::{validate_key, ObjectStore};
use crate::error::{Error, Result};
use crate::utils::{signing, time};

#[derive(Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
    public_base_url: String,
    signing_key: String,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: String, signing_key: String) -> Self {
        Self {
            root: root.into(),
            public_base_url,
            signing_key,
        }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }

    /// Checks a link produced by `presigned_get_url`.
    pub fn verify_download(&self, key: &str, expires: i64, signature: &str) -> Result<()> {
        verify_download(&self.signing_key, key, expires, signature)
    }
}

pub fn verify_download(signing_key: &str, key: &str, expires: i64, signature: &str) -> Result<()> {
    if expires < time::unix_seconds(time::now()) {
        return Err(Error::Forbidden("Download link has expired".into()));
    }
    let message = signing::download_message(key, expires);
    if !signing::verify(signing_key, message.as_bytes(), signature) {
        return Err(Error::Forbidden("Invalid download signature".into()));
    }
    Ok(())
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(&self, key: &str, body: Bytes, _content_type: &str) -> Result<()> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, &body).await.map_err(|e| {
            tracing::error!(key, error = %e, "failed to write object");
            Error::Storage(format!("Failed to save file: {}", e))
        })?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        let path = self.path_for(key)?;
        match fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::NotFound("File not found".into()))
            }
            Err(e) => Err(Error::Storage(e.to_string())),
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Storage(e.to_string())),
        }
    }

    async fn presigned_get_url(&self, key: &str, ttl: Duration) -> Result<String> {
        validate_key(key)?;
        let expires = time::unix_seconds(time::now()) + ttl.as_secs() as i64;
        let signature = signing::sign(
            &self.signing_key,
            signing::download_message(key, expires).as_bytes(),
        );
        let mut url = url::Url::parse(&format!("{}/files/{}", self.public_base_url, key))
            .map_err(|e| Error::Internal(format!("Invalid PUBLIC_BASE_URL: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("expires", &expires.to_string())
            .append_pair("signature", &signature);
        Ok(url.to_string())
    }

    fn backend(&self) -> &'static str {
        "local"
    }
}
