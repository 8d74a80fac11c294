//! Media uploads (project photos, documents).
//!
//! Uploaded files are handed to a [`MediaStore`], which persists them and
//! returns the public URL the website will link to.

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tokio::fs;
use tracing::{info, warn};

use crate::config::UploadConfig;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No file in upload")]
    MissingFile,

    #[error("File exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("Upload did not finish within {0:?}")]
    Timeout(Duration),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store `bytes` under `name` and return the public URL
    async fn put(&self, name: &str, bytes: &[u8]) -> Result<String, UploadError>;

    /// Delete whatever was stored under `name`. Missing files are not an error.
    async fn remove(&self, name: &str) -> Result<(), UploadError>;
}

/// Stores files in a local directory served under `public_base_url`
pub struct LocalMediaStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalMediaStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into(),
        }
    }

    pub fn from_config(config: &UploadConfig) -> Self {
        Self::new(&config.directory, &config.public_base_url)
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn put(&self, name: &str, bytes: &[u8]) -> Result<String, UploadError> {
        fs::create_dir_all(&self.root).await?;

        let path = self.root.join(name);
        if let Err(e) = fs::write(&path, bytes).await {
            // Best effort: don't leave a truncated file behind
            if let Err(cleanup) = fs::remove_file(&path).await {
                warn!("could not remove partial upload {}: {}", path.display(), cleanup);
            }
            return Err(e.into());
        }

        Ok(format!("{}/{}", self.public_base_url.trim_end_matches('/'), name))
    }

    async fn remove(&self, name: &str) -> Result<(), UploadError> {
        match fs::remove_file(self.root.join(name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Validate and store one uploaded file, returning its public URL.
pub async fn store_upload(
    store: &dyn MediaStore,
    config: &UploadConfig,
    original_name: &str,
    bytes: &[u8],
) -> Result<String, UploadError> {
    if bytes.len() > config.max_bytes {
        return Err(UploadError::TooLarge { limit: config.max_bytes });
    }

    let name = stored_file_name(original_name, chrono::Utc::now().timestamp_millis());
    let timeout = config.timeout();

    let url = match tokio::time::timeout(timeout, store.put(&name, bytes)).await {
        Ok(result) => result?,
        Err(_) => {
            // The abandoned write may already have reached the store
            if let Err(e) = store.remove(&name).await {
                warn!("could not remove timed out upload {}: {}", name, e);
            }
            return Err(UploadError::Timeout(timeout));
        }
    };

    info!("stored upload {} ({} bytes)", name, bytes.len());
    Ok(url)
}

/// `<unix millis>_<original name>` with the name reduced to a safe file name
pub fn stored_file_name(original_name: &str, millis: i64) -> String {
    let base = original_name
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();

    let sanitized: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    let sanitized = sanitized.trim_start_matches('.');

    if sanitized.is_empty() {
        format!("{}_file", millis)
    } else {
        format!("{}_{}", millis, sanitized)
    }
}
