use async_trait::async_trait;
use axum::body::Bytes;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

use super::MediaStore;
use crate::error::LinkHubError;

/// Stores uploads in a directory served by the router under `public_prefix`.
pub struct LocalDirStore {
    root: PathBuf,
    public_prefix: String,
}

impl LocalDirStore {
    pub fn new(root: PathBuf, public_prefix: impl Into<String>) -> Self {
        let public_prefix = public_prefix.into().trim_end_matches('/').to_string();
        Self {
            root,
            public_prefix,
        }
    }

    /// Map a public URL back to a file name inside `root`.
    fn key_for(&self, url: &str) -> Option<String> {
        let key = url
            .strip_prefix(self.public_prefix.as_str())?
            .strip_prefix('/')?;
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return None;
        }
        Some(key.to_string())
    }
}

#[async_trait]
impl MediaStore for LocalDirStore {
    async fn put(
        &self,
        key: &str,
        bytes: Bytes,
        _content_type: &str,
    ) -> Result<String, LinkHubError> {
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.root.join(key), &bytes).await?;
        Ok(format!("{}/{}", self.public_prefix, key))
    }

    async fn delete(&self, url: &str) -> Result<(), LinkHubError> {
        let Some(key) = self.key_for(url) else {
            debug!(url, "not a local upload; nothing to delete");
            return Ok(());
        };
        match tokio::fs::remove_file(self.root.join(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
