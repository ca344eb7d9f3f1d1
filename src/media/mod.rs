//! Media relocation: moves uploaded images into durable storage and hands back
//! the URL that gets persisted on a link or the profile.

pub mod bucket;
pub mod local;

use async_trait::async_trait;
use axum::body::Bytes;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::{MediaBackend, MediaConfig};
use crate::db::DEFAULT_PROFILE_IMAGE;
use crate::error::LinkHubError;

pub use bucket::BucketStore;
pub use local::LocalDirStore;

/// A storage backend for uploaded files.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Persist `bytes` under `key` and return the public URL of the object.
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str)
    -> Result<String, LinkHubError>;

    /// Delete the object behind a URL previously returned by [`MediaStore::put`].
    async fn delete(&self, url: &str) -> Result<(), LinkHubError>;
}

/// A file received from a multipart form.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

#[derive(Clone)]
pub struct MediaRelocation {
    backend: Arc<dyn MediaStore>,
}

impl MediaRelocation {
    pub fn new(backend: Arc<dyn MediaStore>) -> Self {
        Self { backend }
    }

    pub fn from_config(cfg: &MediaConfig) -> Result<Self, LinkHubError> {
        let backend: Arc<dyn MediaStore> = match cfg.backend {
            MediaBackend::Local => Arc::new(LocalDirStore::new(
                cfg.upload_dir.clone(),
                cfg.public_prefix.clone(),
            )),
            MediaBackend::Bucket => Arc::new(BucketStore::new(cfg)?),
        };
        Ok(Self::new(backend))
    }

    /// Store an upload and return its URL. No upload, no side effect.
    pub async fn store(&self, upload: Option<Upload>) -> Result<Option<String>, LinkHubError> {
        let Some(upload) = upload else {
            return Ok(None);
        };
        if upload.bytes.is_empty() {
            return Ok(None);
        }
        let key = object_key(&upload.file_name);
        let url = self
            .backend
            .put(&key, upload.bytes, &upload.content_type)
            .await?;
        info!(key = %key, "stored upload");
        Ok(Some(url))
    }

    /// Best-effort delete. Failures are logged and swallowed.
    pub async fn remove(&self, url: Option<&str>) {
        let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) else {
            return;
        };
        match self.backend.delete(url).await {
            Ok(()) => debug!(url, "removed stored media"),
            Err(e) => warn!(url, error = %e, "failed to remove stored media"),
        }
    }

    /// First half of swapping `previous` for a new upload: the new file is
    /// stored now, the old one is handed back by [`Replacement::commit`]. A
    /// failed upload therefore never touches the previous image.
    pub async fn replace(
        &self,
        previous: Option<&str>,
        upload: Option<Upload>,
    ) -> Result<Replacement, LinkHubError> {
        let stored = self.store(upload).await?;
        let previous = previous
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);
        Ok(Replacement { stored, previous })
    }
}

/// An image swap waiting for the owning row to be updated.
#[derive(Debug)]
#[must_use]
pub struct Replacement {
    stored: Option<String>,
    previous: Option<String>,
}

impl Replacement {
    /// The value to persist: the new upload if there was one, else the previous value.
    pub fn url(&self) -> Option<&str> {
        self.stored.as_deref().or(self.previous.as_deref())
    }

    /// The row now points at the new file. Returns the superseded image for
    /// the caller to release, never the placeholder.
    #[must_use]
    pub fn commit(self) -> Option<String> {
        if self.stored.is_none() {
            return None;
        }
        self.previous.filter(|old| !is_placeholder(old))
    }

    /// The row update failed; drop the freshly stored file.
    pub async fn abort(self, media: &MediaRelocation) {
        media.remove(self.stored.as_deref()).await;
    }
}

pub fn is_placeholder(url: &str) -> bool {
    url == DEFAULT_PROFILE_IMAGE
}

/// `<unix-millis>-<random>-<sanitized name>`
fn object_key(original_name: &str) -> String {
    let nonce: u32 = rand::random();
    format!(
        "{}-{:08x}-{}",
        Utc::now().timestamp_millis(),
        nonce,
        sanitize_file_name(original_name)
    )
}

fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{RecordingStore, upload};
    use super::*;

    fn relocation(store: &Arc<RecordingStore>) -> MediaRelocation {
        MediaRelocation::new(store.clone())
    }

    #[tokio::test]
    async fn store_without_upload_has_no_side_effect() {
        let store = Arc::new(RecordingStore::default());
        let url = relocation(&store).store(None).await.unwrap();
        assert!(url.is_none());
        assert!(store.puts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_file_part_is_treated_as_absent() {
        let store = Arc::new(RecordingStore::default());
        let mut empty = upload("a.png");
        empty.bytes = Bytes::new();
        assert!(relocation(&store).store(Some(empty)).await.unwrap().is_none());
        assert!(store.puts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn stored_key_keeps_the_original_name() {
        let store = Arc::new(RecordingStore::default());
        let url = relocation(&store)
            .store(Some(upload("me.png")))
            .await
            .unwrap()
            .unwrap();
        assert!(url.starts_with("https://cdn.test/"));
        assert!(url.ends_with("-me.png"));
    }

    #[tokio::test]
    async fn remove_swallows_backend_failures() {
        let store = Arc::new(RecordingStore {
            fail_deletes: true,
            ..Default::default()
        });
        relocation(&store)
            .remove(Some("https://cdn.test/old.png"))
            .await;
        assert_eq!(store.deletes.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn remove_ignores_absent_values() {
        let store = Arc::new(RecordingStore::default());
        let media = relocation(&store);
        media.remove(None).await;
        media.remove(Some("  ")).await;
        assert!(store.deletes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn replace_commit_hands_back_previous_after_storing() {
        let store = Arc::new(RecordingStore::default());
        let media = relocation(&store);
        let swap = media
            .replace(Some("https://cdn.test/old.png"), Some(upload("new.png")))
            .await
            .unwrap();
        assert!(swap.url().unwrap().ends_with("-new.png"));
        assert_eq!(store.puts.lock().unwrap().len(), 1);

        assert_eq!(swap.commit().as_deref(), Some("https://cdn.test/old.png"));
        assert!(store.deletes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn replace_never_removes_the_placeholder() {
        let store = Arc::new(RecordingStore::default());
        let media = relocation(&store);
        let swap = media
            .replace(Some(DEFAULT_PROFILE_IMAGE), Some(upload("me.png")))
            .await
            .unwrap();
        assert!(swap.url().is_some());
        assert_eq!(swap.commit(), None);
    }

    #[tokio::test]
    async fn failed_store_keeps_the_previous_image() {
        let store = Arc::new(RecordingStore {
            fail_puts: true,
            ..Default::default()
        });
        let result = relocation(&store)
            .replace(Some("https://cdn.test/old.png"), Some(upload("new.png")))
            .await;
        assert!(result.is_err());
        assert!(store.deletes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn replace_without_upload_keeps_previous() {
        let store = Arc::new(RecordingStore::default());
        let media = relocation(&store);
        let swap = media
            .replace(Some("https://cdn.test/old.png"), None)
            .await
            .unwrap();
        assert_eq!(swap.url(), Some("https://cdn.test/old.png"));
        assert_eq!(swap.commit(), None);
    }

    #[tokio::test]
    async fn abort_removes_only_the_new_file() {
        let store = Arc::new(RecordingStore::default());
        let media = relocation(&store);
        let swap = media
            .replace(Some("https://cdn.test/old.png"), Some(upload("new.png")))
            .await
            .unwrap();
        let new_url = swap.url().unwrap().to_string();
        swap.abort(&media).await;
        assert_eq!(*store.deletes.lock().unwrap(), vec![new_url]);
    }

    #[test]
    fn sanitize_strips_directories_and_odd_characters() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\pics\\my cat.jpg"), "my_cat.jpg");
        assert_eq!(sanitize_file_name(".hidden"), "hidden");
        assert_eq!(sanitize_file_name(""), "upload");
    }
}
