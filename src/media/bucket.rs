use async_trait::async_trait;
use axum::body::Bytes;
use s3::creds::Credentials;
use s3::{Bucket, Region};
use tracing::debug;

use super::MediaStore;
use crate::config::MediaConfig;
use crate::error::LinkHubError;

/// S3-compatible bucket (R2, MinIO, S3) addressed path-style.
pub struct BucketStore {
    bucket: Box<Bucket>,
    public_base_url: String,
}

impl BucketStore {
    pub fn new(cfg: &MediaConfig) -> Result<Self, LinkHubError> {
        let region = Region::Custom {
            region: cfg.bucket_region.clone(),
            endpoint: cfg.bucket_endpoint.clone(),
        };
        let credentials = Credentials::new(
            Some(cfg.access_key_id.as_str()),
            Some(cfg.secret_access_key.as_str()),
            None,
            None,
            None,
        )
        .map_err(|e| LinkHubError::Config(format!("bucket credentials: {e}")))?;
        let bucket = Bucket::new(&cfg.bucket_name, region, credentials)
            .map_err(|e| LinkHubError::Config(format!("bucket: {e}")))?
            .with_path_style();

        Ok(Self {
            bucket,
            public_base_url: normalize_base_url(&cfg.public_base_url),
        })
    }

    fn key_for(&self, url: &str) -> Option<String> {
        key_from_url(&self.public_base_url, url)
    }
}

/// Accepts `cdn.example.com` as well as `https://cdn.example.com/`.
fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

fn key_from_url(base: &str, url: &str) -> Option<String> {
    if let Some(rest) = url.strip_prefix(base).and_then(|r| r.strip_prefix('/')) {
        return (!rest.is_empty()).then(|| rest.to_string());
    }
    let parsed = url::Url::parse(url).ok()?;
    let key = parsed.path().trim_start_matches('/');
    (!key.is_empty()).then(|| key.to_string())
}

fn check_status(op: &str, code: u16) -> Result<(), LinkHubError> {
    if (200..300).contains(&code) {
        Ok(())
    } else {
        Err(LinkHubError::Media(format!("{op} returned HTTP {code}")))
    }
}

#[async_trait]
impl MediaStore for BucketStore {
    async fn put(
        &self,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<String, LinkHubError> {
        let resp = self
            .bucket
            .put_object_with_content_type(key, &bytes, content_type)
            .await
            .map_err(|e| LinkHubError::Media(e.to_string()))?;
        check_status("put_object", resp.status_code())?;
        Ok(format!("{}/{}", self.public_base_url, key))
    }

    async fn delete(&self, url: &str) -> Result<(), LinkHubError> {
        let Some(key) = self.key_for(url) else {
            debug!(url, "not a bucket URL; nothing to delete");
            return Ok(());
        };
        let resp = self
            .bucket
            .delete_object(&key)
            .await
            .map_err(|e| LinkHubError::Media(e.to_string()))?;
        check_status("delete_object", resp.status_code())
    }
}
