//! Supabase Storage backend.
//!
//! Uploads with the service-role key and hands back the bucket's public
//! URL for the object. Overwrites are disabled (`x-upsert: false`).

use std::time::Duration;

use crate::asset::{ImageAsset, check_path};
use crate::error::StorageError;

/// Default bucket for emoji images.
pub const DEFAULT_BUCKET: &str = "emojis";

/// Default per-request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for Supabase Storage.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://abc.supabase.co`.
    pub project_url: String,
    /// Service-role key used for uploads.
    pub service_key: String,
    /// Bucket name.
    pub bucket: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl SupabaseConfig {
    /// Configuration for the default bucket.
    pub fn new(project_url: &str, service_key: &str) -> Self {
        Self {
            project_url: project_url.trim_end_matches('/').to_owned(),
            service_key: service_key.to_owned(),
            bucket: DEFAULT_BUCKET.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Use a different bucket.
    #[must_use]
    pub fn with_bucket(mut self, bucket: &str) -> Self {
        bucket.clone_into(&mut self.bucket);
        self
    }

    /// Endpoint that accepts an upload for `path`.
    pub fn upload_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{path}",
            self.project_url, self.bucket
        )
    }

    /// Public URL at which `path` is served.
    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{path}",
            self.project_url, self.bucket
        )
    }
}

/// Uploads image assets to a Supabase Storage bucket.
pub struct SupabaseStorage {
    client: reqwest::Client,
    config: SupabaseConfig,
}

impl SupabaseStorage {
    /// Create a storage client.
    pub fn new(config: SupabaseConfig) -> Result<Self, StorageError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StorageError::Http(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Upload an asset and return its public URL.
    pub async fn upload(&self, asset: &ImageAsset) -> Result<String, StorageError> {
        check_path(&asset.path)?;
        let url = self.config.upload_url(&asset.path);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.service_key)
            .header("apikey", &self.config.service_key)
            .header("Content-Type", asset.content_type)
            .header("Cache-Control", format!("max-age={}", asset.cache_control_secs))
            .header("x-upsert", "false")
            .body(asset.bytes.clone())
            .send()
            .await
            .map_err(|e| StorageError::Http(format!("Supabase upload failed: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::CONFLICT {
            return Err(StorageError::AlreadyExists(asset.path.clone()));
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_owned());
            return Err(StorageError::Rejected {
                path: asset.path.clone(),
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(
            path = asset.path,
            bucket = self.config.bucket,
            size = asset.bytes.len(),
            "Uploaded image to Supabase Storage"
        );

        Ok(self.config.public_url(&asset.path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_follow_storage_api_layout() {
        let config = SupabaseConfig::new("https://abc.supabase.co/", "key");
        assert_eq!(
            config.upload_url("public/a.png"),
            "https://abc.supabase.co/storage/v1/object/emojis/public/a.png"
        );
        assert_eq!(
            config.public_url("public/a.png"),
            "https://abc.supabase.co/storage/v1/object/public/emojis/public/a.png"
        );
    }

    #[test]
    fn custom_bucket_is_used() {
        let config = SupabaseConfig::new("https://abc.supabase.co", "key").with_bucket("art");
        assert!(config.public_url("x.png").contains("/public/art/x.png"));
    }
}
