//! Filesystem backend for local development.
//!
//! Objects are written below a root directory and are expected to be
//! served by something else under `base_url`.

use std::path::PathBuf;

use tokio::io::AsyncWriteExt;

use crate::asset::{ImageAsset, check_path};
use crate::error::StorageError;

/// Writes image assets to a local directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Store objects below `root`, publicly reachable under `base_url`.
    pub fn new(root: impl Into<PathBuf>, base_url: &str) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Write an asset and return its public URL. Never overwrites.
    pub async fn upload(&self, asset: &ImageAsset) -> Result<String, StorageError> {
        check_path(&asset.path)?;
        let target = self.root.join(&asset.path);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(StorageError::AlreadyExists(asset.path.clone()));
            }
            Err(e) => return Err(StorageError::Io(e)),
        };
        file.write_all(&asset.bytes).await?;
        file.flush().await?;

        tracing::info!(
            path = %target.display(),
            size = asset.bytes.len(),
            "Wrote image to local storage"
        );

        Ok(format!("{}/{}", self.base_url, asset.path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root() -> PathBuf {
        std::env::temp_dir().join(format!("emojigen-storage-{}", uuid::Uuid::now_v7()))
    }

    #[tokio::test]
    async fn upload_writes_file_and_returns_url() {
        let root = temp_root();
        let storage = LocalStorage::new(&root, "http://localhost:8080/assets/");
        let asset = ImageAsset::png(vec![9, 8, 7]);

        let url = storage.upload(&asset).await;
        assert_eq!(
            url.ok(),
            Some(format!("http://localhost:8080/assets/{}", asset.path))
        );
        let written = tokio::fs::read(root.join(&asset.path)).await.unwrap_or_default();
        assert_eq!(written, vec![9, 8, 7]);

        let _ = tokio::fs::remove_dir_all(&root).await;
    }

    #[tokio::test]
    async fn second_upload_to_same_path_is_refused() {
        let root = temp_root();
        let storage = LocalStorage::new(&root, "http://localhost");
        let asset = ImageAsset::png(vec![1]);

        assert!(storage.upload(&asset).await.is_ok());
        let again = storage.upload(&asset).await;
        assert!(matches!(again, Err(StorageError::AlreadyExists(_))));

        let _ = tokio::fs::remove_dir_all(&root).await;
    }
}
