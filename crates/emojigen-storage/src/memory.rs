//! In-process object store used by tests and offline runs.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::asset::{ImageAsset, check_path};
use crate::error::StorageError;

/// Cloneable handle to a shared map of stored objects.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    objects: Arc<RwLock<BTreeMap<String, ImageAsset>>>,
    base_url: String,
}

impl MemoryStorage {
    /// Empty store whose public URLs start with `base_url`.
    pub fn new(base_url: &str) -> Self {
        Self {
            objects: Arc::new(RwLock::new(BTreeMap::new())),
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Store an asset and return its public URL. Never overwrites.
    pub async fn upload(&self, asset: &ImageAsset) -> Result<String, StorageError> {
        check_path(&asset.path)?;
        let mut objects = self.objects.write().await;
        if objects.contains_key(&asset.path) {
            return Err(StorageError::AlreadyExists(asset.path.clone()));
        }
        objects.insert(asset.path.clone(), asset.clone());
        Ok(format!("{}/{}", self.base_url, asset.path))
    }

    /// Fetch a stored object by path.
    pub async fn get(&self, path: &str) -> Option<ImageAsset> {
        self.objects.read().await.get(path).cloned()
    }

    /// Number of stored objects.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    /// Whether nothing has been stored.
    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_and_returns_objects() {
        let storage = MemoryStorage::new("https://cdn.test/");
        let asset = ImageAsset::png(vec![4, 2]);

        let url = storage.upload(&asset).await.unwrap_or_default();
        assert_eq!(url, format!("https://cdn.test/{}", asset.path));
        assert_eq!(storage.len().await, 1);
        assert_eq!(storage.get(&asset.path).await.map(|a| a.bytes), Some(vec![4, 2]));
    }

    #[tokio::test]
    async fn duplicate_path_is_refused() {
        let storage = MemoryStorage::new("https://cdn.test");
        let asset = ImageAsset::png(vec![1]);
        assert!(storage.upload(&asset).await.is_ok());
        assert!(matches!(
            storage.upload(&asset).await,
            Err(StorageError::AlreadyExists(_))
        ));
        assert_eq!(storage.len().await, 1);
    }
}
