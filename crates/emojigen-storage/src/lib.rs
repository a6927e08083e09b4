//! Object storage for generated emoji images.
//!
//! [`AssetStore`] persists an [`ImageAsset`] and returns the URL it is
//! publicly served from. Backends:
//!
//! - [`supabase`] -- Supabase Storage bucket over HTTP
//! - [`local`] -- a directory on disk
//! - [`memory`] -- process-local map

pub mod asset;
pub mod error;
pub mod local;
pub mod memory;
pub mod supabase;

pub use asset::{DEFAULT_CACHE_CONTROL_SECS, ImageAsset, PNG_CONTENT_TYPE, PUBLIC_PREFIX};
pub use error::StorageError;
pub use local::LocalStorage;
pub use memory::MemoryStorage;
pub use supabase::{DEFAULT_BUCKET, SupabaseConfig, SupabaseStorage};

/// Where image assets are written.
///
/// Enum dispatch, since async methods are not dyn-compatible.
pub enum AssetStore {
    /// Supabase Storage bucket.
    Supabase(SupabaseStorage),
    /// Local directory.
    Local(LocalStorage),
    /// In-process map.
    Memory(MemoryStorage),
}

impl AssetStore {
    /// Persist an asset and return its public URL.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the write fails or the path is taken.
    pub async fn upload(&self, asset: &ImageAsset) -> Result<String, StorageError> {
        match self {
            Self::Supabase(store) => store.upload(asset).await,
            Self::Local(store) => store.upload(asset).await,
            Self::Memory(store) => store.upload(asset).await,
        }
    }

    /// Human-readable backend name for logging.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Supabase(_) => "supabase",
            Self::Local(_) => "local",
            Self::Memory(_) => "memory",
        }
    }
}
