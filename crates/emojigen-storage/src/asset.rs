//! The unit of upload.

use uuid::Uuid;

/// Folder that holds publicly readable emoji images.
pub const PUBLIC_PREFIX: &str = "public";

/// Content type of every generated emoji.
pub const PNG_CONTENT_TYPE: &str = "image/png";

/// Cache lifetime advertised for stored images, in seconds.
pub const DEFAULT_CACHE_CONTROL_SECS: u32 = 3600;

/// An image ready to be written to object storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    /// Object path inside the bucket, e.g. `public/0190....png`.
    pub path: String,
    /// Encoded image.
    pub bytes: Vec<u8>,
    /// MIME type.
    pub content_type: &'static str,
    /// `Cache-Control` max age in seconds.
    pub cache_control_secs: u32,
}

impl ImageAsset {
    /// A PNG under [`PUBLIC_PREFIX`] with a fresh time-ordered name.
    pub fn png(bytes: Vec<u8>) -> Self {
        Self {
            path: format!("{PUBLIC_PREFIX}/{}.png", Uuid::now_v7()),
            bytes,
            content_type: PNG_CONTENT_TYPE,
            cache_control_secs: DEFAULT_CACHE_CONTROL_SECS,
        }
    }
}

/// Reject paths that could escape the bucket root.
pub(crate) fn check_path(path: &str) -> Result<(), crate::StorageError> {
    let bad = path.is_empty()
        || path.starts_with('/')
        || path.contains('\\')
        || path.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..");
    if bad {
        return Err(crate::StorageError::InvalidPath(path.to_owned()));
    }
    Ok(())
}
