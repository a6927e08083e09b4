//! Shared application state for the API server.
//!
//! [`AppState`] bundles the handles every request needs. The entry point
//! builds it once and the router shares it behind an [`Arc`](std::sync::Arc).

use emojigen_db::Store;
use emojigen_inference::ImageBackend;
use emojigen_storage::AssetStore;

use crate::auth::Authenticator;

/// Handles shared by all request handlers.
pub struct AppState {
    /// Profiles, emojis and likes.
    pub store: Store,
    /// Image generation.
    pub images: ImageBackend,
    /// Where generated images are persisted.
    pub assets: AssetStore,
    /// Caller identification.
    pub auth: Authenticator,
}

impl AppState {
    /// Bundle the given handles.
    pub const fn new(
        store: Store,
        images: ImageBackend,
        assets: AssetStore,
        auth: Authenticator,
    ) -> Self {
        Self {
            store,
            images,
            assets,
            auth,
        }
    }
}
