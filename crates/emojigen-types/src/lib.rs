//! Shared type definitions for the Emojigen service.
//!
//! This crate is the single source of truth for the records and payloads
//! that cross the HTTP boundary. Types defined here flow downstream to
//! `TypeScript` via `ts-rs` for the web frontend.
//!
//! # Modules
//!
//! - [`ids`] -- Strongly-typed identifiers for users and emojis
//! - [`enums`] -- Enumeration types (subscription tier)
//! - [`structs`] -- Stored records (profiles, emojis, likes)
//! - [`api`] -- Request and response bodies for the JSON API

pub mod api;
pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use api::{GenerateRequest, GenerateResponse, LikeRequest, LikeResponse, MAX_PROMPT_CHARS};
pub use enums::{Tier, UnknownTier};
pub use ids::{EmojiId, UserId};
pub use structs::{DEFAULT_CREDITS, Emoji, EmojiLike, EmojiWithLike, NewEmoji, Profile};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // Files are written to the `bindings/` directory relative to the
        // crate root.
        use ts_rs::TS;

        let _ = crate::ids::UserId::export_all();
        let _ = crate::ids::EmojiId::export_all();
        let _ = crate::enums::Tier::export_all();
        let _ = crate::structs::Profile::export_all();
        let _ = crate::structs::Emoji::export_all();
        let _ = crate::structs::EmojiWithLike::export_all();
        let _ = crate::api::GenerateRequest::export_all();
        let _ = crate::api::GenerateResponse::export_all();
        let _ = crate::api::LikeRequest::export_all();
        let _ = crate::api::LikeResponse::export_all();
    }
}
