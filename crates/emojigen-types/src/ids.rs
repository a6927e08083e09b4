//! Type-safe identifier wrappers.
//!
//! User identifiers are opaque strings issued by the external identity
//! provider. Emoji identifiers are `BIGSERIAL` keys assigned by
//! `PostgreSQL` (or by the in-memory store's counter).

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Identity of a caller as issued by the authentication provider.
///
/// Serialized as a bare string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct UserId(pub String);

impl UserId {
    /// Wrap a provider-issued identity string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for UserId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Unique identifier of a generated emoji.
///
/// Serialized as a JSON number.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct EmojiId(#[ts(type = "number")] pub i64);

impl EmojiId {
    /// Return the inner integer key.
    pub const fn into_inner(self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for EmojiId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for EmojiId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<EmojiId> for i64 {
    fn from(id: EmojiId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_serializes_as_bare_string() {
        let id = UserId::new("user_2abc");
        let json = serde_json::to_string(&id).unwrap_or_default();
        assert_eq!(json, "\"user_2abc\"");
    }

    #[test]
    fn emoji_id_serializes_as_number() {
        let id = EmojiId::from(42);
        let json = serde_json::to_string(&id).unwrap_or_default();
        assert_eq!(json, "42");
        assert_eq!(id.into_inner(), 42);
    }
}
