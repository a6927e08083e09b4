//! Request and response bodies for the JSON API.
//!
//! Field names match what the web frontend sends and expects, including
//! the camel-cased `emojiId` on the like request.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use validator::Validate;

use crate::ids::EmojiId;

/// Upper bound on prompt length, in characters.
pub const MAX_PROMPT_CHARS: u64 = 500;

/// Body of `POST /api/generate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GenerateRequest {
    /// What the emoji should depict.
    #[validate(length(min = 1, max = MAX_PROMPT_CHARS))]
    pub prompt: String,
}

/// Response of a successful generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GenerateResponse {
    /// Public URL of the stored image.
    pub url: String,
    /// Identifier of the new emoji row.
    pub id: EmojiId,
}

/// Body of `POST /api/emojis/like`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LikeRequest {
    /// The emoji to like or unlike.
    #[serde(rename = "emojiId")]
    pub emoji_id: EmojiId,
    /// Target state: `true` to like, `false` to unlike.
    pub liked: bool,
}

/// Response of a like toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LikeResponse {
    /// The emoji's like counter after the update.
    pub likes_count: i32,
    /// The resulting liked state for the caller.
    pub liked: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_request_uses_camel_case_emoji_id() {
        let req: LikeRequest =
            serde_json::from_str(r#"{"emojiId": 12, "liked": true}"#).unwrap_or(LikeRequest {
                emoji_id: EmojiId::from(0),
                liked: false,
            });
        assert_eq!(req.emoji_id, EmojiId::from(12));
        assert!(req.liked);
    }

    #[test]
    fn empty_prompt_fails_validation() {
        let req = GenerateRequest {
            prompt: String::new(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn prompt_length_limit_is_max_prompt_chars() {
        let limit = usize::try_from(MAX_PROMPT_CHARS).unwrap_or(500);
        let at_limit = GenerateRequest {
            prompt: "é".repeat(limit),
        };
        assert!(at_limit.validate().is_ok());

        let over = GenerateRequest {
            prompt: "a".repeat(limit.saturating_add(1)),
        };
        assert!(over.validate().is_err());
    }

    #[test]
    fn ordinary_prompt_passes_validation() {
        let req = GenerateRequest {
            prompt: "a cat wearing sunglasses".to_owned(),
        };
        assert!(req.validate().is_ok());
    }
}
