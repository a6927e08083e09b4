//! Stored records for profiles, emojis and likes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::Tier;
use crate::ids::{EmojiId, UserId};

/// Credits granted to a profile when it is first created.
pub const DEFAULT_CREDITS: i32 = 3;

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// Per-user account record carrying the credit balance.
///
/// Created lazily on first access with [`DEFAULT_CREDITS`] and
/// [`Tier::Free`]. Never deleted by this service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Profile {
    /// Owner of the profile.
    pub user_id: UserId,
    /// Remaining generations. Never negative.
    pub credits: i32,
    /// Subscription tier.
    pub tier: Tier,
    /// Billing customer reference, if the user ever subscribed.
    pub stripe_customer_id: Option<String>,
    /// Billing subscription reference, if one is active.
    pub stripe_subscription_id: Option<String>,
    /// When the profile was created.
    pub created_at: DateTime<Utc>,
    /// When the profile was last modified.
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// A fresh profile with the default credit grant.
    pub fn new_default(user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            credits: DEFAULT_CREDITS,
            tier: Tier::Free,
            stripe_customer_id: None,
            stripe_subscription_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the profile can pay for one more generation.
    pub const fn has_credits(&self) -> bool {
        self.credits > 0
    }
}

// ---------------------------------------------------------------------------
// Emoji
// ---------------------------------------------------------------------------

/// A generated emoji image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Emoji {
    /// Unique emoji identifier.
    pub id: EmojiId,
    /// Public URL of the stored image asset.
    pub image_url: String,
    /// The prompt the caller typed (before templating).
    pub prompt: String,
    /// Denormalized count of like rows for this emoji.
    pub likes_count: i32,
    /// Who generated the emoji.
    pub creator_user_id: UserId,
    /// When the emoji was created.
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when inserting a new emoji.
///
/// `likes_count` always starts at zero and `id`/`created_at` are assigned
/// by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmoji {
    /// Public URL of the stored image asset.
    pub image_url: String,
    /// The caller's prompt.
    pub prompt: String,
    /// Who generated the emoji.
    pub creator_user_id: UserId,
}

/// An emoji annotated with whether the requesting caller liked it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EmojiWithLike {
    /// The emoji row.
    #[serde(flatten)]
    pub emoji: Emoji,
    /// `true` when a like row exists for (caller, emoji).
    pub liked: bool,
}

// ---------------------------------------------------------------------------
// Like
// ---------------------------------------------------------------------------

/// One user's like of one emoji. Unique per (user, emoji).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmojiLike {
    /// The user who liked.
    pub user_id: UserId,
    /// The liked emoji.
    pub emoji_id: EmojiId,
    /// When the like was recorded.
    pub created_at: DateTime<Utc>,
}
