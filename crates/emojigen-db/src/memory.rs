//! In-memory store with the same semantics as the `PostgreSQL` tables.
//!
//! Used for local development without a database and by the API
//! integration tests. All tables live behind a single [`RwLock`], so every
//! operation is atomic with respect to the others.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::Utc;
use emojigen_types::{Emoji, EmojiId, EmojiLike, EmojiWithLike, NewEmoji, Profile, UserId};
use tokio::sync::RwLock;

/// Table contents guarded by the store's lock.
#[derive(Debug, Default)]
struct Tables {
    profiles: BTreeMap<UserId, Profile>,
    emojis: BTreeMap<EmojiId, Emoji>,
    likes: BTreeMap<(UserId, EmojiId), EmojiLike>,
    last_emoji_id: i64,
}

/// Cloneable handle to a shared set of in-memory tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a profile verbatim (seed data).
    pub async fn put_profile(&self, profile: Profile) {
        let mut tables = self.tables.write().await;
        tables.profiles.insert(profile.user_id.clone(), profile);
    }

    /// Load a profile by user ID.
    pub async fn get_profile(&self, user_id: &UserId) -> Option<Profile> {
        self.tables.read().await.profiles.get(user_id).cloned()
    }

    /// Return the profile, creating it with the default grant if absent.
    pub async fn get_or_create_profile(&self, user_id: &UserId) -> Profile {
        let mut tables = self.tables.write().await;
        tables
            .profiles
            .entry(user_id.clone())
            .or_insert_with(|| {
                tracing::info!(user_id = %user_id, "Created profile");
                Profile::new_default(user_id.clone(), Utc::now())
            })
            .clone()
    }

    /// Take one credit. `None` if the profile is missing or at zero.
    pub async fn debit_credit(&self, user_id: &UserId) -> Option<i32> {
        let mut tables = self.tables.write().await;
        let profile = tables.profiles.get_mut(user_id)?;
        if profile.credits <= 0 {
            return None;
        }
        profile.credits = profile.credits.saturating_sub(1);
        profile.updated_at = Utc::now();
        Some(profile.credits)
    }

    /// Insert an emoji with a fresh sequential ID and zero likes.
    pub async fn insert_emoji(&self, new: &NewEmoji) -> Emoji {
        let mut tables = self.tables.write().await;
        tables.last_emoji_id = tables.last_emoji_id.saturating_add(1);
        let emoji = Emoji {
            id: EmojiId::from(tables.last_emoji_id),
            image_url: new.image_url.clone(),
            prompt: new.prompt.clone(),
            likes_count: 0,
            creator_user_id: new.creator_user_id.clone(),
            created_at: Utc::now(),
        };
        tables.emojis.insert(emoji.id, emoji.clone());
        emoji
    }

    /// Load a single emoji.
    pub async fn get_emoji(&self, id: EmojiId) -> Option<Emoji> {
        self.tables.read().await.emojis.get(&id).cloned()
    }

    /// All emojis newest first, annotated with the viewer's liked flag.
    pub async fn list_emojis_for(&self, viewer: &UserId) -> Vec<EmojiWithLike> {
        let tables = self.tables.read().await;
        let liked: BTreeSet<EmojiId> = tables
            .likes
            .keys()
            .filter(|(user, _)| user == viewer)
            .map(|(_, emoji)| *emoji)
            .collect();

        let mut list: Vec<EmojiWithLike> = tables
            .emojis
            .values()
            .map(|emoji| EmojiWithLike {
                liked: liked.contains(&emoji.id),
                emoji: emoji.clone(),
            })
            .collect();
        list.sort_by(|a, b| {
            b.emoji
                .created_at
                .cmp(&a.emoji.created_at)
                .then_with(|| b.emoji.id.cmp(&a.emoji.id))
        });
        list
    }

    /// Record a like. `false` if it already existed.
    pub async fn insert_like(&self, user_id: &UserId, emoji_id: EmojiId) -> bool {
        let mut tables = self.tables.write().await;
        let key = (user_id.clone(), emoji_id);
        if tables.likes.contains_key(&key) {
            return false;
        }
        tables.likes.insert(
            key,
            EmojiLike {
                user_id: user_id.clone(),
                emoji_id,
                created_at: Utc::now(),
            },
        );
        true
    }

    /// Remove a like. `true` if a row was deleted.
    pub async fn delete_like(&self, user_id: &UserId, emoji_id: EmojiId) -> bool {
        self.tables
            .write()
            .await
            .likes
            .remove(&(user_id.clone(), emoji_id))
            .is_some()
    }

    /// Number of like rows for an emoji.
    pub async fn count_likes(&self, emoji_id: EmojiId) -> i64 {
        let count = self
            .tables
            .read()
            .await
            .likes
            .keys()
            .filter(|(_, emoji)| *emoji == emoji_id)
            .count();
        i64::try_from(count).unwrap_or(i64::MAX)
    }

    /// Add one to the like counter. `None` if the emoji is unknown.
    pub async fn increment_likes(&self, id: EmojiId) -> Option<i32> {
        let mut tables = self.tables.write().await;
        let emoji = tables.emojis.get_mut(&id)?;
        emoji.likes_count = emoji.likes_count.saturating_add(1);
        Some(emoji.likes_count)
    }

    /// Subtract one from the like counter, clamped at zero.
    pub async fn decrement_likes(&self, id: EmojiId) -> Option<i32> {
        let mut tables = self.tables.write().await;
        let emoji = tables.emojis.get_mut(&id)?;
        emoji.likes_count = emoji.likes_count.saturating_sub(1).max(0);
        Some(emoji.likes_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_emoji(user: &str, prompt: &str) -> NewEmoji {
        NewEmoji {
            image_url: format!("https://cdn.example/public/{prompt}.png"),
            prompt: prompt.to_owned(),
            creator_user_id: UserId::new(user),
        }
    }

    #[tokio::test]
    async fn profile_is_created_once_with_default_credits() {
        let store = MemoryStore::new();
        let user = UserId::new("u1");

        let first = store.get_or_create_profile(&user).await;
        assert_eq!(first.credits, 3);

        store.debit_credit(&user).await;
        let second = store.get_or_create_profile(&user).await;
        assert_eq!(second.credits, 2);
        assert_eq!(second.created_at, first.created_at);
    }

    #[tokio::test]
    async fn debit_stops_at_zero() {
        let store = MemoryStore::new();
        let user = UserId::new("u1");
        store.get_or_create_profile(&user).await;

        assert_eq!(store.debit_credit(&user).await, Some(2));
        assert_eq!(store.debit_credit(&user).await, Some(1));
        assert_eq!(store.debit_credit(&user).await, Some(0));
        assert_eq!(store.debit_credit(&user).await, None);
        assert_eq!(store.get_profile(&user).await.map(|p| p.credits), Some(0));
    }

    #[tokio::test]
    async fn debit_without_profile_is_none() {
        let store = MemoryStore::new();
        assert_eq!(store.debit_credit(&UserId::new("ghost")).await, None);
    }

    #[tokio::test]
    async fn emojis_get_sequential_ids_and_zero_likes() {
        let store = MemoryStore::new();
        let a = store.insert_emoji(&new_emoji("u1", "cat")).await;
        let b = store.insert_emoji(&new_emoji("u1", "dog")).await;
        assert_eq!(a.id, EmojiId::from(1));
        assert_eq!(b.id, EmojiId::from(2));
        assert_eq!(a.likes_count, 0);
    }

    #[tokio::test]
    async fn listing_is_newest_first_with_viewer_flag() {
        let store = MemoryStore::new();
        let viewer = UserId::new("viewer");
        let x = store.insert_emoji(&new_emoji("u1", "x")).await;
        let y = store.insert_emoji(&new_emoji("u1", "y")).await;
        store.insert_like(&viewer, x.id).await;
        store.insert_like(&UserId::new("other"), y.id).await;

        let list = store.list_emojis_for(&viewer).await;
        let ids: Vec<EmojiId> = list.iter().map(|e| e.emoji.id).collect();
        assert_eq!(ids, vec![y.id, x.id]);
        assert!(list.iter().any(|e| e.emoji.id == x.id && e.liked));
        assert!(list.iter().any(|e| e.emoji.id == y.id && !e.liked));
    }

    #[tokio::test]
    async fn like_pair_is_unique() {
        let store = MemoryStore::new();
        let user = UserId::new("u1");
        let emoji = store.insert_emoji(&new_emoji("u1", "cat")).await;

        assert!(store.insert_like(&user, emoji.id).await);
        assert!(!store.insert_like(&user, emoji.id).await);
        assert_eq!(store.count_likes(emoji.id).await, 1);

        assert!(store.delete_like(&user, emoji.id).await);
        assert!(!store.delete_like(&user, emoji.id).await);
        assert_eq!(store.count_likes(emoji.id).await, 0);
    }

    #[tokio::test]
    async fn counter_decrement_clamps_at_zero() {
        let store = MemoryStore::new();
        let emoji = store.insert_emoji(&new_emoji("u1", "cat")).await;

        assert_eq!(store.decrement_likes(emoji.id).await, Some(0));
        assert_eq!(store.increment_likes(emoji.id).await, Some(1));
        assert_eq!(store.decrement_likes(emoji.id).await, Some(0));
        assert_eq!(store.decrement_likes(emoji.id).await, Some(0));
    }

    #[tokio::test]
    async fn counter_on_unknown_emoji_is_none() {
        let store = MemoryStore::new();
        assert_eq!(store.increment_likes(EmojiId::from(99)).await, None);
        assert_eq!(store.decrement_likes(EmojiId::from(99)).await, None);
    }
}
