//! Backend-agnostic store handle.
//!
//! Uses enum dispatch instead of trait objects because async methods are
//! not dyn-compatible. The API layer only ever talks to [`Store`], and the
//! entry point decides which backend sits behind it.

use emojigen_types::{Emoji, EmojiId, EmojiWithLike, NewEmoji, Profile, UserId};

use crate::error::DbError;
use crate::memory::MemoryStore;
use crate::postgres::PostgresPool;

/// Durable state for profiles, emojis, and likes.
#[derive(Clone)]
pub enum Store {
    /// `PostgreSQL`-backed tables.
    Postgres(PostgresPool),
    /// Process-local tables.
    Memory(MemoryStore),
}

impl Store {
    /// Human-readable backend name for logging.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::Memory(_) => "memory",
        }
    }

    /// Load a profile without creating it.
    pub async fn get_profile(&self, user_id: &UserId) -> Result<Option<Profile>, DbError> {
        match self {
            Self::Postgres(pg) => pg.profiles().get(user_id).await,
            Self::Memory(mem) => Ok(mem.get_profile(user_id).await),
        }
    }

    /// Return the caller's profile, creating it with defaults if absent.
    pub async fn get_or_create_profile(&self, user_id: &UserId) -> Result<Profile, DbError> {
        match self {
            Self::Postgres(pg) => pg.profiles().get_or_create(user_id).await,
            Self::Memory(mem) => Ok(mem.get_or_create_profile(user_id).await),
        }
    }

    /// Take one credit; `None` when there was nothing to take.
    pub async fn debit_credit(&self, user_id: &UserId) -> Result<Option<i32>, DbError> {
        match self {
            Self::Postgres(pg) => pg.profiles().debit_credit(user_id).await,
            Self::Memory(mem) => Ok(mem.debit_credit(user_id).await),
        }
    }

    /// Insert a new emoji with zero likes.
    pub async fn insert_emoji(&self, emoji: &NewEmoji) -> Result<Emoji, DbError> {
        match self {
            Self::Postgres(pg) => pg.emojis().insert(emoji).await,
            Self::Memory(mem) => Ok(mem.insert_emoji(emoji).await),
        }
    }

    /// Load one emoji.
    pub async fn get_emoji(&self, id: EmojiId) -> Result<Option<Emoji>, DbError> {
        match self {
            Self::Postgres(pg) => pg.emojis().get(id).await,
            Self::Memory(mem) => Ok(mem.get_emoji(id).await),
        }
    }

    /// All emojis newest first with the viewer's liked flag.
    pub async fn list_emojis_for(&self, viewer: &UserId) -> Result<Vec<EmojiWithLike>, DbError> {
        match self {
            Self::Postgres(pg) => pg.emojis().list_for(viewer).await,
            Self::Memory(mem) => Ok(mem.list_emojis_for(viewer).await),
        }
    }

    /// Record a like; `false` if it already existed.
    pub async fn insert_like(&self, user_id: &UserId, emoji_id: EmojiId) -> Result<bool, DbError> {
        match self {
            Self::Postgres(pg) => pg.likes().insert(user_id, emoji_id).await,
            Self::Memory(mem) => Ok(mem.insert_like(user_id, emoji_id).await),
        }
    }

    /// Remove a like; `true` if a row was deleted.
    pub async fn delete_like(&self, user_id: &UserId, emoji_id: EmojiId) -> Result<bool, DbError> {
        match self {
            Self::Postgres(pg) => pg.likes().delete(user_id, emoji_id).await,
            Self::Memory(mem) => Ok(mem.delete_like(user_id, emoji_id).await),
        }
    }

    /// Number of like rows for an emoji.
    pub async fn count_likes(&self, emoji_id: EmojiId) -> Result<i64, DbError> {
        match self {
            Self::Postgres(pg) => pg.likes().count_for(emoji_id).await,
            Self::Memory(mem) => Ok(mem.count_likes(emoji_id).await),
        }
    }

    /// Atomically add one to the like counter.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotFound`] if the emoji does not exist.
    pub async fn increment_likes(&self, id: EmojiId) -> Result<i32, DbError> {
        let count = match self {
            Self::Postgres(pg) => pg.emojis().increment_likes(id).await?,
            Self::Memory(mem) => mem.increment_likes(id).await,
        };
        count.ok_or_else(|| DbError::NotFound(format!("emoji {id}")))
    }

    /// Atomically subtract one from the like counter, clamped at zero.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotFound`] if the emoji does not exist.
    pub async fn decrement_likes(&self, id: EmojiId) -> Result<i32, DbError> {
        let count = match self {
            Self::Postgres(pg) => pg.emojis().decrement_likes(id).await?,
            Self::Memory(mem) => mem.decrement_likes(id).await,
        };
        count.ok_or_else(|| DbError::NotFound(format!("emoji {id}")))
    }
}

impl From<PostgresPool> for Store {
    fn from(pool: PostgresPool) -> Self {
        Self::Postgres(pool)
    }
}

impl From<MemoryStore> for Store {
    fn from(store: MemoryStore) -> Self {
        Self::Memory(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counter_on_missing_emoji_is_not_found() {
        let store = Store::from(MemoryStore::new());
        let result = store.increment_likes(EmojiId::from(5)).await;
        assert!(matches!(result, Err(DbError::NotFound(_))));
        let result = store.decrement_likes(EmojiId::from(5)).await;
        assert!(matches!(result, Err(DbError::NotFound(_))));
    }

    #[test]
    fn backend_name_reflects_variant() {
        assert_eq!(Store::from(MemoryStore::new()).name(), "memory");
    }
}
