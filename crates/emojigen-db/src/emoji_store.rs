//! Emoji persistence and the denormalized like counter.
//!
//! Counter changes are single-statement increments so concurrent toggles
//! on the same emoji never lose an update. The decrement is clamped at
//! zero in SQL.

use chrono::{DateTime, Utc};
use emojigen_types::{Emoji, EmojiId, EmojiWithLike, NewEmoji, UserId};
use sqlx::PgPool;

use crate::error::DbError;

/// Operations on the `emojis` table.
pub struct EmojiStore<'a> {
    pool: &'a PgPool,
}

impl<'a> EmojiStore<'a> {
    /// Create a new emoji store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new emoji with `likes_count = 0`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the insert fails.
    pub async fn insert(&self, emoji: &NewEmoji) -> Result<Emoji, DbError> {
        let row = sqlx::query_as::<_, EmojiRow>(
            r"INSERT INTO emojis (image_url, prompt, likes_count, creator_user_id)
              VALUES ($1, $2, 0, $3)
              RETURNING id, image_url, prompt, likes_count, creator_user_id, created_at",
        )
        .bind(&emoji.image_url)
        .bind(&emoji.prompt)
        .bind(emoji.creator_user_id.as_str())
        .fetch_one(self.pool)
        .await?;

        tracing::info!(
            emoji_id = row.id,
            creator = %emoji.creator_user_id,
            "Inserted emoji"
        );

        Ok(row.into())
    }

    /// Load a single emoji by ID.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn get(&self, id: EmojiId) -> Result<Option<Emoji>, DbError> {
        let row = sqlx::query_as::<_, EmojiRow>(
            r"SELECT id, image_url, prompt, likes_count, creator_user_id, created_at
              FROM emojis
              WHERE id = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// List every emoji, newest first, with the caller's liked flag.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn list_for(&self, viewer: &UserId) -> Result<Vec<EmojiWithLike>, DbError> {
        let rows = sqlx::query_as::<_, EmojiLikeRow>(
            r"SELECT e.id, e.image_url, e.prompt, e.likes_count, e.creator_user_id, e.created_at,
                     (l.user_id IS NOT NULL) AS liked
              FROM emojis e
              LEFT JOIN emoji_likes l
                ON l.emoji_id = e.id AND l.user_id = $1
              ORDER BY e.created_at DESC, e.id DESC",
        )
        .bind(viewer.as_str())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Atomically add one to the like counter.
    ///
    /// Returns the new count, or `None` if the emoji does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the update fails.
    pub async fn increment_likes(&self, id: EmojiId) -> Result<Option<i32>, DbError> {
        let row: Option<(i32,)> = sqlx::query_as(
            r"UPDATE emojis
              SET likes_count = likes_count + 1
              WHERE id = $1
              RETURNING likes_count",
        )
        .bind(id.into_inner())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|(count,)| count))
    }

    /// Atomically subtract one from the like counter, never going below zero.
    ///
    /// Returns the new count, or `None` if the emoji does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the update fails.
    pub async fn decrement_likes(&self, id: EmojiId) -> Result<Option<i32>, DbError> {
        let row: Option<(i32,)> = sqlx::query_as(
            r"UPDATE emojis
              SET likes_count = GREATEST(likes_count - 1, 0)
              WHERE id = $1
              RETURNING likes_count",
        )
        .bind(id.into_inner())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|(count,)| count))
    }
}

/// A row from the `emojis` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EmojiRow {
    /// Emoji key.
    pub id: i64,
    /// Public image URL.
    pub image_url: String,
    /// Caller prompt.
    pub prompt: String,
    /// Denormalized like counter.
    pub likes_count: i32,
    /// Creator identity.
    pub creator_user_id: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<EmojiRow> for Emoji {
    fn from(row: EmojiRow) -> Self {
        Self {
            id: EmojiId::from(row.id),
            image_url: row.image_url,
            prompt: row.prompt,
            likes_count: row.likes_count,
            creator_user_id: UserId::from(row.creator_user_id),
            created_at: row.created_at,
        }
    }
}

/// An `emojis` row left-joined against the viewer's like.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EmojiLikeRow {
    /// The emoji columns.
    #[sqlx(flatten)]
    pub emoji: EmojiRow,
    /// Whether the viewer has a like row for this emoji.
    pub liked: bool,
}

impl From<EmojiLikeRow> for EmojiWithLike {
    fn from(row: EmojiLikeRow) -> Self {
        Self {
            emoji: row.emoji.into(),
            liked: row.liked,
        }
    }
}
