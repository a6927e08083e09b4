//! The like index: one row per (user, emoji).

use emojigen_types::{EmojiId, UserId};
use sqlx::PgPool;

use crate::error::DbError;

/// Operations on the `emoji_likes` table.
pub struct LikeStore<'a> {
    pool: &'a PgPool,
}

impl<'a> LikeStore<'a> {
    /// Create a new like store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a like.
    ///
    /// Returns `false` when the pair already existed. The primary key makes
    /// this the authoritative duplicate check.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the insert fails (for example when
    /// the emoji does not exist).
    pub async fn insert(&self, user_id: &UserId, emoji_id: EmojiId) -> Result<bool, DbError> {
        let result = sqlx::query(
            r"INSERT INTO emoji_likes (user_id, emoji_id)
              VALUES ($1, $2)
              ON CONFLICT (user_id, emoji_id) DO NOTHING",
        )
        .bind(user_id.as_str())
        .bind(emoji_id.into_inner())
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove a like if present.
    ///
    /// Returns `true` if a row was deleted.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the delete fails.
    pub async fn delete(&self, user_id: &UserId, emoji_id: EmojiId) -> Result<bool, DbError> {
        let result = sqlx::query(
            r"DELETE FROM emoji_likes WHERE user_id = $1 AND emoji_id = $2",
        )
        .bind(user_id.as_str())
        .bind(emoji_id.into_inner())
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Number of like rows for an emoji.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn count_for(&self, emoji_id: EmojiId) -> Result<i64, DbError> {
        let row: (i64,) = sqlx::query_as(
            r"SELECT COUNT(*) FROM emoji_likes WHERE emoji_id = $1",
        )
        .bind(emoji_id.into_inner())
        .fetch_one(self.pool)
        .await?;

        Ok(row.0)
    }
}
