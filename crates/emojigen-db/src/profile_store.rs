//! Profile persistence: get-or-create and the credit debit.
//!
//! Credits are only ever decremented through a single conditional
//! `UPDATE`, so the balance cannot go below zero even when two
//! generations from the same caller race.

use chrono::{DateTime, Utc};
use emojigen_types::{DEFAULT_CREDITS, Profile, Tier, UserId};
use sqlx::PgPool;

use crate::error::DbError;

/// Operations on the `profiles` table.
pub struct ProfileStore<'a> {
    pool: &'a PgPool,
}

impl<'a> ProfileStore<'a> {
    /// Create a new profile store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Load a profile by user ID.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails, or
    /// [`DbError::InvalidData`] if the stored tier is not recognised.
    pub async fn get(&self, user_id: &UserId) -> Result<Option<Profile>, DbError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r"SELECT user_id, credits, tier, stripe_customer_id, stripe_subscription_id,
                     created_at, updated_at
              FROM profiles
              WHERE user_id = $1",
        )
        .bind(user_id.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(ProfileRow::into_profile).transpose()
    }

    /// Return the caller's profile, creating it with the default grant if
    /// it does not exist yet.
    ///
    /// The insert is `ON CONFLICT DO NOTHING` followed by a read, so two
    /// concurrent first requests both observe the same row.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if either statement fails and
    /// [`DbError::NotFound`] if the row vanished between insert and read.
    pub async fn get_or_create(&self, user_id: &UserId) -> Result<Profile, DbError> {
        if let Some(profile) = self.get(user_id).await? {
            return Ok(profile);
        }

        let result = sqlx::query(
            r"INSERT INTO profiles (user_id, credits, tier)
              VALUES ($1, $2, $3)
              ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(user_id.as_str())
        .bind(DEFAULT_CREDITS)
        .bind(Tier::Free.as_str())
        .execute(self.pool)
        .await?;

        if result.rows_affected() > 0 {
            tracing::info!(user_id = %user_id, credits = DEFAULT_CREDITS, "Created profile");
        }

        self.get(user_id)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("profile {user_id}")))
    }

    /// Take one credit from the caller.
    ///
    /// Returns the remaining balance, or `None` when the profile is missing
    /// or already at zero (in which case nothing changed).
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the update fails.
    pub async fn debit_credit(&self, user_id: &UserId) -> Result<Option<i32>, DbError> {
        let row: Option<(i32,)> = sqlx::query_as(
            r"UPDATE profiles
              SET credits = credits - 1, updated_at = now()
              WHERE user_id = $1 AND credits > 0
              RETURNING credits",
        )
        .bind(user_id.as_str())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|(credits,)| credits))
    }
}

/// A row from the `profiles` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProfileRow {
    /// Owner of the profile.
    pub user_id: String,
    /// Remaining credits.
    pub credits: i32,
    /// Tier as stored (`free` or `pro`).
    pub tier: String,
    /// Billing customer reference.
    pub stripe_customer_id: Option<String>,
    /// Billing subscription reference.
    pub stripe_subscription_id: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl ProfileRow {
    /// Convert the raw row into a domain [`Profile`].
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidData`] if the tier string is unknown.
    pub fn into_profile(self) -> Result<Profile, DbError> {
        let tier = self
            .tier
            .parse::<Tier>()
            .map_err(|e| DbError::InvalidData(format!("profile {}: {e}", self.user_id)))?;

        Ok(Profile {
            user_id: UserId::from(self.user_id),
            credits: self.credits,
            tier,
            stripe_customer_id: self.stripe_customer_id,
            stripe_subscription_id: self.stripe_subscription_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(tier: &str) -> ProfileRow {
        ProfileRow {
            user_id: "user_1".to_owned(),
            credits: 2,
            tier: tier.to_owned(),
            stripe_customer_id: Some("cus_123".to_owned()),
            stripe_subscription_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn row_maps_onto_profile() {
        let profile = row("pro").into_profile();
        assert!(profile.is_ok());
        let profile = profile.unwrap_or_else(|_| Profile::new_default(UserId::new("x"), Utc::now()));
        assert_eq!(profile.user_id, UserId::new("user_1"));
        assert_eq!(profile.tier, Tier::Pro);
        assert_eq!(profile.credits, 2);
        assert_eq!(profile.stripe_customer_id.as_deref(), Some("cus_123"));
    }

    #[test]
    fn unknown_tier_is_invalid_data() {
        let result = row("platinum").into_profile();
        assert!(matches!(result, Err(DbError::InvalidData(_))));
    }
}
