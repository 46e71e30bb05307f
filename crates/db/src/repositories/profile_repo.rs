//! Repository for the `profiles` table.

use backdrop_core::subscription::TIER_PREMIUM;
use backdrop_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::profile::{
    CreateProfile, Profile, ProfileCounts, UpdateProfile, UpdateSubscription,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, email, password_hash, display_name, avatar_url, role, \
    subscription_tier, premium_until, is_active, created_at, updated_at";

/// Provides CRUD operations for profiles.
pub struct ProfileRepo;

impl ProfileRepo {
    /// Insert a new profile with the default role and free tier.
    pub async fn create(pool: &PgPool, input: &CreateProfile) -> Result<Profile, sqlx::Error> {
        let query = format!(
            "INSERT INTO profiles (email, password_hash, display_name)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.display_name)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM profiles WHERE id = $1");
        sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Look up by (already normalized) email.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM profiles WHERE email = $1");
        sqlx::query_as::<_, Profile>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// List profiles, newest first.
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Profile>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM profiles ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Update display name / avatar. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProfile,
    ) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!(
            "UPDATE profiles SET
                display_name = COALESCE($2, display_name),
                avatar_url = COALESCE($3, avatar_url)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .bind(&input.display_name)
            .bind(&input.avatar_url)
            .fetch_optional(pool)
            .await
    }

    /// Set tier and expiry. `premium_until` is written as given (including `NULL`).
    pub async fn update_subscription(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSubscription,
    ) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!(
            "UPDATE profiles SET subscription_tier = $2, premium_until = $3
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .bind(&input.subscription_tier)
            .bind(input.premium_until)
            .fetch_optional(pool)
            .await
    }

    pub async fn update_role(
        pool: &PgPool,
        id: DbId,
        role: &str,
    ) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!("UPDATE profiles SET role = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .bind(role)
            .fetch_optional(pool)
            .await
    }

    /// Total profiles and profiles with premium access at `now`.
    pub async fn counts(pool: &PgPool, now: Timestamp) -> Result<ProfileCounts, sqlx::Error> {
        sqlx::query_as::<_, ProfileCounts>(
            "SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (
                    WHERE subscription_tier = $1
                      AND (premium_until IS NULL OR premium_until > $2)
                ) AS premium_active
             FROM profiles",
        )
        .bind(TIER_PREMIUM)
        .bind(now)
        .fetch_one(pool)
        .await
    }
}
