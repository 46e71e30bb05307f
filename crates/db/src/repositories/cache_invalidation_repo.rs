//! Repository for the `cache_invalidations` table.

use backdrop_core::types::DbId;
use sqlx::PgPool;

use crate::models::cache_invalidation::CacheInvalidation;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, cache_key, reason, requested_by, processed, processed_at, created_at, updated_at";

/// Provides insert, listing and processing for cache invalidation requests.
pub struct CacheInvalidationRepo;

impl CacheInvalidationRepo {
    /// Record a pending invalidation.
    pub async fn create(
        pool: &PgPool,
        cache_key: &str,
        reason: Option<&str>,
        requested_by: Option<DbId>,
    ) -> Result<CacheInvalidation, sqlx::Error> {
        let query = format!(
            "INSERT INTO cache_invalidations (cache_key, reason, requested_by)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CacheInvalidation>(&query)
            .bind(cache_key)
            .bind(reason)
            .bind(requested_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<CacheInvalidation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM cache_invalidations WHERE id = $1");
        sqlx::query_as::<_, CacheInvalidation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List invalidations, newest first, optionally filtered by `processed`.
    pub async fn list(
        pool: &PgPool,
        processed: Option<bool>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CacheInvalidation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM cache_invalidations
             WHERE ($1::BOOLEAN IS NULL OR processed = $1)
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, CacheInvalidation>(&query)
            .bind(processed)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Oldest pending invalidations first.
    pub async fn list_pending(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<CacheInvalidation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM cache_invalidations
             WHERE NOT processed
             ORDER BY created_at, id
             LIMIT $1"
        );
        sqlx::query_as::<_, CacheInvalidation>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Invalidations with an id above `after_id`, in id order, processed or not.
    pub async fn list_after(
        pool: &PgPool,
        after_id: DbId,
        limit: i64,
    ) -> Result<Vec<CacheInvalidation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM cache_invalidations
             WHERE id > $1
             ORDER BY id
             LIMIT $2"
        );
        sqlx::query_as::<_, CacheInvalidation>(&query)
            .bind(after_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Highest id recorded so far, or `None` for an empty table.
    pub async fn latest_id(pool: &PgPool) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, Option<DbId>>("SELECT MAX(id) FROM cache_invalidations")
            .fetch_one(pool)
            .await
    }

    /// Mark a single invalidation processed. Returns `None` if it does not exist.
    /// Already-processed rows keep their original `processed_at`.
    pub async fn mark_processed(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<CacheInvalidation>, sqlx::Error> {
        let query = format!(
            "UPDATE cache_invalidations
             SET processed = TRUE, processed_at = COALESCE(processed_at, NOW())
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CacheInvalidation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Mark a batch processed. Returns the number of rows changed.
    pub async fn mark_many_processed(pool: &PgPool, ids: &[DbId]) -> Result<u64, sqlx::Error> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            "UPDATE cache_invalidations
             SET processed = TRUE, processed_at = NOW()
             WHERE id = ANY($1) AND NOT processed",
        )
        .bind(ids)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
