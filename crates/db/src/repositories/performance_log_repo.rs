//! Repository for the `performance_logs` table.

use backdrop_core::types::Timestamp;
use sqlx::PgPool;

use crate::models::performance_log::{CreatePerformanceLog, PerformanceLog};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, source, name, method, status_code, duration_ms, created_at";

/// Provides append and query operations for request timings.
pub struct PerformanceLogRepo;

impl PerformanceLogRepo {
    pub async fn insert(pool: &PgPool, input: &CreatePerformanceLog) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO performance_logs (source, name, method, status_code, duration_ms)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(input.source)
        .bind(&input.name)
        .bind(&input.method)
        .bind(input.status_code)
        .bind(input.duration_ms)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Rows for one source created in `[from, to)`, newest first, capped at `limit`.
    pub async fn list_between(
        pool: &PgPool,
        source: &str,
        from: Timestamp,
        to: Timestamp,
        limit: i64,
    ) -> Result<Vec<PerformanceLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM performance_logs
             WHERE source = $1 AND created_at >= $2 AND created_at < $3
             ORDER BY created_at DESC
             LIMIT $4"
        );
        sqlx::query_as::<_, PerformanceLog>(&query)
            .bind(source)
            .bind(from)
            .bind(to)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// A page of raw rows, newest first, optionally filtered by source.
    pub async fn list_page(
        pool: &PgPool,
        source: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PerformanceLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM performance_logs
             WHERE ($1::TEXT IS NULL OR source = $1)
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, PerformanceLog>(&query)
            .bind(source)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Delete rows older than `cutoff`. Returns the number removed.
    pub async fn delete_older_than(pool: &PgPool, cutoff: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM performance_logs WHERE created_at < $1")
            .bind(cutoff)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
