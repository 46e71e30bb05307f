//! Repository for the `admin_actions_log` table (append-only).

use sqlx::PgPool;

use crate::models::admin_action::{AdminAction, CreateAdminAction};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, admin_id, action, target_type, target_id, details, created_at";

/// Provides append and query operations for the admin action log.
pub struct AdminActionRepo;

impl AdminActionRepo {
    pub async fn record(
        pool: &PgPool,
        input: &CreateAdminAction,
    ) -> Result<AdminAction, sqlx::Error> {
        let query = format!(
            "INSERT INTO admin_actions_log (admin_id, action, target_type, target_id, details)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AdminAction>(&query)
            .bind(input.admin_id)
            .bind(&input.action)
            .bind(&input.target_type)
            .bind(input.target_id)
            .bind(&input.details)
            .fetch_one(pool)
            .await
    }

    /// Newest first, optionally filtered by exact action name.
    pub async fn list(
        pool: &PgPool,
        action: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AdminAction>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM admin_actions_log
             WHERE ($1::TEXT IS NULL OR action = $1)
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, AdminAction>(&query)
            .bind(action)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
