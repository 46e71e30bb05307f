//! Cache invalidation request model.

use backdrop_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `cache_invalidations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CacheInvalidation {
    pub id: DbId,
    pub cache_key: String,
    pub reason: Option<String>,
    pub requested_by: Option<DbId>,
    pub processed: bool,
    pub processed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for `POST /admin/cache/invalidate`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCacheInvalidation {
    pub cache_key: String,
    pub reason: Option<String>,
}
