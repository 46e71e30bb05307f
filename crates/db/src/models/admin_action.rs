//! Admin action log model.

use backdrop_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `admin_actions_log` table (append-only).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AdminAction {
    pub id: DbId,
    pub admin_id: Option<DbId>,
    pub action: String,
    pub target_type: String,
    pub target_id: Option<DbId>,
    pub details: serde_json::Value,
    pub created_at: Timestamp,
}

/// Insert DTO.
#[derive(Debug, Clone)]
pub struct CreateAdminAction {
    pub admin_id: Option<DbId>,
    pub action: String,
    pub target_type: String,
    pub target_id: Option<DbId>,
    pub details: serde_json::Value,
}
