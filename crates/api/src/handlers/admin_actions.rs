//! Admin action log: the recording helper used by every admin mutation, and
//! the listing endpoint.

use axum::extract::{Query, State};
use axum::Json;
use backdrop_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LOG_LIMIT, MAX_LOG_LIMIT};
use backdrop_core::types::DbId;
use backdrop_db::models::admin_action::{AdminAction, CreateAdminAction};
use backdrop_db::repositories::AdminActionRepo;
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /admin/actions`.
#[derive(Debug, Deserialize)]
pub struct ActionLogQuery {
    /// Exact action name, e.g. `wallpaper.update`.
    pub action: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Append a row to `admin_actions_log`.
///
/// The mutation it describes has already happened, so a failure here is
/// logged and swallowed.
pub async fn record_admin_action(
    state: &AppState,
    admin: &AuthUser,
    action: &str,
    target_type: &str,
    target_id: Option<DbId>,
    details: serde_json::Value,
) {
    let entry = CreateAdminAction {
        admin_id: Some(admin.profile_id),
        action: action.to_string(),
        target_type: target_type.to_string(),
        target_id,
        details,
    };
    match AdminActionRepo::record(&state.pool, &entry).await {
        Ok(row) => tracing::info!(
            admin_id = admin.profile_id,
            action,
            target_type,
            target_id = ?target_id,
            log_id = row.id,
            "Admin action recorded"
        ),
        Err(e) => tracing::warn!(
            admin_id = admin.profile_id,
            action,
            error = %e,
            "Failed to record admin action"
        ),
    }
}

/// GET /api/v1/admin/actions
pub async fn list_actions(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<ActionLogQuery>,
) -> AppResult<Json<DataResponse<Vec<AdminAction>>>> {
    let limit = clamp_limit(params.limit, DEFAULT_LOG_LIMIT, MAX_LOG_LIMIT);
    let offset = clamp_offset(params.offset);
    let action = params
        .action
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty());
    let rows = AdminActionRepo::list(&state.pool, action, limit, offset).await?;
    Ok(Json(DataResponse { data: rows }))
}
