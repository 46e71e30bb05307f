//! Admin profile management: listing, subscription and role changes.

use axum::extract::{Path, Query, State};
use axum::Json;
use backdrop_core::error::CoreError;
use backdrop_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LOG_LIMIT, MAX_LOG_LIMIT};
use backdrop_core::roles::validate_role;
use backdrop_core::subscription::{validate_tier, TIER_FREE};
use backdrop_core::types::DbId;
use backdrop_db::models::profile::{ProfileResponse, UpdateRole, UpdateSubscription};
use backdrop_db::repositories::ProfileRepo;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::handlers::admin_actions::record_admin_action;
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

fn profile_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Profile",
        id,
    })
}

/// GET /api/v1/admin/profiles
pub async fn list_profiles(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<ProfileResponse>>>> {
    let limit = clamp_limit(params.limit, DEFAULT_LOG_LIMIT, MAX_LOG_LIMIT);
    let offset = clamp_offset(params.offset);
    let profiles = ProfileRepo::list(&state.pool, limit, offset).await?;
    Ok(Json(DataResponse {
        data: profiles.into_iter().map(ProfileResponse::from).collect(),
    }))
}

/// PUT /api/v1/admin/profiles/{id}/subscription
///
/// Set tier and expiry. Downgrading to `free` clears `premium_until`.
pub async fn update_subscription(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateSubscription>,
) -> AppResult<Json<DataResponse<ProfileResponse>>> {
    validate_tier(&input.subscription_tier)?;
    if input.subscription_tier == TIER_FREE {
        input.premium_until = None;
    }

    let profile = ProfileRepo::update_subscription(&state.pool, id, &input)
        .await?
        .ok_or_else(|| profile_not_found(id))?;

    record_admin_action(
        &state,
        &admin,
        "profile.update_subscription",
        "profile",
        Some(id),
        json!({
            "subscription_tier": profile.subscription_tier,
            "premium_until": profile.premium_until,
        }),
    )
    .await;

    Ok(Json(DataResponse {
        data: profile.into(),
    }))
}

/// PUT /api/v1/admin/profiles/{id}/role
///
/// Admins cannot change their own role.
pub async fn update_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateRole>,
) -> AppResult<Json<DataResponse<ProfileResponse>>> {
    validate_role(&input.role)?;
    if id == admin.profile_id {
        return Err(AppError::Core(CoreError::Conflict(
            "Admins cannot change their own role".into(),
        )));
    }

    let profile = ProfileRepo::update_role(&state.pool, id, &input.role)
        .await?
        .ok_or_else(|| profile_not_found(id))?;

    record_admin_action(
        &state,
        &admin,
        "profile.update_role",
        "profile",
        Some(id),
        json!({ "role": profile.role }),
    )
    .await;

    Ok(Json(DataResponse {
        data: profile.into(),
    }))
}
