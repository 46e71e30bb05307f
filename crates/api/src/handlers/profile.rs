//! Handlers for the signed-in profile (`/profile/me`).

use axum::extract::{Query, State};
use axum::Json;
use backdrop_core::error::CoreError;
use backdrop_core::pagination::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use backdrop_core::validation::validate_name;
use backdrop_db::models::download_session::DownloadHistoryItem;
use backdrop_db::models::profile::{ProfileResponse, UpdateProfile};
use backdrop_db::repositories::{DownloadSessionRepo, ProfileRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

fn profile_not_found(id: i64) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Profile",
        id,
    })
}

/// GET /api/v1/profile/me
pub async fn get_me(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<ProfileResponse>>> {
    let profile = ProfileRepo::find_by_id(&state.pool, user.profile_id)
        .await?
        .ok_or_else(|| profile_not_found(user.profile_id))?;
    Ok(Json(DataResponse {
        data: profile.into(),
    }))
}

/// PUT /api/v1/profile/me
///
/// Update display name and/or avatar. Omitted fields are left unchanged.
pub async fn update_me(
    State(state): State<AppState>,
    user: AuthUser,
    Json(mut input): Json<UpdateProfile>,
) -> AppResult<Json<DataResponse<ProfileResponse>>> {
    if let Some(name) = input.display_name.as_mut() {
        *name = name.trim().to_string();
        validate_name("display_name", name)?;
    }

    let profile = ProfileRepo::update(&state.pool, user.profile_id, &input)
        .await?
        .ok_or_else(|| profile_not_found(user.profile_id))?;

    tracing::info!(profile_id = profile.id, "Profile updated");
    Ok(Json(DataResponse {
        data: profile.into(),
    }))
}

/// GET /api/v1/profile/me/downloads
///
/// Redeemed downloads, most recent first.
pub async fn my_downloads(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<DownloadHistoryItem>>>> {
    let limit = clamp_limit(params.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
    let offset = clamp_offset(params.offset);
    let items =
        DownloadSessionRepo::history_for_profile(&state.pool, user.profile_id, limit, offset)
            .await?;
    Ok(Json(DataResponse { data: items }))
}
