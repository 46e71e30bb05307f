//! Admin cache management.
//!
//! An invalidation is applied to this process's response cache right away
//! and recorded in `cache_invalidations`. Every instance's cache sync task
//! applies rows past its own cursor, so the recorded row reaches the other
//! instances too; `processed` marks that at least one of them has.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use backdrop_core::cache::{validate_cache_key, InvalidationTarget, CLEAR_ALL_CACHE};
use backdrop_core::error::CoreError;
use backdrop_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LOG_LIMIT, MAX_LOG_LIMIT};
use backdrop_core::types::DbId;
use backdrop_db::models::cache_invalidation::{CacheInvalidation, CreateCacheInvalidation};
use backdrop_db::repositories::CacheInvalidationRepo;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::handlers::admin_actions::record_admin_action;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Longest accepted `reason`.
const MAX_REASON_LEN: usize = 500;

/// Query parameters for `GET /admin/cache/invalidations`.
#[derive(Debug, Deserialize)]
pub struct InvalidationListQuery {
    pub processed: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Optional body for `POST /admin/cache/clear-all`.
#[derive(Debug, Default, Deserialize)]
pub struct ClearAllRequest {
    pub reason: Option<String>,
}

/// Outcome of an invalidation request.
#[derive(Debug, Serialize)]
pub struct InvalidationResult {
    pub invalidation: CacheInvalidation,
    /// Entries dropped from this instance's cache.
    pub entries_removed: usize,
}

fn normalize_reason(reason: Option<&str>) -> AppResult<Option<String>> {
    let reason = reason.map(str::trim).filter(|r| !r.is_empty());
    if let Some(r) = reason {
        if r.chars().count() > MAX_REASON_LEN {
            return Err(AppError::Core(CoreError::Validation(format!(
                "reason must be at most {MAX_REASON_LEN} characters"
            ))));
        }
    }
    Ok(reason.map(str::to_string))
}

async fn invalidate(
    state: &AppState,
    admin: &AuthUser,
    cache_key: &str,
    reason: Option<String>,
) -> AppResult<InvalidationResult> {
    let entries_removed = state
        .cache
        .apply(&InvalidationTarget::parse(cache_key))
        .await;
    let invalidation = CacheInvalidationRepo::create(
        &state.pool,
        cache_key,
        reason.as_deref(),
        Some(admin.profile_id),
    )
    .await?;

    tracing::info!(
        invalidation_id = invalidation.id,
        cache_key,
        entries_removed,
        "Cache invalidation requested"
    );
    record_admin_action(
        state,
        admin,
        "cache.invalidate",
        "cache_invalidation",
        Some(invalidation.id),
        json!({ "cache_key": cache_key, "entries_removed": entries_removed }),
    )
    .await;

    Ok(InvalidationResult {
        invalidation,
        entries_removed,
    })
}

/// GET /api/v1/admin/cache/invalidations?processed=
pub async fn list_invalidations(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<InvalidationListQuery>,
) -> AppResult<Json<DataResponse<Vec<CacheInvalidation>>>> {
    let limit = clamp_limit(params.limit, DEFAULT_LOG_LIMIT, MAX_LOG_LIMIT);
    let offset = clamp_offset(params.offset);
    let rows = CacheInvalidationRepo::list(&state.pool, params.processed, limit, offset).await?;
    Ok(Json(DataResponse { data: rows }))
}

/// POST /api/v1/admin/cache/invalidate
///
/// `cache_key` is an exact key, a prefix ending in `*`, or `CLEAR_ALL_CACHE`.
pub async fn request_invalidation(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateCacheInvalidation>,
) -> AppResult<(StatusCode, Json<DataResponse<InvalidationResult>>)> {
    validate_cache_key(&input.cache_key)?;
    let reason = normalize_reason(input.reason.as_deref())?;
    let result = invalidate(&state, &admin, input.cache_key.trim(), reason).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: result })))
}

/// POST /api/v1/admin/cache/clear-all
pub async fn clear_all(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    body: Option<Json<ClearAllRequest>>,
) -> AppResult<(StatusCode, Json<DataResponse<InvalidationResult>>)> {
    let input = body.map(|Json(b)| b).unwrap_or_default();
    let reason = normalize_reason(input.reason.as_deref())?;
    let result = invalidate(&state, &admin, CLEAR_ALL_CACHE, reason).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: result })))
}

/// POST /api/v1/admin/cache/invalidations/{id}/process
///
/// Apply a recorded invalidation now and mark it processed. Processing an
/// already-processed row is a no-op that returns it unchanged.
pub async fn process_invalidation(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<CacheInvalidation>>> {
    let existing = CacheInvalidationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "CacheInvalidation",
            id,
        }))?;
    if existing.processed {
        return Ok(Json(DataResponse { data: existing }));
    }

    let entries_removed = state
        .cache
        .apply(&InvalidationTarget::parse(&existing.cache_key))
        .await;
    let processed = CacheInvalidationRepo::mark_processed(&state.pool, id)
        .await?
        .unwrap_or(existing);

    record_admin_action(
        &state,
        &admin,
        "cache.process",
        "cache_invalidation",
        Some(id),
        json!({ "cache_key": processed.cache_key, "entries_removed": entries_removed }),
    )
    .await;

    Ok(Json(DataResponse { data: processed }))
}
