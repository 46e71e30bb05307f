//! Client-side performance sample ingest.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use backdrop_core::metrics::SOURCE_CLIENT;
use backdrop_core::validation::validate_name;
use backdrop_db::models::performance_log::CreatePerformanceLog;
use backdrop_db::repositories::PerformanceLogRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Longest plausible client measurement (10 minutes).
const MAX_CLIENT_DURATION_MS: f64 = 600_000.0;

/// Request body for `POST /performance`.
#[derive(Debug, Deserialize)]
pub struct ClientSample {
    /// Metric or page name, e.g. `first-contentful-paint` or `/wallpaper/{id}`.
    pub name: String,
    pub duration_ms: f64,
}

/// POST /api/v1/performance
///
/// Record one browser-reported timing. Anonymous; returns 202.
pub async fn ingest_sample(
    State(state): State<AppState>,
    Json(input): Json<ClientSample>,
) -> AppResult<StatusCode> {
    let name = input.name.trim();
    validate_name("name", name)?;
    if !input.duration_ms.is_finite()
        || input.duration_ms < 0.0
        || input.duration_ms > MAX_CLIENT_DURATION_MS
    {
        return Err(AppError::BadRequest(format!(
            "duration_ms must be between 0 and {MAX_CLIENT_DURATION_MS}"
        )));
    }

    if state.config.perf_log_enabled {
        PerformanceLogRepo::insert(
            &state.pool,
            &CreatePerformanceLog {
                source: SOURCE_CLIENT,
                name: name.to_string(),
                method: None,
                status_code: None,
                duration_ms: input.duration_ms,
            },
        )
        .await?;
    }

    Ok(StatusCode::ACCEPTED)
}
