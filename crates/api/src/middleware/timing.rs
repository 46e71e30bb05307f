//! Request timing middleware.
//!
//! Measures every routed request and records it in `performance_logs` under
//! its route template (e.g. `/api/v1/wallpapers/{id}`). The insert runs on a
//! spawned task.

use std::time::Instant;

use axum::extract::{MatchedPath, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use backdrop_core::metrics::SOURCE_SERVER;
use backdrop_db::models::performance_log::CreatePerformanceLog;
use backdrop_db::repositories::PerformanceLogRepo;

use crate::state::AppState;

/// Routes never recorded.
const SKIPPED_ROUTES: &[&str] = &["/health"];

pub async fn record_request_timing(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string());
    let method = request.method().to_string();

    let started = Instant::now();
    let response = next.run(request).await;
    let duration_ms = started.elapsed().as_secs_f64() * 1000.0;

    let Some(route) = route else {
        return response;
    };
    if !state.config.perf_log_enabled || SKIPPED_ROUTES.contains(&route.as_str()) {
        return response;
    }

    let entry = CreatePerformanceLog {
        source: SOURCE_SERVER,
        name: route,
        method: Some(method),
        status_code: Some(i32::from(response.status().as_u16())),
        duration_ms,
    };
    let pool = state.pool.clone();
    tokio::spawn(async move {
        if let Err(e) = PerformanceLogRepo::insert(&pool, &entry).await {
            tracing::warn!(error = %e, route = %entry.name, "Failed to record request timing");
        }
    });

    response
}
