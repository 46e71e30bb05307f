//! Admin metrics dashboard.
//!
//! Counts come straight from SQL; latency statistics are computed in
//! `backdrop_core::metrics` over the window's `performance_logs` rows.

use axum::extract::{Query, State};
use axum::Json;
use backdrop_core::metrics::{
    download_conversion_rate, slowest_endpoints, summarize, EndpointStats, PerformanceSummary,
    RequestSample, DEFAULT_TOP_N, MAX_SAMPLES, SOURCE_CLIENT, SOURCE_SERVER,
};
use backdrop_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LOG_LIMIT, MAX_LOG_LIMIT};
use backdrop_core::types::Timestamp;
use backdrop_db::models::download_session::DownloadFunnel;
use backdrop_db::models::performance_log::PerformanceLog;
use backdrop_db::models::profile::ProfileCounts;
use backdrop_db::models::wallpaper::{CatalogCounts, WallpaperDownloadStat};
use backdrop_db::repositories::{
    DownloadSessionRepo, PerformanceLogRepo, ProfileRepo, WallpaperRepo,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::query::DateRangeQuery;
use crate::response::DataResponse;
use crate::state::AppState;

/// Default dashboard window in days.
const DEFAULT_WINDOW_DAYS: i64 = 7;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct MetricsWindow {
    pub from: Timestamp,
    pub to: Timestamp,
}

#[derive(Debug, Serialize)]
pub struct DownloadMetrics {
    #[serde(flatten)]
    pub funnel: DownloadFunnel,
    pub conversion_rate: f64,
}

#[derive(Debug, Serialize)]
pub struct MetricsDashboard {
    pub window: MetricsWindow,
    pub profiles: ProfileCounts,
    pub catalog: CatalogCounts,
    pub downloads: DownloadMetrics,
    pub top_wallpapers: Vec<WallpaperDownloadStat>,
    pub server: PerformanceSummary,
    pub client: PerformanceSummary,
    pub slowest_endpoints: Vec<EndpointStats>,
}

/// Query parameters for `GET /admin/metrics/performance`.
#[derive(Debug, Deserialize)]
pub struct PerformanceLogQuery {
    /// `server` or `client`.
    pub source: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn samples(rows: &[PerformanceLog]) -> Vec<RequestSample<'_>> {
    rows.iter()
        .map(|row| RequestSample {
            name: &row.name,
            method: row.method.as_deref(),
            status_code: row.status_code,
            duration_ms: row.duration_ms,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/metrics?from=&to=
///
/// Defaults to the trailing seven days. An empty window reports zeros.
pub async fn get_dashboard(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(range): Query<DateRangeQuery>,
) -> AppResult<Json<DataResponse<MetricsDashboard>>> {
    let (from, to) = range.resolve(DEFAULT_WINDOW_DAYS)?;
    let pool = &state.pool;

    let profiles = ProfileRepo::counts(pool, Utc::now()).await?;
    let catalog = WallpaperRepo::counts(pool).await?;
    let funnel = DownloadSessionRepo::funnel(pool, from, to).await?;
    let top_wallpapers = WallpaperRepo::top_downloaded(pool, DEFAULT_TOP_N as i64).await?;

    let server_rows =
        PerformanceLogRepo::list_between(pool, SOURCE_SERVER, from, to, MAX_SAMPLES).await?;
    let client_rows =
        PerformanceLogRepo::list_between(pool, SOURCE_CLIENT, from, to, MAX_SAMPLES).await?;
    let server_samples = samples(&server_rows);
    let client_samples = samples(&client_rows);

    let conversion_rate = download_conversion_rate(funnel.issued, funnel.redeemed);

    Ok(Json(DataResponse {
        data: MetricsDashboard {
            window: MetricsWindow { from, to },
            profiles,
            catalog,
            downloads: DownloadMetrics {
                funnel,
                conversion_rate,
            },
            top_wallpapers,
            server: summarize(&server_samples),
            client: summarize(&client_samples),
            slowest_endpoints: slowest_endpoints(&server_samples, DEFAULT_TOP_N),
        },
    }))
}

/// GET /api/v1/admin/metrics/performance
///
/// Raw timing rows, newest first.
pub async fn list_performance_logs(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<PerformanceLogQuery>,
) -> AppResult<Json<DataResponse<Vec<PerformanceLog>>>> {
    let source = params.source.as_deref().filter(|s| !s.is_empty());
    if let Some(source) = source {
        if source != SOURCE_SERVER && source != SOURCE_CLIENT {
            return Err(AppError::BadRequest(format!(
                "source must be '{SOURCE_SERVER}' or '{SOURCE_CLIENT}'"
            )));
        }
    }
    let limit = clamp_limit(params.limit, DEFAULT_LOG_LIMIT, MAX_LOG_LIMIT);
    let offset = clamp_offset(params.offset);
    let rows = PerformanceLogRepo::list_page(&state.pool, source, limit, offset).await?;
    Ok(Json(DataResponse { data: rows }))
}
