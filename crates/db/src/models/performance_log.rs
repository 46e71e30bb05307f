//! Request timing log model.

use backdrop_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `performance_logs` table (append-only).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PerformanceLog {
    pub id: DbId,
    /// `server` (timing middleware) or `client` (browser-reported).
    pub source: String,
    /// Route template for server rows, metric name for client rows.
    pub name: String,
    pub method: Option<String>,
    pub status_code: Option<i32>,
    pub duration_ms: f64,
    pub created_at: Timestamp,
}

/// Insert DTO.
#[derive(Debug, Clone)]
pub struct CreatePerformanceLog {
    pub source: &'static str,
    pub name: String,
    pub method: Option<String>,
    pub status_code: Option<i32>,
    pub duration_ms: f64,
}
