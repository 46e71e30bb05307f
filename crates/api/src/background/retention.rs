//! Periodic cleanup of stale download sessions and old performance logs.
//!
//! Unredeemed sessions are purged `session_retention_hours` after they
//! expire; redeemed ones stay as download history. Timing rows older than
//! `perf_log_retention_days` are deleted.

use std::time::Duration;

use backdrop_db::repositories::{DownloadSessionRepo, PerformanceLogRepo};
use chrono::Utc;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

/// How often the cleanup job runs.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(3600); // 1 hour

/// Retention windows.
#[derive(Debug, Clone, Copy)]
pub struct RetentionPolicy {
    pub session_retention_hours: i64,
    pub perf_log_retention_days: i64,
}

/// Run one cleanup pass. Returns `(sessions_deleted, logs_deleted)`.
pub async fn purge_once(
    pool: &PgPool,
    policy: RetentionPolicy,
) -> Result<(u64, u64), sqlx::Error> {
    // A negative window would put the cutoff in the future and purge live rows.
    let now = Utc::now();
    let session_cutoff = now - chrono::Duration::hours(policy.session_retention_hours.max(0));
    let log_cutoff = now - chrono::Duration::days(policy.perf_log_retention_days.max(0));

    let sessions = DownloadSessionRepo::delete_unredeemed_expired_before(pool, session_cutoff).await?;
    let logs = PerformanceLogRepo::delete_older_than(pool, log_cutoff).await?;
    Ok((sessions, logs))
}

/// Run the retention loop until `cancel` is triggered.
pub async fn run(pool: PgPool, policy: RetentionPolicy, cancel: CancellationToken) {
    tracing::info!(
        session_retention_hours = policy.session_retention_hours,
        perf_log_retention_days = policy.perf_log_retention_days,
        interval_secs = CLEANUP_INTERVAL.as_secs(),
        "Retention job started"
    );

    let mut interval = tokio::time::interval(CLEANUP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Retention job stopping");
                break;
            }
            _ = interval.tick() => {
                match purge_once(&pool, policy).await {
                    Ok((0, 0)) => tracing::debug!("Retention: no rows to purge"),
                    Ok((sessions, logs)) => {
                        tracing::info!(sessions, logs, "Retention: purged old rows");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Retention: cleanup failed");
                    }
                }
            }
        }
    }
}
