//! Applies recorded cache invalidations to the in-process response cache.
//!
//! Every instance keeps its own [`SyncCursor`], the highest invalidation id
//! it has applied, and each tick applies every row above it whether or not
//! another instance already flagged the row processed. The `processed` flag
//! is bookkeeping for the admin listing only. Each tick also drops expired
//! entries.

use std::sync::Arc;
use std::time::Duration;

use backdrop_core::cache::InvalidationTarget;
use backdrop_core::types::DbId;
use backdrop_db::repositories::CacheInvalidationRepo;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::cache::ResponseCache;

/// Upper bound on rows fetched per query.
const BATCH_SIZE: i64 = 200;

/// Shortest tick the loop will run with.
const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// High-water mark of the invalidations one cache has applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncCursor {
    last_applied: DbId,
}

impl SyncCursor {
    /// Start after `last_applied`; rows with a higher id are still to apply.
    pub fn after(last_applied: DbId) -> Self {
        Self { last_applied }
    }

    /// Start after every row recorded so far. A fresh cache holds nothing
    /// those rows could invalidate.
    pub async fn at_latest(pool: &PgPool) -> Result<Self, sqlx::Error> {
        let latest = CacheInvalidationRepo::latest_id(pool).await?;
        Ok(Self::after(latest.unwrap_or(0)))
    }

    pub fn last_applied(&self) -> DbId {
        self.last_applied
    }
}

/// Apply every invalidation above `cursor` and advance it. Rows nobody has
/// flagged yet are marked processed. Returns how many rows were applied.
pub async fn sync_once(
    pool: &PgPool,
    cache: &ResponseCache,
    cursor: &mut SyncCursor,
) -> Result<usize, sqlx::Error> {
    let mut applied = 0;
    let mut removed = 0;

    loop {
        let rows = CacheInvalidationRepo::list_after(pool, cursor.last_applied, BATCH_SIZE).await?;
        let Some(last) = rows.last() else {
            break;
        };
        let last_id = last.id;

        for row in &rows {
            removed += cache.apply(&InvalidationTarget::parse(&row.cache_key)).await;
        }

        let unflagged: Vec<DbId> = rows.iter().filter(|r| !r.processed).map(|r| r.id).collect();
        CacheInvalidationRepo::mark_many_processed(pool, &unflagged).await?;

        cursor.last_applied = last_id;
        applied += rows.len();
        if (rows.len() as i64) < BATCH_SIZE {
            break;
        }
    }

    if applied > 0 {
        tracing::info!(
            applied,
            entries_removed = removed,
            last_applied = cursor.last_applied,
            "Cache sync: applied invalidations"
        );
    }
    Ok(applied)
}

/// Run the cache sync loop every `interval` until `cancel` is triggered.
pub async fn run(
    pool: PgPool,
    cache: Arc<ResponseCache>,
    interval: Duration,
    cancel: CancellationToken,
) {
    let interval = interval.max(MIN_INTERVAL);
    tracing::info!(interval_secs = interval.as_secs(), "Cache sync job started");

    // Until the starting point is known, rows are re-read from the beginning.
    let mut cursor = match SyncCursor::at_latest(&pool).await {
        Ok(cursor) => cursor,
        Err(e) => {
            tracing::error!(error = %e, "Cache sync: failed to read latest invalidation id");
            SyncCursor::after(0)
        }
    };

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Cache sync job stopping");
                break;
            }
            _ = ticker.tick() => {
                if let Err(e) = sync_once(&pool, &cache, &mut cursor).await {
                    tracing::error!(error = %e, "Cache sync: failed to apply invalidations");
                }
                let expired = cache.purge_expired().await;
                if expired > 0 {
                    tracing::debug!(expired, "Cache sync: dropped expired entries");
                }
            }
        }
    }
}
