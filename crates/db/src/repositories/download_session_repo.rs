//! Repository for the `download_sessions` table.

use backdrop_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::download_session::{
    CreateDownloadSession, DownloadFunnel, DownloadHistoryItem, DownloadSession,
};
use crate::repositories::WallpaperRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, token_hash, wallpaper_id, profile_id, ip_address, user_agent, \
    expires_at, redeemed_at, created_at";

/// Provides issuance, redemption and reporting for download sessions.
pub struct DownloadSessionRepo;

impl DownloadSessionRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateDownloadSession,
    ) -> Result<DownloadSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO download_sessions
                (token_hash, wallpaper_id, profile_id, ip_address, user_agent, expires_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DownloadSession>(&query)
            .bind(&input.token_hash)
            .bind(input.wallpaper_id)
            .bind(input.profile_id)
            .bind(&input.ip_address)
            .bind(&input.user_agent)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_token_hash(
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<Option<DownloadSession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM download_sessions WHERE token_hash = $1");
        sqlx::query_as::<_, DownloadSession>(&query)
            .bind(token_hash)
            .fetch_optional(pool)
            .await
    }

    /// Consume a session and count the download in one transaction.
    ///
    /// The conditional `UPDATE` makes redemption single-use under concurrency.
    /// Returns `None`, changing nothing, when the token is unknown, already
    /// redeemed or expired.
    pub async fn redeem(
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<Option<DownloadSession>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE download_sessions SET redeemed_at = NOW()
             WHERE token_hash = $1 AND redeemed_at IS NULL AND expires_at > NOW()
             RETURNING {COLUMNS}"
        );
        let session = sqlx::query_as::<_, DownloadSession>(&query)
            .bind(token_hash)
            .fetch_optional(&mut *tx)
            .await?;

        if let Some(session) = &session {
            WallpaperRepo::increment_download_count(&mut *tx, session.wallpaper_id).await?;
        }

        tx.commit().await?;
        Ok(session)
    }

    /// Redeemed downloads for a profile, most recent first.
    pub async fn history_for_profile(
        pool: &PgPool,
        profile_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<DownloadHistoryItem>, sqlx::Error> {
        sqlx::query_as::<_, DownloadHistoryItem>(
            "SELECT ds.id AS session_id, w.id AS wallpaper_id, w.title, w.slug,
                    w.thumbnail_url, w.is_premium, ds.redeemed_at
             FROM download_sessions ds
             JOIN wallpapers w ON w.id = ds.wallpaper_id
             WHERE ds.profile_id = $1 AND ds.redeemed_at IS NOT NULL
             ORDER BY ds.redeemed_at DESC, ds.id DESC
             LIMIT $2 OFFSET $3",
        )
        .bind(profile_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Issued / redeemed / lapsed counts for sessions created in `[from, to)`.
    pub async fn funnel(
        pool: &PgPool,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<DownloadFunnel, sqlx::Error> {
        sqlx::query_as::<_, DownloadFunnel>(
            "SELECT
                COUNT(*) AS issued,
                COUNT(*) FILTER (WHERE redeemed_at IS NOT NULL) AS redeemed,
                COUNT(*) FILTER (WHERE redeemed_at IS NULL AND expires_at <= NOW())
                    AS expired_unredeemed
             FROM download_sessions
             WHERE created_at >= $1 AND created_at < $2",
        )
        .bind(from)
        .bind(to)
        .fetch_one(pool)
        .await
    }

    /// Delete never-redeemed sessions that expired before `cutoff`. Redeemed
    /// rows are kept as download history. Returns the number removed.
    pub async fn delete_unredeemed_expired_before(
        pool: &PgPool,
        cutoff: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM download_sessions WHERE expires_at < $1 AND redeemed_at IS NULL",
        )
        .bind(cutoff)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
