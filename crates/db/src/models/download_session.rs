//! Download session model (one row per issued download token).

use backdrop_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `download_sessions` table.
///
/// `token_hash` is never serialized.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DownloadSession {
    pub id: DbId,
    #[serde(skip_serializing)]
    pub token_hash: String,
    pub wallpaper_id: DbId,
    pub profile_id: Option<DbId>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub expires_at: Timestamp,
    pub redeemed_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// Insert DTO built by the token-issuing handler.
#[derive(Debug)]
pub struct CreateDownloadSession {
    pub token_hash: String,
    pub wallpaper_id: DbId,
    pub profile_id: Option<DbId>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub expires_at: Timestamp,
}

/// A redeemed download joined with the wallpaper it fetched.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DownloadHistoryItem {
    pub session_id: DbId,
    pub wallpaper_id: DbId,
    pub title: String,
    pub slug: String,
    pub thumbnail_url: Option<String>,
    pub is_premium: bool,
    pub redeemed_at: Timestamp,
}

/// Token issuance vs. redemption over a time window.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DownloadFunnel {
    pub issued: i64,
    pub redeemed: i64,
    pub expired_unredeemed: i64,
}
