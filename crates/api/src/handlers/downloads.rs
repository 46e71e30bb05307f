//! Download-token broker.
//!
//! A download is a three-step exchange:
//!
//! 1. `POST /downloads/request` checks the wallpaper is published and the
//!    viewer may download it, then issues a short-lived one-shot token.
//! 2. `POST /downloads/validate` reports a token's state without consuming it.
//! 3. `POST /downloads/file` redeems the token and returns a signed storage URL.
//!
//! Only the SHA-256 hash of a token is persisted.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use backdrop_core::download_token::{
    generate_download_token, hash_download_token, is_well_formed, session_state, SessionState,
};
use backdrop_core::error::CoreError;
use backdrop_core::storage::{download_filename, validate_download_filename, validate_object_path};
use backdrop_core::subscription::{check_download_access, Viewer};
use backdrop_core::types::{DbId, Timestamp};
use backdrop_db::models::download_session::{CreateDownloadSession, DownloadSession};
use backdrop_db::models::profile::Profile;
use backdrop_db::repositories::{DownloadSessionRepo, ProfileRepo, WallpaperRepo};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthUser, OptionalAuthUser};
use crate::response::DataResponse;
use crate::state::AppState;

/// Longest user agent stored with a session.
const MAX_USER_AGENT_LEN: usize = 512;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /downloads/request`.
#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    pub wallpaper_id: DbId,
}

/// Request body for `POST /downloads/validate` and `POST /downloads/file`.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub token: String,
}

/// A freshly issued token. The plaintext is never shown again.
#[derive(Debug, Serialize)]
pub struct DownloadTokenResponse {
    pub token: String,
    pub wallpaper_id: DbId,
    pub expires_at: Timestamp,
}

/// Non-consuming token check.
#[derive(Debug, Serialize)]
pub struct TokenStatusResponse {
    pub status: SessionState,
    pub wallpaper_id: DbId,
    pub expires_at: Timestamp,
}

/// Result of redeeming a token.
#[derive(Debug, Serialize)]
pub struct DownloadFileResponse {
    pub url: String,
    pub expires_at: Timestamp,
    pub filename: String,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// First address in `X-Forwarded-For`, falling back to `X-Real-IP`.
fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .or_else(|| headers.get("x-real-ip").and_then(|v| v.to_str().ok()))
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
}

fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|ua| ua.chars().take(MAX_USER_AGENT_LEN).collect())
}

fn ensure_well_formed(token: &str) -> AppResult<()> {
    if is_well_formed(token) {
        Ok(())
    } else {
        Err(AppError::BadRequest("Malformed download token".into()))
    }
}

async fn find_session(state: &AppState, token: &str) -> AppResult<DownloadSession> {
    DownloadSessionRepo::find_by_token_hash(&state.pool, &hash_download_token(token))
        .await?
        .ok_or_else(|| AppError::NotFound("Download token not found".into()))
}

/// Load the signed-in profile, if any. A deleted or deactivated profile
/// counts as signed out.
async fn load_viewer_profile(
    state: &AppState,
    user: Option<&AuthUser>,
) -> AppResult<Option<Profile>> {
    let Some(user) = user else {
        return Ok(None);
    };
    let profile = ProfileRepo::find_by_id(&state.pool, user.profile_id).await?;
    Ok(profile.filter(|p| p.is_active))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/downloads/request
///
/// Issue a download token. 404 for unknown or unpublished wallpapers; 401 /
/// 403 when a premium wallpaper is requested without an active subscription.
pub async fn request_download(
    State(state): State<AppState>,
    OptionalAuthUser(user): OptionalAuthUser,
    headers: HeaderMap,
    Json(input): Json<DownloadRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<DownloadTokenResponse>>)> {
    let wallpaper = WallpaperRepo::find_by_id(&state.pool, input.wallpaper_id)
        .await?
        .filter(|w| w.is_published)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Wallpaper",
            id: input.wallpaper_id,
        }))?;

    let now = Utc::now();
    let profile = load_viewer_profile(&state, user.as_ref()).await?;
    let viewer = profile.as_ref().map(|p| Viewer {
        role: &p.role,
        tier: &p.subscription_tier,
        premium_until: p.premium_until,
    });

    if let Err(e) = check_download_access(wallpaper.is_premium, viewer.as_ref(), now) {
        tracing::info!(
            wallpaper_id = wallpaper.id,
            profile_id = ?profile.as_ref().map(|p| p.id),
            reason = %e,
            "Download request refused"
        );
        return Err(e.into());
    }

    let token = generate_download_token();
    let expires_at = now + Duration::seconds(state.config.download_token_ttl_secs);
    let session = DownloadSessionRepo::create(
        &state.pool,
        &CreateDownloadSession {
            token_hash: token.hash,
            wallpaper_id: wallpaper.id,
            profile_id: profile.as_ref().map(|p| p.id),
            ip_address: client_ip(&headers),
            user_agent: user_agent(&headers),
            expires_at,
        },
    )
    .await?;

    tracing::info!(
        session_id = session.id,
        wallpaper_id = wallpaper.id,
        profile_id = ?session.profile_id,
        premium = wallpaper.is_premium,
        "Download token issued"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: DownloadTokenResponse {
                token: token.plaintext,
                wallpaper_id: wallpaper.id,
                expires_at: session.expires_at,
            },
        }),
    ))
}

/// POST /api/v1/downloads/validate
///
/// Report whether a token is still usable. Does not consume it.
pub async fn validate_download(
    State(state): State<AppState>,
    Json(input): Json<TokenRequest>,
) -> AppResult<Json<DataResponse<TokenStatusResponse>>> {
    ensure_well_formed(&input.token)?;
    let session = find_session(&state, &input.token).await?;
    let status = session_state(session.expires_at, session.redeemed_at, Utc::now());

    Ok(Json(DataResponse {
        data: TokenStatusResponse {
            status,
            wallpaper_id: session.wallpaper_id,
            expires_at: session.expires_at,
        },
    }))
}

/// POST /api/v1/downloads/file
///
/// Redeem a token exactly once and return a signed URL for the original.
/// A second redemption, or one after expiry, is refused with 403. The
/// wallpaper's storage path is checked before the token is consumed, so a
/// broken catalog entry leaves the token usable.
pub async fn download_file(
    State(state): State<AppState>,
    Json(input): Json<TokenRequest>,
) -> AppResult<Json<DataResponse<DownloadFileResponse>>> {
    ensure_well_formed(&input.token)?;
    let session = find_session(&state, &input.token).await?;

    let wallpaper = WallpaperRepo::find_by_id(&state.pool, session.wallpaper_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Wallpaper",
            id: session.wallpaper_id,
        }))?;

    validate_object_path(&wallpaper.storage_path).map_err(|e| {
        AppError::InternalError(format!(
            "Wallpaper {} has an unusable storage path: {e}",
            wallpaper.id
        ))
    })?;
    let filename = download_filename(
        &wallpaper.slug,
        wallpaper.width,
        wallpaper.height,
        &wallpaper.storage_path,
    );
    validate_download_filename(&filename).map_err(|e| {
        AppError::InternalError(format!(
            "Wallpaper {} yields an unusable download filename: {e}",
            wallpaper.id
        ))
    })?;

    let redeemed = DownloadSessionRepo::redeem(&state.pool, &session.token_hash).await?;
    let Some(session) = redeemed else {
        // Spent or stale, possibly by a concurrent redemption since the lookup.
        let session = find_session(&state, &input.token).await?;
        let status = session_state(session.expires_at, session.redeemed_at, Utc::now());
        tracing::info!(
            session_id = session.id,
            status = ?status,
            "Download token redemption refused"
        );
        let message = match status {
            // Expired between the UPDATE and now.
            SessionState::Active => SessionState::Expired.rejection_message(),
            other => other.rejection_message(),
        };
        return Err(AppError::Core(CoreError::Forbidden(message.into())));
    };

    let signed = state.signer.signed_url(
        &state.config.public_base_url,
        &wallpaper.storage_path,
        Some(&filename),
        state.config.signed_url_ttl_secs,
        Utc::now(),
    );

    tracing::info!(
        session_id = session.id,
        wallpaper_id = wallpaper.id,
        profile_id = ?session.profile_id,
        "Download token redeemed"
    );

    Ok(Json(DataResponse {
        data: DownloadFileResponse {
            url: signed.url,
            expires_at: signed.expires_at,
            filename,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn client_ip_prefers_first_forwarded_address() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(client_ip(&headers).as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn client_ip_falls_back_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.4"));
        assert_eq!(client_ip(&headers).as_deref(), Some("198.51.100.4"));
        assert_eq!(client_ip(&HeaderMap::new()), None);
    }

    #[test]
    fn malformed_tokens_are_rejected_early() {
        assert!(ensure_well_formed("short").is_err());
        assert!(ensure_well_formed(&"a".repeat(48)).is_ok());
    }
}
