//! Signed object storage endpoint.
//!
//! `GET /storage/{*path}?expires=..[&filename=..]&signature=..` streams a
//! wallpaper original from the storage root. The path and filename are
//! validated first (400), then the signature (403), then the file is looked
//! up (404). A signed `filename` names the attachment; otherwise the object's
//! basename is used.

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::header::{self, HeaderValue};
use axum::http::StatusCode;
use axum::response::Response;
use backdrop_core::error::CoreError;
use backdrop_core::signed_url::SignatureError;
use backdrop_core::storage::{
    content_type_for_path, resolve_object_path, validate_download_filename, validate_object_path,
};
use chrono::Utc;
use serde::Deserialize;
use tokio_util::io::ReaderStream;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Signature query parameters. Missing values are treated as an invalid
/// signature rather than a malformed request.
#[derive(Debug, Deserialize)]
pub struct SignedQuery {
    pub expires: Option<i64>,
    pub filename: Option<String>,
    pub signature: Option<String>,
}

/// GET /storage/{*path}
pub async fn serve_object(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(query): Query<SignedQuery>,
) -> AppResult<Response> {
    validate_object_path(&path)?;
    let filename = query.filename.as_deref();
    if let Some(filename) = filename {
        validate_download_filename(filename)?;
    }

    let (Some(expires), Some(signature)) = (query.expires, query.signature.as_deref()) else {
        return Err(signature_rejected(SignatureError::Invalid));
    };
    state
        .signer
        .verify(&path, expires, filename, signature, Utc::now())
        .map_err(|e| {
            tracing::info!(path = %path, reason = %e, "Signed storage request refused");
            signature_rejected(e)
        })?;

    let file_path = resolve_object_path(&state.config.storage_root, &path)?;
    let file = match tokio::fs::File::open(&file_path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound(format!("Object '{path}' not found")));
        }
        Err(e) => {
            return Err(AppError::InternalError(format!(
                "Failed to open {}: {e}",
                file_path.display()
            )));
        }
    };
    let metadata = file
        .metadata()
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to stat {}: {e}", file_path.display())))?;
    if !metadata.is_file() {
        return Err(AppError::NotFound(format!("Object '{path}' not found")));
    }

    let filename = filename.unwrap_or_else(|| path.rsplit('/').next().unwrap_or(path.as_str()));
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
        .map_err(|e| AppError::InternalError(format!("Invalid Content-Disposition: {e}")))?;

    tracing::debug!(path = %path, bytes = metadata.len(), "Serving storage object");

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type_for_path(&path))
        .header(header::CONTENT_LENGTH, metadata.len().to_string())
        .header(header::CONTENT_DISPOSITION, disposition)
        .header(header::CACHE_CONTROL, "private, no-store")
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| AppError::InternalError(format!("Failed to build response: {e}")))
}

fn signature_rejected(err: SignatureError) -> AppError {
    AppError::Core(CoreError::Forbidden(err.to_string()))
}
