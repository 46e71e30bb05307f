//! Route definitions for the download-token broker.

use axum::routing::post;
use axum::Router;

use crate::handlers::downloads;
use crate::state::AppState;

/// Routes mounted at `/downloads`.
///
/// ```text
/// POST /request   -> request_download (auth optional)
/// POST /validate  -> validate_download
/// POST /file      -> download_file
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/request", post(downloads::request_download))
        .route("/validate", post(downloads::validate_download))
        .route("/file", post(downloads::download_file))
}
