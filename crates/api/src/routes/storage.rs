//! Signed object storage route (root level).

use axum::routing::get;
use axum::Router;

use crate::handlers::storage;
use crate::state::AppState;

/// ```text
/// GET /storage/{*path}?expires=&signature=
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/storage/{*path}", get(storage::serve_object))
}
