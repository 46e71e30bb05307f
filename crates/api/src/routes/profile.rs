use axum::routing::get;
use axum::Router;

use crate::handlers::profile;
use crate::state::AppState;

/// Routes mounted at `/profile` (all require auth).
///
/// ```text
/// GET  /me            -> get_me
/// PUT  /me            -> update_me
/// GET  /me/downloads  -> my_downloads
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(profile::get_me).put(profile::update_me))
        .route("/me/downloads", get(profile::my_downloads))
}
