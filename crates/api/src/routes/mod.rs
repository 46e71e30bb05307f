pub mod admin;
pub mod auth;
pub mod catalog;
pub mod downloads;
pub mod health;
pub mod profile;
pub mod seo;
pub mod storage;

use axum::routing::post;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                    register (public)
/// /auth/login                       login (public)
///
/// /profile/me                       get, update (requires auth)
/// /profile/me/downloads             download history (requires auth)
///
/// /categories                       list (cached)
/// /categories/{slug}                category + wallpaper page
/// /wallpapers                       list with filters
/// /wallpapers/{id}                  wallpaper detail (cached)
/// /collections                      list (cached)
/// /collections/{slug}               collection detail (cached)
///
/// /downloads/request                issue token (auth optional)
/// /downloads/validate               token status
/// /downloads/file                   redeem token -> signed URL
///
/// /performance                      client timing ingest
///
/// /admin/...                        see [`admin::router`] (admin only)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/profile", profile::router())
        .nest("/categories", catalog::categories_router())
        .nest("/wallpapers", catalog::wallpapers_router())
        .nest("/collections", catalog::collections_router())
        .nest("/downloads", downloads::router())
        .route("/performance", post(handlers::performance::ingest_sample))
        .nest("/admin", admin::router())
}
