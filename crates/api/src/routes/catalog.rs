//! Public catalog routes: categories, wallpapers, collections.

use axum::routing::get;
use axum::Router;

use crate::handlers::{categories, collections, wallpapers};
use crate::state::AppState;

/// Routes mounted at `/categories`.
///
/// ```text
/// GET /          -> list_categories
/// GET /{slug}    -> get_category
/// ```
pub fn categories_router() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::list_categories))
        .route("/{slug}", get(categories::get_category))
}

/// Routes mounted at `/wallpapers`.
///
/// ```text
/// GET /          -> list_wallpapers
/// GET /{id}      -> get_wallpaper
/// ```
pub fn wallpapers_router() -> Router<AppState> {
    Router::new()
        .route("/", get(wallpapers::list_wallpapers))
        .route("/{id}", get(wallpapers::get_wallpaper))
}

/// Routes mounted at `/collections`.
///
/// ```text
/// GET /          -> list_collections
/// GET /{slug}    -> get_collection
/// ```
pub fn collections_router() -> Router<AppState> {
    Router::new()
        .route("/", get(collections::list_collections))
        .route("/{slug}", get(collections::get_collection))
}
