//! Route definitions for `/admin` (all handlers require the admin role).

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::{admin_actions, admin_cache, admin_catalog, admin_metrics, admin_profiles};
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// GET, POST        /categories                              list, create
/// PUT, DELETE      /categories/{id}                         update, delete
/// GET, POST        /wallpapers                              list, create
/// GET, PUT, DELETE /wallpapers/{id}                         get, update, delete
/// GET, POST        /collections                             list, create
/// GET, PUT, DELETE /collections/{id}                        get, update, delete
/// POST             /collections/{id}/wallpapers             add member
/// DELETE           /collections/{id}/wallpapers/{wid}       remove member
///
/// GET              /profiles                                list
/// PUT              /profiles/{id}/subscription              set tier / expiry
/// PUT              /profiles/{id}/role                      set role
///
/// GET              /metrics                                 dashboard (?from&to)
/// GET              /metrics/performance                     raw timing rows
///
/// GET              /cache/invalidations                     list (?processed=)
/// POST             /cache/invalidate                        invalidate key / prefix
/// POST             /cache/clear-all                         invalidate everything
/// POST             /cache/invalidations/{id}/process        apply + mark processed
///
/// GET              /actions                                 admin action log
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        // Catalog.
        .route(
            "/categories",
            get(admin_catalog::list_categories).post(admin_catalog::create_category),
        )
        .route(
            "/categories/{id}",
            put(admin_catalog::update_category).delete(admin_catalog::delete_category),
        )
        .route(
            "/wallpapers",
            get(admin_catalog::list_wallpapers).post(admin_catalog::create_wallpaper),
        )
        .route(
            "/wallpapers/{id}",
            get(admin_catalog::get_wallpaper)
                .put(admin_catalog::update_wallpaper)
                .delete(admin_catalog::delete_wallpaper),
        )
        .route(
            "/collections",
            get(admin_catalog::list_collections).post(admin_catalog::create_collection),
        )
        .route(
            "/collections/{id}",
            get(admin_catalog::get_collection)
                .put(admin_catalog::update_collection)
                .delete(admin_catalog::delete_collection),
        )
        .route(
            "/collections/{id}/wallpapers",
            post(admin_catalog::add_collection_wallpaper),
        )
        .route(
            "/collections/{id}/wallpapers/{wallpaper_id}",
            delete(admin_catalog::remove_collection_wallpaper),
        )
        // Profiles.
        .route("/profiles", get(admin_profiles::list_profiles))
        .route(
            "/profiles/{id}/subscription",
            put(admin_profiles::update_subscription),
        )
        .route("/profiles/{id}/role", put(admin_profiles::update_role))
        // Metrics.
        .route("/metrics", get(admin_metrics::get_dashboard))
        .route(
            "/metrics/performance",
            get(admin_metrics::list_performance_logs),
        )
        // Cache management.
        .route(
            "/cache/invalidations",
            get(admin_cache::list_invalidations),
        )
        .route("/cache/invalidate", post(admin_cache::request_invalidation))
        .route("/cache/clear-all", post(admin_cache::clear_all))
        .route(
            "/cache/invalidations/{id}/process",
            post(admin_cache::process_invalidation),
        )
        // Audit.
        .route("/actions", get(admin_actions::list_actions))
}
