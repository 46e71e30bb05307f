//! Root-level SEO routes.

use axum::routing::get;
use axum::Router;

use crate::handlers::seo;
use crate::state::AppState;

/// ```text
/// GET /sitemap.xml
/// GET /robots.txt
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sitemap.xml", get(seo::sitemap))
        .route("/robots.txt", get(seo::robots))
}
