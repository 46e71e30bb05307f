//! The HTTP surface of backdrop: every route and the tower-http stack that
//! wraps it.
//!
//! `main.rs` and the integration tests both go through [`build_app_router`],
//! so tests see the same timeout, request ids and CORS policy as production.

use std::time::Duration;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, StatusCode};
use axum::middleware::from_fn_with_state;
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::middleware::timing::record_request_timing;
use crate::routes;
use crate::state::AppState;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// How long browsers may cache a preflight answer.
const CORS_PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(60 * 60);

/// Assemble the backdrop service.
///
/// Timing sits innermost as a route layer, so only requests that matched a
/// route are recorded, under their template. Around it, from the inside out:
/// panic recovery, the request timeout (408), request id echo, tracing,
/// request id assignment and CORS.
pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    let timed = backdrop_routes()
        .route_layer(from_fn_with_state(state.clone(), record_request_timing));

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    let request_timeout = Duration::from_secs(config.request_timeout_secs);

    timed
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(build_cors_layer(config))
        .with_state(state)
}

/// Unversioned pages (health, sitemap, robots, signed storage) next to the
/// JSON API under `/api/v1`.
fn backdrop_routes() -> Router<AppState> {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::seo::router())
        .merge(routes::storage::router())
        .nest("/api/v1", routes::api_routes())
}

/// CORS for the site's browser clients.
///
/// # Panics
///
/// Panics on a `CORS_ORIGINS` entry that is not a valid header value, at
/// startup rather than on the first cross-origin request.
pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<_> = config
        .cors_origins
        .iter()
        .map(|origin| {
            origin
                .parse()
                .unwrap_or_else(|e| panic!("CORS_ORIGINS entry '{origin}' is invalid: {e}"))
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(CORS_PREFLIGHT_MAX_AGE)
}
