#![allow(dead_code)]

use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

use backdrop_api::auth::jwt::{issue_access_token, JwtConfig};
use backdrop_api::auth::password::hash_password;
use backdrop_api::config::ServerConfig;
use backdrop_api::router::build_app_router;
use backdrop_api::state::AppState;
use backdrop_core::roles::ROLE_ADMIN;
use backdrop_core::subscription::TIER_PREMIUM;
use backdrop_db::models::category::{Category, CreateCategory};
use backdrop_db::models::profile::{CreateProfile, Profile, UpdateSubscription};
use backdrop_db::models::wallpaper::{CreateWallpaper, Wallpaper};
use backdrop_db::repositories::{CategoryRepo, ProfileRepo, WallpaperRepo};

pub const TEST_PASSWORD: &str = "correct-horse-battery";
pub const PUBLIC_BASE_URL: &str = "http://localhost:3000";

/// Build a test `ServerConfig` with safe defaults.
///
/// Request timing is off so tests don't race background inserts.
pub fn test_config(storage_root: PathBuf) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        jwt: JwtConfig {
            secret: "test-jwt-secret-that-is-long-enough".to_string(),
            access_token_expiry_mins: 15,
        },
        storage_root,
        public_base_url: PUBLIC_BASE_URL.to_string(),
        site_url: "https://backdrop.test".to_string(),
        url_signing_secret: "test-url-signing-secret".to_string(),
        download_token_ttl_secs: 300,
        signed_url_ttl_secs: 60,
        cache_ttl_secs: 300,
        cache_sync_interval_secs: 15,
        session_retention_hours: 24,
        perf_log_retention_days: 30,
        perf_log_enabled: false,
    }
}

/// Build the full application router (same middleware stack as `main.rs`)
/// with a throwaway storage root.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_storage(pool, std::env::temp_dir().join("backdrop-api-tests"))
}

/// Build the application router serving objects from `storage_root`.
pub fn build_test_app_with_storage(pool: PgPool, storage_root: PathBuf) -> Router {
    build_test_app_with_config(pool, test_config(storage_root))
}

/// Build the application router from a caller-adjusted config.
pub fn build_test_app_with_config(pool: PgPool, config: ServerConfig) -> Router {
    let state = AppState::new(pool, config.clone());
    build_app_router(state, &config)
}

/// Write an object under `root` at the relative `path`.
pub fn write_object(root: &Path, path: &str, bytes: &[u8]) {
    let full = path.split('/').fold(root.to_path_buf(), |acc, seg| acc.join(seg));
    if let Some(parent) = full.parent() {
        std::fs::create_dir_all(parent).expect("storage dir should be creatable");
    }
    std::fs::write(full, bytes).expect("object should be writable");
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("router should respond")
}

fn builder(method: &str, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, builder("GET", uri, None).body(Body::empty()).unwrap()).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, builder("GET", uri, Some(token)).body(Body::empty()).unwrap()).await
}

async fn with_json(
    app: Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Value,
) -> Response<Body> {
    let request = builder(method, uri, token)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    with_json(app, "POST", uri, None, body).await
}

pub async fn post_json_auth(app: Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    with_json(app, "POST", uri, Some(token), body).await
}

pub async fn put_json_auth(app: Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    with_json(app, "PUT", uri, Some(token), body).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, builder("POST", uri, Some(token)).body(Body::empty()).unwrap()).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, builder("DELETE", uri, Some(token)).body(Body::empty()).unwrap()).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).expect("body should be JSON")
}

/// Assert the status and error code of an error envelope.
pub async fn assert_error(response: Response<Body>, status: StatusCode, code: &str) -> Value {
    assert_eq!(response.status(), status);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], code, "unexpected error body: {json}");
    json
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Create a regular profile directly in the database.
pub async fn create_profile(pool: &PgPool, email: &str) -> Profile {
    let input = CreateProfile {
        email: email.to_string(),
        password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
        display_name: email.split('@').next().unwrap_or(email).to_string(),
    };
    ProfileRepo::create(pool, &input)
        .await
        .expect("profile creation should succeed")
}

pub async fn create_admin(pool: &PgPool, email: &str) -> Profile {
    let profile = create_profile(pool, email).await;
    ProfileRepo::update_role(pool, profile.id, ROLE_ADMIN)
        .await
        .expect("role update should succeed")
        .expect("profile should exist")
}

pub async fn create_premium(pool: &PgPool, email: &str) -> Profile {
    let profile = create_profile(pool, email).await;
    let input = UpdateSubscription {
        subscription_tier: TIER_PREMIUM.to_string(),
        premium_until: None,
    };
    ProfileRepo::update_subscription(pool, profile.id, &input)
        .await
        .expect("subscription update should succeed")
        .expect("profile should exist")
}

/// Mint an access token for `profile` with the test JWT secret.
pub fn token_for(profile: &Profile) -> String {
    let config = test_config(PathBuf::new());
    issue_access_token(profile.id, &profile.role, &config.jwt, chrono::Utc::now())
        .expect("token generation should succeed")
}

pub async fn create_category(pool: &PgPool, name: &str, slug: &str) -> Category {
    let input = CreateCategory {
        name: name.to_string(),
        slug: None,
        description: None,
        preview_image_url: None,
        sort_order: None,
        is_active: None,
    };
    CategoryRepo::create(pool, &input, slug)
        .await
        .expect("category creation should succeed")
}

pub fn new_wallpaper(title: &str, category_id: Option<i64>) -> CreateWallpaper {
    CreateWallpaper {
        title: title.to_string(),
        slug: None,
        description: None,
        category_id,
        storage_path: "originals/test.jpg".to_string(),
        thumbnail_url: None,
        width: 3840,
        height: 2160,
        file_size_bytes: Some(1024),
        tags: Some(vec!["nature".to_string()]),
        is_premium: Some(false),
        is_published: Some(true),
    }
}

pub async fn create_wallpaper(pool: &PgPool, input: CreateWallpaper, slug: &str) -> Wallpaper {
    WallpaperRepo::create(pool, &input, slug)
        .await
        .expect("wallpaper creation should succeed")
}

/// Request a download token for `wallpaper_id`, optionally signed in.
pub async fn request_token(app: Router, wallpaper_id: i64, token: Option<&str>) -> Response<Body> {
    let body = json!({ "wallpaper_id": wallpaper_id });
    match token {
        Some(token) => post_json_auth(app, "/api/v1/downloads/request", token, body).await,
        None => post_json(app, "/api/v1/downloads/request", body).await,
    }
}
