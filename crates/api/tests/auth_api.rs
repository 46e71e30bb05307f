//! HTTP-level tests for registration, login and the signed-in profile.

mod common;

use axum::http::StatusCode;
use common::{
    assert_error, body_json, create_profile, get, get_auth, post_json, put_json_auth, token_for,
    TEST_PASSWORD,
};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_creates_free_profile(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = json!({ "email": "  Ada@Example.com ", "password": TEST_PASSWORD });
    let response = post_json(app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    let data = &json["data"];
    assert!(data["access_token"].is_string());
    assert_eq!(data["expires_in"], 15 * 60);
    assert_eq!(data["profile"]["email"], "ada@example.com");
    assert_eq!(data["profile"]["display_name"], "ada");
    assert_eq!(data["profile"]["role"], "user");
    assert_eq!(data["profile"]["subscription_tier"], "free");
    assert!(data["profile"].get("password_hash").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_duplicate_email_conflicts(pool: PgPool) {
    create_profile(&pool, "taken@example.com").await;
    let app = common::build_test_app(pool);

    let body = json!({ "email": "TAKEN@example.com", "password": TEST_PASSWORD });
    let response = post_json(app, "/api/v1/auth/register", body).await;
    assert_error(response, StatusCode::CONFLICT, "CONFLICT").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_rejects_bad_input(pool: PgPool) {
    let app = common::build_test_app(pool);

    let weak = json!({ "email": "weak@example.com", "password": "short" });
    let response = post_json(app.clone(), "/api/v1/auth/register", weak).await;
    assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;

    let bad_email = json!({ "email": "not-an-email", "password": TEST_PASSWORD });
    let response = post_json(app, "/api/v1/auth/register", bad_email).await;
    assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_success_and_failure(pool: PgPool) {
    let profile = create_profile(&pool, "login@example.com").await;
    let app = common::build_test_app(pool);

    let good = json!({ "email": "login@example.com", "password": TEST_PASSWORD });
    let response = post_json(app.clone(), "/api/v1/auth/login", good).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["profile"]["id"], profile.id);

    let wrong = json!({ "email": "login@example.com", "password": "wrong-password-123" });
    let response = post_json(app.clone(), "/api/v1/auth/login", wrong).await;
    let json = assert_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
    assert_eq!(json["error"]["message"], "Invalid email or password");

    let unknown = json!({ "email": "nobody@example.com", "password": TEST_PASSWORD });
    let response = post_json(app, "/api/v1/auth/login", unknown).await;
    let json = assert_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
    assert_eq!(json["error"]["message"], "Invalid email or password");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_deactivated_is_forbidden(pool: PgPool) {
    create_profile(&pool, "gone@example.com").await;
    sqlx::query("UPDATE profiles SET is_active = FALSE WHERE email = 'gone@example.com'")
        .execute(&pool)
        .await
        .unwrap();
    let app = common::build_test_app(pool);

    // Without the password a deactivated account looks like any bad login.
    let body = json!({ "email": "gone@example.com", "password": "not-the-password" });
    let response = post_json(app.clone(), "/api/v1/auth/login", body).await;
    let json = assert_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
    assert_eq!(json["error"]["message"], "Invalid email or password");

    let body = json!({ "email": "gone@example.com", "password": TEST_PASSWORD });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_error(response, StatusCode::FORBIDDEN, "FORBIDDEN").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_profile_me_requires_auth(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app.clone(), "/api/v1/profile/me").await;
    assert_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;

    let response = get_auth(app, "/api/v1/profile/me", "not-a-jwt").await;
    assert_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_profile_me_get_and_update(pool: PgPool) {
    let profile = create_profile(&pool, "me@example.com").await;
    let token = token_for(&profile);
    let app = common::build_test_app(pool);

    let response = get_auth(app.clone(), "/api/v1/profile/me", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["email"], "me@example.com");

    let update = json!({ "display_name": "  Grace  " });
    let response = put_json_auth(app.clone(), "/api/v1/profile/me", &token, update).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["display_name"], "Grace");

    let blank = json!({ "display_name": "   " });
    let response = put_json_auth(app, "/api/v1/profile/me", &token, blank).await;
    assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_download_history_starts_empty(pool: PgPool) {
    let profile = create_profile(&pool, "history@example.com").await;
    let token = token_for(&profile);
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/v1/profile/me/downloads", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 0);
}
