//! Root-level routes: health check, SEO documents, middleware behaviour.

mod common;

use axum::http::StatusCode;
use common::{
    assert_error, body_bytes, body_json, create_category, create_wallpaper, get, new_wallpaper,
};
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_health_reports_ok(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["db_healthy"], true);
    assert!(json["version"].is_string());
    assert_eq!(json["cache_entries"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_request_id_is_returned(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app, "/health").await;
    assert!(
        response.headers().contains_key("x-request-id"),
        "every response should carry x-request-id"
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_route_is_404(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app, "/api/v1/does-not-exist").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_sitemap_lists_public_pages(pool: PgPool) {
    let category = create_category(&pool, "Nature", "nature").await;
    let published = create_wallpaper(
        &pool,
        new_wallpaper("Alpine Lake", Some(category.id)),
        "alpine-lake",
    )
    .await;
    let mut draft = new_wallpaper("Draft", Some(category.id));
    draft.is_published = Some(false);
    let draft = create_wallpaper(&pool, draft, "draft").await;
    let app = common::build_test_app(pool);

    let response = get(app, "/sitemap.xml").await;
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("application/xml"), "got {content_type}");

    let xml = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(xml.contains("<loc>https://backdrop.test/</loc>"));
    assert!(xml.contains("https://backdrop.test/category/nature"));
    assert!(xml.contains(&format!("https://backdrop.test/wallpaper/{}", published.id)));
    assert!(!xml.contains(&format!("https://backdrop.test/wallpaper/{}<", draft.id)));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_robots_points_at_sitemap(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app, "/robots.txt").await;
    assert_eq!(response.status(), StatusCode::OK);

    let text = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(text.contains("Disallow: /api/"));
    assert!(text.contains("Sitemap: https://backdrop.test/sitemap.xml"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_error_envelope_shape(pool: PgPool) {
    let app = common::build_test_app(pool);

    let json = assert_error(
        get(app, "/api/v1/wallpapers/999999").await,
        StatusCode::NOT_FOUND,
        "NOT_FOUND",
    )
    .await;
    assert!(json["error"]["message"].is_string());
}
