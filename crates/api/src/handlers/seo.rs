//! `sitemap.xml` and `robots.txt`.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use backdrop_core::cache::{ROBOTS, SITEMAP};
use backdrop_core::sitemap::{absolute_url, paths, render_robots, render_sitemap, SitemapEntry};
use backdrop_db::repositories::{CategoryRepo, CollectionRepo, WallpaperRepo};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

async fn build_sitemap(pool: &sqlx::PgPool, site_url: &str) -> AppResult<String> {
    let mut entries = vec![SitemapEntry::new(absolute_url(site_url, ""), "daily", 1.0)];

    for category in CategoryRepo::list_active_with_counts(pool).await? {
        entries.push(SitemapEntry::new(
            absolute_url(site_url, &format!("{}/{}", paths::CATEGORY, category.slug)),
            "daily",
            0.8,
        ));
    }

    for collection in CollectionRepo::list_active_with_counts(pool).await? {
        entries.push(SitemapEntry::new(
            absolute_url(site_url, &format!("{}/{}", paths::COLLECTION, collection.slug)),
            "weekly",
            0.7,
        ));
    }

    for wallpaper in WallpaperRepo::list_published(pool).await? {
        entries.push(
            SitemapEntry::new(
                absolute_url(site_url, &format!("{}/{}", paths::WALLPAPER, wallpaper.id)),
                "weekly",
                0.6,
            )
            .modified(wallpaper.updated_at),
        );
    }

    Ok(render_sitemap(&entries))
}

/// GET /sitemap.xml
pub async fn sitemap(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let pool = state.pool.clone();
    let site_url = state.config.site_url.clone();
    let xml: String = state
        .cache
        .get_or_load(SITEMAP, || async move { build_sitemap(&pool, &site_url).await })
        .await?;
    Ok(([(header::CONTENT_TYPE, "application/xml; charset=utf-8")], xml))
}

/// GET /robots.txt
pub async fn robots(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let site_url = state.config.site_url.clone();
    let body: String = state
        .cache
        .get_or_load(ROBOTS, || async move {
            Ok::<_, AppError>(render_robots(&site_url))
        })
        .await?;
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body))
}
