//! Public category handlers.

use axum::extract::{Path, Query, State};
use axum::Json;
use backdrop_core::cache::{category_key, CATEGORIES};
use backdrop_core::pagination::{
    clamp_limit, clamp_offset, Page, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT,
};
use backdrop_db::models::category::{Category, CategoryWithCount};
use backdrop_db::models::wallpaper::{Wallpaper, WallpaperFilter, WallpaperSort};
use backdrop_db::repositories::{CategoryRepo, WallpaperRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /categories/{slug}`.
#[derive(Debug, Deserialize)]
pub struct CategoryPageQuery {
    pub sort: Option<WallpaperSort>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// A category together with a page of its published wallpapers.
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryPage {
    pub category: Category,
    pub wallpapers: Page<Wallpaper>,
}

/// GET /api/v1/categories
///
/// Active categories with their published wallpaper counts. Cached.
pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<CategoryWithCount>>>> {
    let pool = state.pool.clone();
    let categories = state
        .cache
        .get_or_load(CATEGORIES, || async move {
            Ok::<_, AppError>(CategoryRepo::list_active_with_counts(&pool).await?)
        })
        .await?;
    Ok(Json(DataResponse { data: categories }))
}

/// GET /api/v1/categories/{slug}
///
/// Only the default first page is cached; sorted or offset pages always hit
/// the database.
pub async fn get_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<CategoryPageQuery>,
) -> AppResult<Json<DataResponse<CategoryPage>>> {
    let is_default_page =
        params.sort.is_none() && params.limit.is_none() && params.offset.is_none();
    let page = if is_default_page {
        let pool = state.pool.clone();
        let cache_slug = slug.clone();
        state
            .cache
            .get_or_load(&category_key(&slug), || async move {
                load_category_page(&pool, &cache_slug, params).await
            })
            .await?
    } else {
        load_category_page(&state.pool, &slug, params).await?
    };
    Ok(Json(DataResponse { data: page }))
}

async fn load_category_page(
    pool: &sqlx::PgPool,
    slug: &str,
    params: CategoryPageQuery,
) -> AppResult<CategoryPage> {
    let category = CategoryRepo::find_by_slug(pool, slug)
        .await?
        .filter(|c| c.is_active)
        .ok_or_else(|| AppError::NotFound(format!("Category '{slug}' not found")))?;

    let limit = clamp_limit(params.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
    let offset = clamp_offset(params.offset);
    let filter = WallpaperFilter {
        category_id: Some(category.id),
        published_only: true,
        sort: params.sort.unwrap_or_default(),
        ..Default::default()
    };

    let items = WallpaperRepo::list(pool, &filter, limit, offset).await?;
    let total = WallpaperRepo::count(pool, &filter).await?;

    Ok(CategoryPage {
        category,
        wallpapers: Page {
            items,
            total,
            limit,
            offset,
        },
    })
}
