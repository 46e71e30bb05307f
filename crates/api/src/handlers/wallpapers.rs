//! Public wallpaper handlers: listing with filters and wallpaper detail.

use axum::extract::{Path, Query, State};
use axum::Json;
use backdrop_core::cache::wallpaper_key;
use backdrop_core::error::CoreError;
use backdrop_core::pagination::{
    clamp_limit, clamp_offset, contains_pattern, Page, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT,
};
use backdrop_core::types::DbId;
use backdrop_db::models::category::Category;
use backdrop_db::models::wallpaper::{Wallpaper, WallpaperFilter, WallpaperSort};
use backdrop_db::repositories::{CategoryRepo, WallpaperRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Number of related wallpapers shown on a detail page.
const RELATED_LIMIT: i64 = 8;

/// Query parameters for `GET /wallpapers`.
#[derive(Debug, Default, Deserialize)]
pub struct WallpaperListQuery {
    /// Category slug.
    pub category: Option<String>,
    pub premium: Option<bool>,
    /// Matched against titles and tags.
    pub q: Option<String>,
    pub sort: Option<WallpaperSort>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Everything the wallpaper detail page renders.
#[derive(Debug, Serialize, Deserialize)]
pub struct WallpaperDetail {
    pub wallpaper: Wallpaper,
    pub category: Option<Category>,
    pub related: Vec<Wallpaper>,
}

/// GET /api/v1/wallpapers
///
/// Published wallpapers. An unknown or inactive `category` yields an empty page.
pub async fn list_wallpapers(
    State(state): State<AppState>,
    Query(params): Query<WallpaperListQuery>,
) -> AppResult<Json<DataResponse<Page<Wallpaper>>>> {
    let limit = clamp_limit(params.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
    let offset = clamp_offset(params.offset);

    let category_id = match params.category.as_deref().map(str::trim) {
        Some(slug) if !slug.is_empty() => {
            match CategoryRepo::find_by_slug(&state.pool, slug).await? {
                Some(category) if category.is_active => Some(category.id),
                _ => {
                    return Ok(Json(DataResponse {
                        data: Page {
                            items: Vec::new(),
                            total: 0,
                            limit,
                            offset,
                        },
                    }));
                }
            }
        }
        _ => None,
    };

    let filter = WallpaperFilter {
        category_id,
        is_premium: params.premium,
        search_pattern: params.q.as_deref().and_then(contains_pattern),
        published_only: true,
        sort: params.sort.unwrap_or_default(),
    };

    let items = WallpaperRepo::list(&state.pool, &filter, limit, offset).await?;
    let total = WallpaperRepo::count(&state.pool, &filter).await?;

    Ok(Json(DataResponse {
        data: Page {
            items,
            total,
            limit,
            offset,
        },
    }))
}

/// GET /api/v1/wallpapers/{id}
///
/// Wallpaper, its category and related wallpapers. Unpublished wallpapers
/// are reported as missing. Cached per wallpaper.
pub async fn get_wallpaper(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<WallpaperDetail>>> {
    let pool = state.pool.clone();
    let detail = state
        .cache
        .get_or_load(&wallpaper_key(id), || async move { load_detail(&pool, id).await })
        .await?;
    Ok(Json(DataResponse { data: detail }))
}

async fn load_detail(pool: &sqlx::PgPool, id: DbId) -> AppResult<WallpaperDetail> {
    let wallpaper = WallpaperRepo::find_by_id(pool, id)
        .await?
        .filter(|w| w.is_published)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Wallpaper",
            id,
        }))?;

    let (category, related) = match wallpaper.category_id {
        Some(category_id) => (
            CategoryRepo::find_by_id(pool, category_id).await?,
            WallpaperRepo::related(pool, category_id, wallpaper.id, RELATED_LIMIT).await?,
        ),
        None => (None, Vec::new()),
    };

    Ok(WallpaperDetail {
        wallpaper,
        category,
        related,
    })
}
