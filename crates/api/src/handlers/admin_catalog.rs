//! Admin CRUD over categories, wallpapers and collections.
//!
//! All handlers require the `admin` role via [`RequireAdmin`]. Every
//! mutation drops the affected response cache entries and is recorded in
//! the admin action log.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use backdrop_core::cache::{CATEGORIES, COLLECTIONS, SITEMAP, WALLPAPER_PREFIX};
use backdrop_core::error::CoreError;
use backdrop_core::pagination::{
    clamp_limit, clamp_offset, contains_pattern, Page, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT,
};
use backdrop_core::storage::{resolve_object_path, validate_object_path};
use backdrop_core::types::DbId;
use backdrop_core::validation::{slugify, validate_dimensions, validate_name, validate_slug};
use backdrop_db::models::category::{Category, CreateCategory, UpdateCategory};
use backdrop_db::models::collection::{
    AddCollectionWallpaper, Collection, CreateCollection, UpdateCollection,
};
use backdrop_db::models::wallpaper::{
    CreateWallpaper, UpdateWallpaper, Wallpaper, WallpaperFilter, WallpaperSort,
};
use backdrop_db::repositories::{CategoryRepo, CollectionRepo, WallpaperRepo};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::handlers::admin_actions::record_admin_action;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Every collection detail entry.
const COLLECTION_DETAILS: &str = "collection:*";

/// Every cached category page.
const CATEGORY_PAGES: &str = "category:*";

fn wallpapers_family() -> String {
    format!("{WALLPAPER_PREFIX}*")
}

fn not_found(entity: &'static str, id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity, id })
}

/// Use the explicit slug when given, otherwise derive one from `name`.
fn resolve_slug(explicit: Option<&str>, name: &str) -> AppResult<String> {
    let slug = match explicit.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => slugify(name),
    };
    validate_slug(&slug)?;
    Ok(slug)
}

fn validate_optional_slug(slug: Option<&str>) -> AppResult<()> {
    if let Some(slug) = slug {
        validate_slug(slug)?;
    }
    Ok(())
}

async fn ensure_category_exists(state: &AppState, category_id: Option<DbId>) -> AppResult<()> {
    if let Some(id) = category_id {
        CategoryRepo::find_by_id(&state.pool, id)
            .await?
            .ok_or_else(|| not_found("Category", id))?;
    }
    Ok(())
}

// ===========================================================================
// Categories
// ===========================================================================

/// GET /api/v1/admin/categories
///
/// All categories, including inactive ones.
pub async fn list_categories(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<Category>>>> {
    let categories = CategoryRepo::list_all(&state.pool).await?;
    Ok(Json(DataResponse { data: categories }))
}

/// POST /api/v1/admin/categories
pub async fn create_category(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateCategory>,
) -> AppResult<(StatusCode, Json<DataResponse<Category>>)> {
    validate_name("name", &input.name)?;
    let slug = resolve_slug(input.slug.as_deref(), &input.name)?;

    let category = CategoryRepo::create(&state.pool, &input, &slug).await?;

    state.cache.invalidate(&[CATEGORIES, CATEGORY_PAGES, SITEMAP]).await;
    record_admin_action(
        &state,
        &admin,
        "category.create",
        "category",
        Some(category.id),
        json!({ "slug": category.slug }),
    )
    .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: category })))
}

/// PUT /api/v1/admin/categories/{id}
pub async fn update_category(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCategory>,
) -> AppResult<Json<DataResponse<Category>>> {
    if let Some(name) = &input.name {
        validate_name("name", name)?;
    }
    validate_optional_slug(input.slug.as_deref())?;

    let category = CategoryRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found("Category", id))?;

    state
        .cache
        .invalidate(&[
            CATEGORIES,
            CATEGORY_PAGES,
            SITEMAP,
            wallpapers_family().as_str(),
        ])
        .await;
    record_admin_action(
        &state,
        &admin,
        "category.update",
        "category",
        Some(id),
        json!({ "slug": category.slug, "is_active": category.is_active }),
    )
    .await;

    Ok(Json(DataResponse { data: category }))
}

/// DELETE /api/v1/admin/categories/{id}
///
/// Refused with 409 while wallpapers still reference the category.
pub async fn delete_category(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !CategoryRepo::delete(&state.pool, id).await? {
        return Err(not_found("Category", id));
    }

    state.cache.invalidate(&[CATEGORIES, CATEGORY_PAGES, SITEMAP]).await;
    record_admin_action(&state, &admin, "category.delete", "category", Some(id), json!({}))
        .await;

    Ok(StatusCode::NO_CONTENT)
}

// ===========================================================================
// Wallpapers
// ===========================================================================

/// Query parameters for `GET /admin/wallpapers`.
#[derive(Debug, Deserialize)]
pub struct AdminWallpaperQuery {
    pub category_id: Option<DbId>,
    pub premium: Option<bool>,
    pub q: Option<String>,
    pub sort: Option<WallpaperSort>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/v1/admin/wallpapers
///
/// Published and unpublished wallpapers.
pub async fn list_wallpapers(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<AdminWallpaperQuery>,
) -> AppResult<Json<DataResponse<Page<Wallpaper>>>> {
    let limit = clamp_limit(params.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
    let offset = clamp_offset(params.offset);
    let filter = WallpaperFilter {
        category_id: params.category_id,
        is_premium: params.premium,
        search_pattern: params.q.as_deref().and_then(contains_pattern),
        published_only: false,
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

/// GET /api/v1/admin/wallpapers/{id}
pub async fn get_wallpaper(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Wallpaper>>> {
    let wallpaper = WallpaperRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Wallpaper", id))?;
    Ok(Json(DataResponse { data: wallpaper }))
}

/// Size of the stored original, if it is present under the storage root.
async fn stored_file_size(state: &AppState, storage_path: &str) -> Option<i64> {
    let path = resolve_object_path(&state.config.storage_root, storage_path).ok()?;
    let metadata = tokio::fs::metadata(path).await.ok()?;
    i64::try_from(metadata.len()).ok()
}

/// POST /api/v1/admin/wallpapers
///
/// `file_size_bytes` is read from the storage root when omitted.
pub async fn create_wallpaper(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(mut input): Json<CreateWallpaper>,
) -> AppResult<(StatusCode, Json<DataResponse<Wallpaper>>)> {
    validate_name("title", &input.title)?;
    let slug = resolve_slug(input.slug.as_deref(), &input.title)?;
    validate_object_path(&input.storage_path)?;
    validate_dimensions(input.width, input.height)?;
    ensure_category_exists(&state, input.category_id).await?;

    if input.file_size_bytes.is_none() {
        input.file_size_bytes = stored_file_size(&state, &input.storage_path).await;
    }

    let wallpaper = WallpaperRepo::create(&state.pool, &input, &slug).await?;

    state
        .cache
        .invalidate(&[
            CATEGORIES,
            CATEGORY_PAGES,
            COLLECTIONS,
            COLLECTION_DETAILS,
            SITEMAP,
        ])
        .await;
    record_admin_action(
        &state,
        &admin,
        "wallpaper.create",
        "wallpaper",
        Some(wallpaper.id),
        json!({
            "slug": wallpaper.slug,
            "is_premium": wallpaper.is_premium,
            "is_published": wallpaper.is_published,
        }),
    )
    .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: wallpaper })))
}

/// PUT /api/v1/admin/wallpapers/{id}
pub async fn update_wallpaper(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateWallpaper>,
) -> AppResult<Json<DataResponse<Wallpaper>>> {
    if let Some(title) = &input.title {
        validate_name("title", title)?;
    }
    validate_optional_slug(input.slug.as_deref())?;
    if let Some(path) = &input.storage_path {
        validate_object_path(path)?;
    }
    let existing = WallpaperRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Wallpaper", id))?;
    validate_dimensions(
        input.width.unwrap_or(existing.width),
        input.height.unwrap_or(existing.height),
    )?;
    ensure_category_exists(&state, input.category_id).await?;

    let wallpaper = WallpaperRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found("Wallpaper", id))?;

    state
        .cache
        .invalidate(&[
            wallpapers_family().as_str(),
            CATEGORIES,
            CATEGORY_PAGES,
            COLLECTIONS,
            COLLECTION_DETAILS,
            SITEMAP,
        ])
        .await;
    record_admin_action(
        &state,
        &admin,
        "wallpaper.update",
        "wallpaper",
        Some(id),
        json!({
            "is_premium": wallpaper.is_premium,
            "is_published": wallpaper.is_published,
            "was_published": existing.is_published,
        }),
    )
    .await;

    Ok(Json(DataResponse { data: wallpaper }))
}

/// DELETE /api/v1/admin/wallpapers/{id}
pub async fn delete_wallpaper(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !WallpaperRepo::delete(&state.pool, id).await? {
        return Err(not_found("Wallpaper", id));
    }

    state
        .cache
        .invalidate(&[
            wallpapers_family().as_str(),
            CATEGORIES,
            CATEGORY_PAGES,
            COLLECTIONS,
            COLLECTION_DETAILS,
            SITEMAP,
        ])
        .await;
    record_admin_action(&state, &admin, "wallpaper.delete", "wallpaper", Some(id), json!({}))
        .await;

    Ok(StatusCode::NO_CONTENT)
}

// ===========================================================================
// Collections
// ===========================================================================

/// A collection with every member, published or not.
#[derive(Debug, Serialize)]
pub struct AdminCollectionDetail {
    pub collection: Collection,
    pub wallpapers: Vec<Wallpaper>,
}

/// Result of adding a wallpaper to a collection.
#[derive(Debug, Serialize)]
pub struct CollectionMembership {
    pub collection_id: DbId,
    pub wallpaper_id: DbId,
    pub position: i32,
}

/// GET /api/v1/admin/collections
pub async fn list_collections(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<Collection>>>> {
    let collections = CollectionRepo::list_all(&state.pool).await?;
    Ok(Json(DataResponse { data: collections }))
}

/// GET /api/v1/admin/collections/{id}
pub async fn get_collection(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<AdminCollectionDetail>>> {
    let collection = CollectionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Collection", id))?;
    let wallpapers = CollectionRepo::list_wallpapers(&state.pool, id, false).await?;
    Ok(Json(DataResponse {
        data: AdminCollectionDetail {
            collection,
            wallpapers,
        },
    }))
}

/// POST /api/v1/admin/collections
pub async fn create_collection(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateCollection>,
) -> AppResult<(StatusCode, Json<DataResponse<Collection>>)> {
    validate_name("name", &input.name)?;
    let slug = resolve_slug(input.slug.as_deref(), &input.name)?;

    let collection = CollectionRepo::create(&state.pool, &input, &slug).await?;

    state.cache.invalidate(&[COLLECTIONS, SITEMAP]).await;
    record_admin_action(
        &state,
        &admin,
        "collection.create",
        "collection",
        Some(collection.id),
        json!({ "slug": collection.slug }),
    )
    .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: collection })))
}

/// PUT /api/v1/admin/collections/{id}
pub async fn update_collection(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCollection>,
) -> AppResult<Json<DataResponse<Collection>>> {
    if let Some(name) = &input.name {
        validate_name("name", name)?;
    }
    validate_optional_slug(input.slug.as_deref())?;

    let collection = CollectionRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found("Collection", id))?;

    state
        .cache
        .invalidate(&[COLLECTIONS, COLLECTION_DETAILS, SITEMAP])
        .await;
    record_admin_action(
        &state,
        &admin,
        "collection.update",
        "collection",
        Some(id),
        json!({ "slug": collection.slug, "is_active": collection.is_active }),
    )
    .await;

    Ok(Json(DataResponse { data: collection }))
}

/// DELETE /api/v1/admin/collections/{id}
pub async fn delete_collection(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !CollectionRepo::delete(&state.pool, id).await? {
        return Err(not_found("Collection", id));
    }

    state
        .cache
        .invalidate(&[COLLECTIONS, COLLECTION_DETAILS, SITEMAP])
        .await;
    record_admin_action(&state, &admin, "collection.delete", "collection", Some(id), json!({}))
        .await;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/collections/{id}/wallpapers
///
/// Add a wallpaper, or move it when it is already a member.
pub async fn add_collection_wallpaper(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<AddCollectionWallpaper>,
) -> AppResult<(StatusCode, Json<DataResponse<CollectionMembership>>)> {
    CollectionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Collection", id))?;
    WallpaperRepo::find_by_id(&state.pool, input.wallpaper_id)
        .await?
        .ok_or_else(|| not_found("Wallpaper", input.wallpaper_id))?;
    if input.position.is_some_and(|p| p < 0) {
        return Err(AppError::BadRequest("position must not be negative".into()));
    }

    let position =
        CollectionRepo::add_wallpaper(&state.pool, id, input.wallpaper_id, input.position).await?;

    state
        .cache
        .invalidate(&[COLLECTIONS, COLLECTION_DETAILS])
        .await;
    record_admin_action(
        &state,
        &admin,
        "collection.add_wallpaper",
        "collection",
        Some(id),
        json!({ "wallpaper_id": input.wallpaper_id, "position": position }),
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: CollectionMembership {
                collection_id: id,
                wallpaper_id: input.wallpaper_id,
                position,
            },
        }),
    ))
}

/// DELETE /api/v1/admin/collections/{id}/wallpapers/{wallpaper_id}
pub async fn remove_collection_wallpaper(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path((id, wallpaper_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if !CollectionRepo::remove_wallpaper(&state.pool, id, wallpaper_id).await? {
        return Err(AppError::NotFound(format!(
            "Wallpaper {wallpaper_id} is not in collection {id}"
        )));
    }

    state
        .cache
        .invalidate(&[COLLECTIONS, COLLECTION_DETAILS])
        .await;
    record_admin_action(
        &state,
        &admin,
        "collection.remove_wallpaper",
        "collection",
        Some(id),
        json!({ "wallpaper_id": wallpaper_id }),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}
