//! Public collection handlers.

use axum::extract::{Path, State};
use axum::Json;
use backdrop_core::cache::{collection_key, COLLECTIONS};
use backdrop_db::models::collection::{Collection, CollectionWithCount};
use backdrop_db::models::wallpaper::Wallpaper;
use backdrop_db::repositories::CollectionRepo;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// A collection with its published wallpapers in curated order.
#[derive(Debug, Serialize, Deserialize)]
pub struct CollectionDetail {
    pub collection: Collection,
    pub wallpapers: Vec<Wallpaper>,
}

/// GET /api/v1/collections
///
/// Active collections, featured first. Cached.
pub async fn list_collections(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<CollectionWithCount>>>> {
    let pool = state.pool.clone();
    let collections = state
        .cache
        .get_or_load(COLLECTIONS, || async move {
            Ok::<_, AppError>(CollectionRepo::list_active_with_counts(&pool).await?)
        })
        .await?;
    Ok(Json(DataResponse { data: collections }))
}

/// GET /api/v1/collections/{slug}
pub async fn get_collection(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<DataResponse<CollectionDetail>>> {
    let pool = state.pool.clone();
    let key = collection_key(&slug);
    let detail = state
        .cache
        .get_or_load(&key, || async move {
            let collection = CollectionRepo::find_by_slug(&pool, &slug)
                .await?
                .filter(|c| c.is_active)
                .ok_or_else(|| AppError::NotFound(format!("Collection '{slug}' not found")))?;
            let wallpapers = CollectionRepo::list_wallpapers(&pool, collection.id, true).await?;
            Ok::<_, AppError>(CollectionDetail {
                collection,
                wallpapers,
            })
        })
        .await?;
    Ok(Json(DataResponse { data: detail }))
}
