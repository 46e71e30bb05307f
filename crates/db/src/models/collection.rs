//! Curated collection model and DTOs.

use backdrop_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `collections` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Collection {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub is_featured: bool,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Collection plus its number of published wallpapers.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CollectionWithCount {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub is_featured: bool,
    pub sort_order: i32,
    pub wallpaper_count: i64,
}

/// DTO for creating a collection. `slug` is derived from `name` when omitted.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCollection {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub is_featured: Option<bool>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}

/// DTO for updating a collection. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCollection {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub is_featured: Option<bool>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}

/// Request body for adding a wallpaper to a collection.
///
/// Without `position` the wallpaper is appended after the current last one.
#[derive(Debug, Clone, Deserialize)]
pub struct AddCollectionWallpaper {
    pub wallpaper_id: DbId,
    pub position: Option<i32>,
}
