//! Wallpaper model, listing filters and DTOs.

use backdrop_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `wallpapers` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Wallpaper {
    pub id: DbId,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub category_id: Option<DbId>,
    pub storage_path: String,
    pub thumbnail_url: Option<String>,
    pub width: i32,
    pub height: i32,
    pub file_size_bytes: i64,
    pub tags: Vec<String>,
    pub is_premium: bool,
    pub is_published: bool,
    pub download_count: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a wallpaper. `slug` is derived from `title` when omitted.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateWallpaper {
    pub title: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<DbId>,
    pub storage_path: String,
    pub thumbnail_url: Option<String>,
    pub width: i32,
    pub height: i32,
    pub file_size_bytes: Option<i64>,
    pub tags: Option<Vec<String>>,
    pub is_premium: Option<bool>,
    pub is_published: Option<bool>,
}

/// DTO for updating a wallpaper. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateWallpaper {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<DbId>,
    pub storage_path: Option<String>,
    pub thumbnail_url: Option<String>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub file_size_bytes: Option<i64>,
    pub tags: Option<Vec<String>>,
    pub is_premium: Option<bool>,
    pub is_published: Option<bool>,
}

/// Listing order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WallpaperSort {
    #[default]
    Latest,
    Popular,
    Title,
}

impl WallpaperSort {
    /// `ORDER BY` clause. Always ends in `id` for a stable page order.
    pub fn order_by(self) -> &'static str {
        match self {
            Self::Latest => "created_at DESC, id DESC",
            Self::Popular => "download_count DESC, id DESC",
            Self::Title => "title ASC, id ASC",
        }
    }
}

/// Filters for [`crate::repositories::WallpaperRepo::list`] and `count`.
#[derive(Debug, Clone, Default)]
pub struct WallpaperFilter {
    pub category_id: Option<DbId>,
    pub is_premium: Option<bool>,
    /// An already-escaped `ILIKE` pattern.
    pub search_pattern: Option<String>,
    pub published_only: bool,
    pub sort: WallpaperSort,
}

/// Catalog counts for the metrics dashboard.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CatalogCounts {
    pub wallpapers_total: i64,
    pub wallpapers_published: i64,
    pub wallpapers_premium: i64,
    pub total_downloads: i64,
}

/// Compact row for "top wallpapers" lists.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WallpaperDownloadStat {
    pub id: DbId,
    pub title: String,
    pub slug: String,
    pub is_premium: bool,
    pub download_count: i64,
}
