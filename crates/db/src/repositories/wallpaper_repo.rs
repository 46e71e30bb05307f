//! Repository for the `wallpapers` table.

use backdrop_core::types::DbId;
use sqlx::PgPool;

use crate::models::wallpaper::{
    CatalogCounts, CreateWallpaper, UpdateWallpaper, Wallpaper, WallpaperDownloadStat,
    WallpaperFilter,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, title, slug, description, category_id, storage_path, thumbnail_url, \
    width, height, file_size_bytes, tags, is_premium, is_published, download_count, \
    created_at, updated_at";

/// WHERE clause shared by `list` and `count`; binds `$1..$4` from a
/// [`WallpaperFilter`].
const FILTER_WHERE: &str = "\
    ($1::BIGINT IS NULL OR category_id = $1) \
    AND ($2::BOOLEAN IS NULL OR is_premium = $2) \
    AND ($3::TEXT IS NULL OR title ILIKE $3 \
         OR EXISTS (SELECT 1 FROM unnest(tags) AS t(tag) WHERE t.tag ILIKE $3)) \
    AND (NOT $4 OR is_published)";

/// Provides CRUD and listing operations for wallpapers.
pub struct WallpaperRepo;

impl WallpaperRepo {
    /// Insert a new wallpaper with the resolved `slug`.
    ///
    /// Unpublished, free and untagged unless the input says otherwise.
    pub async fn create(
        pool: &PgPool,
        input: &CreateWallpaper,
        slug: &str,
    ) -> Result<Wallpaper, sqlx::Error> {
        let query = format!(
            "INSERT INTO wallpapers
                (title, slug, description, category_id, storage_path, thumbnail_url,
                 width, height, file_size_bytes, tags, is_premium, is_published)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, COALESCE($9, 0),
                     COALESCE($10, '{{}}'::TEXT[]), COALESCE($11, FALSE), COALESCE($12, FALSE))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Wallpaper>(&query)
            .bind(&input.title)
            .bind(slug)
            .bind(&input.description)
            .bind(input.category_id)
            .bind(&input.storage_path)
            .bind(&input.thumbnail_url)
            .bind(input.width)
            .bind(input.height)
            .bind(input.file_size_bytes)
            .bind(&input.tags)
            .bind(input.is_premium)
            .bind(input.is_published)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Wallpaper>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM wallpapers WHERE id = $1");
        sqlx::query_as::<_, Wallpaper>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// One page of wallpapers matching `filter`.
    pub async fn list(
        pool: &PgPool,
        filter: &WallpaperFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Wallpaper>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM wallpapers
             WHERE {FILTER_WHERE}
             ORDER BY {}
             LIMIT $5 OFFSET $6",
            filter.sort.order_by()
        );
        sqlx::query_as::<_, Wallpaper>(&query)
            .bind(filter.category_id)
            .bind(filter.is_premium)
            .bind(&filter.search_pattern)
            .bind(filter.published_only)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Total rows matching `filter`, ignoring pagination.
    pub async fn count(pool: &PgPool, filter: &WallpaperFilter) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM wallpapers WHERE {FILTER_WHERE}");
        sqlx::query_scalar::<_, i64>(&query)
            .bind(filter.category_id)
            .bind(filter.is_premium)
            .bind(&filter.search_pattern)
            .bind(filter.published_only)
            .fetch_one(pool)
            .await
    }

    /// Published wallpapers in the same category, most downloaded first.
    pub async fn related(
        pool: &PgPool,
        category_id: DbId,
        exclude_id: DbId,
        limit: i64,
    ) -> Result<Vec<Wallpaper>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM wallpapers
             WHERE category_id = $1 AND id <> $2 AND is_published
             ORDER BY download_count DESC, id DESC
             LIMIT $3"
        );
        sqlx::query_as::<_, Wallpaper>(&query)
            .bind(category_id)
            .bind(exclude_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Every published wallpaper, newest first. Used for the sitemap.
    pub async fn list_published(pool: &PgPool) -> Result<Vec<Wallpaper>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM wallpapers WHERE is_published ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Wallpaper>(&query).fetch_all(pool).await
    }

    /// Update a wallpaper. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateWallpaper,
    ) -> Result<Option<Wallpaper>, sqlx::Error> {
        let query = format!(
            "UPDATE wallpapers SET
                title = COALESCE($2, title),
                slug = COALESCE($3, slug),
                description = COALESCE($4, description),
                category_id = COALESCE($5, category_id),
                storage_path = COALESCE($6, storage_path),
                thumbnail_url = COALESCE($7, thumbnail_url),
                width = COALESCE($8, width),
                height = COALESCE($9, height),
                file_size_bytes = COALESCE($10, file_size_bytes),
                tags = COALESCE($11, tags),
                is_premium = COALESCE($12, is_premium),
                is_published = COALESCE($13, is_published)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Wallpaper>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.slug)
            .bind(&input.description)
            .bind(input.category_id)
            .bind(&input.storage_path)
            .bind(&input.thumbnail_url)
            .bind(input.width)
            .bind(input.height)
            .bind(input.file_size_bytes)
            .bind(&input.tags)
            .bind(input.is_premium)
            .bind(input.is_published)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a wallpaper. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM wallpapers WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Bump the download counter after a token is redeemed.
    pub async fn increment_download_count<'e, E>(executor: E, id: DbId) -> Result<(), sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        sqlx::query("UPDATE wallpapers SET download_count = download_count + 1 WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Most downloaded wallpapers overall.
    pub async fn top_downloaded(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<WallpaperDownloadStat>, sqlx::Error> {
        sqlx::query_as::<_, WallpaperDownloadStat>(
            "SELECT id, title, slug, is_premium, download_count
             FROM wallpapers
             ORDER BY download_count DESC, id
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    pub async fn counts(pool: &PgPool) -> Result<CatalogCounts, sqlx::Error> {
        sqlx::query_as::<_, CatalogCounts>(
            "SELECT
                COUNT(*) AS wallpapers_total,
                COUNT(*) FILTER (WHERE is_published) AS wallpapers_published,
                COUNT(*) FILTER (WHERE is_premium) AS wallpapers_premium,
                COALESCE(SUM(download_count), 0)::BIGINT AS total_downloads
             FROM wallpapers",
        )
        .fetch_one(pool)
        .await
    }
}
