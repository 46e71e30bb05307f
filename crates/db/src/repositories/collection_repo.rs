//! Repository for the `collections` and `collection_wallpapers` tables.

use backdrop_core::types::DbId;
use sqlx::PgPool;

use crate::models::collection::{
    Collection, CollectionWithCount, CreateCollection, UpdateCollection,
};
use crate::models::wallpaper::Wallpaper;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, name, slug, description, cover_image_url, is_featured, is_active, sort_order, \
    created_at, updated_at";

/// Wallpaper columns qualified with the `w` alias.
const WALLPAPER_COLUMNS: &str = "\
    w.id, w.title, w.slug, w.description, w.category_id, w.storage_path, w.thumbnail_url, \
    w.width, w.height, w.file_size_bytes, w.tags, w.is_premium, w.is_published, \
    w.download_count, w.created_at, w.updated_at";

/// Provides CRUD operations for collections and their membership.
pub struct CollectionRepo;

impl CollectionRepo {
    /// Insert a new collection with the resolved `slug`.
    pub async fn create(
        pool: &PgPool,
        input: &CreateCollection,
        slug: &str,
    ) -> Result<Collection, sqlx::Error> {
        let query = format!(
            "INSERT INTO collections
                (name, slug, description, cover_image_url, is_featured, is_active, sort_order)
             VALUES ($1, $2, $3, $4, COALESCE($5, FALSE), COALESCE($6, TRUE), COALESCE($7, 0))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Collection>(&query)
            .bind(&input.name)
            .bind(slug)
            .bind(&input.description)
            .bind(&input.cover_image_url)
            .bind(input.is_featured)
            .bind(input.is_active)
            .bind(input.sort_order)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Collection>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM collections WHERE id = $1");
        sqlx::query_as::<_, Collection>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_slug(
        pool: &PgPool,
        slug: &str,
    ) -> Result<Option<Collection>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM collections WHERE slug = $1");
        sqlx::query_as::<_, Collection>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// Active collections, featured first, with published wallpaper counts.
    pub async fn list_active_with_counts(
        pool: &PgPool,
    ) -> Result<Vec<CollectionWithCount>, sqlx::Error> {
        sqlx::query_as::<_, CollectionWithCount>(
            "SELECT c.id, c.name, c.slug, c.description, c.cover_image_url, c.is_featured,
                    c.sort_order, COUNT(w.id) AS wallpaper_count
             FROM collections c
             LEFT JOIN collection_wallpapers cw ON cw.collection_id = c.id
             LEFT JOIN wallpapers w ON w.id = cw.wallpaper_id AND w.is_published
             WHERE c.is_active
             GROUP BY c.id
             ORDER BY c.is_featured DESC, c.sort_order, c.name",
        )
        .fetch_all(pool)
        .await
    }

    /// Every collection, including inactive ones.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Collection>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM collections ORDER BY is_featured DESC, sort_order, name"
        );
        sqlx::query_as::<_, Collection>(&query).fetch_all(pool).await
    }

    /// Update a collection. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCollection,
    ) -> Result<Option<Collection>, sqlx::Error> {
        let query = format!(
            "UPDATE collections SET
                name = COALESCE($2, name),
                slug = COALESCE($3, slug),
                description = COALESCE($4, description),
                cover_image_url = COALESCE($5, cover_image_url),
                is_featured = COALESCE($6, is_featured),
                is_active = COALESCE($7, is_active),
                sort_order = COALESCE($8, sort_order)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Collection>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.slug)
            .bind(&input.description)
            .bind(&input.cover_image_url)
            .bind(input.is_featured)
            .bind(input.is_active)
            .bind(input.sort_order)
            .fetch_optional(pool)
            .await
    }

    /// Delete a collection and its membership rows. Returns `true` if removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM collections WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Add (or reposition) a wallpaper in a collection.
    ///
    /// Without an explicit `position` the wallpaper goes after the current
    /// last member. Returns the stored position.
    pub async fn add_wallpaper(
        pool: &PgPool,
        collection_id: DbId,
        wallpaper_id: DbId,
        position: Option<i32>,
    ) -> Result<i32, sqlx::Error> {
        sqlx::query_scalar::<_, i32>(
            "INSERT INTO collection_wallpapers (collection_id, wallpaper_id, position)
             VALUES ($1, $2, COALESCE($3, (
                 SELECT COALESCE(MAX(position) + 1, 0)
                 FROM collection_wallpapers WHERE collection_id = $1
             )))
             ON CONFLICT (collection_id, wallpaper_id)
             DO UPDATE SET position = COALESCE($3, collection_wallpapers.position)
             RETURNING position",
        )
        .bind(collection_id)
        .bind(wallpaper_id)
        .bind(position)
        .fetch_one(pool)
        .await
    }

    /// Remove a wallpaper from a collection. Returns `true` if it was a member.
    pub async fn remove_wallpaper(
        pool: &PgPool,
        collection_id: DbId,
        wallpaper_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM collection_wallpapers WHERE collection_id = $1 AND wallpaper_id = $2",
        )
        .bind(collection_id)
        .bind(wallpaper_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Member wallpapers in collection order.
    pub async fn list_wallpapers(
        pool: &PgPool,
        collection_id: DbId,
        published_only: bool,
    ) -> Result<Vec<Wallpaper>, sqlx::Error> {
        let query = format!(
            "SELECT {WALLPAPER_COLUMNS}
             FROM collection_wallpapers cw
             JOIN wallpapers w ON w.id = cw.wallpaper_id
             WHERE cw.collection_id = $1 AND (NOT $2 OR w.is_published)
             ORDER BY cw.position, w.id"
        );
        sqlx::query_as::<_, Wallpaper>(&query)
            .bind(collection_id)
            .bind(published_only)
            .fetch_all(pool)
            .await
    }
}
