//! Integration tests for the catalog repositories: categories, wallpapers
//! and collections.

use sqlx::PgPool;
use backdrop_db::models::category::{CreateCategory, UpdateCategory};
use backdrop_db::models::collection::CreateCollection;
use backdrop_db::models::wallpaper::{
    CreateWallpaper, UpdateWallpaper, WallpaperFilter, WallpaperSort,
};
use backdrop_db::repositories::{CategoryRepo, CollectionRepo, WallpaperRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_category(name: &str) -> CreateCategory {
    CreateCategory {
        name: name.to_string(),
        slug: None,
        description: None,
        preview_image_url: None,
        sort_order: None,
        is_active: None,
    }
}

fn new_wallpaper(title: &str, category_id: Option<i64>) -> CreateWallpaper {
    CreateWallpaper {
        title: title.to_string(),
        slug: None,
        description: None,
        category_id,
        storage_path: "originals/x.jpg".to_string(),
        thumbnail_url: None,
        width: 1920,
        height: 1080,
        file_size_bytes: None,
        tags: None,
        is_premium: None,
        is_published: Some(true),
    }
}

fn published_filter() -> WallpaperFilter {
    WallpaperFilter {
        published_only: true,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_category_defaults_and_partial_update(pool: PgPool) {
    let category = CategoryRepo::create(&pool, &new_category("Nature"), "nature")
        .await
        .unwrap();
    assert!(category.is_active);
    assert_eq!(category.sort_order, 0);

    let update = UpdateCategory {
        name: None,
        slug: None,
        description: Some("Forests and rivers".to_string()),
        preview_image_url: None,
        sort_order: Some(3),
        is_active: None,
    };
    let updated = CategoryRepo::update(&pool, category.id, &update)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.name, "Nature", "omitted fields are unchanged");
    assert_eq!(updated.sort_order, 3);
    assert_eq!(updated.description.as_deref(), Some("Forests and rivers"));

    assert!(CategoryRepo::update(&pool, 999_999, &update).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_category_slug(pool: PgPool) {
    CategoryRepo::create(&pool, &new_category("Nature"), "nature")
        .await
        .unwrap();
    let err = CategoryRepo::create(&pool, &new_category("Nature 2"), "nature")
        .await
        .unwrap_err();
    let db_err = err.as_database_error().unwrap();
    assert_eq!(db_err.code().as_deref(), Some("23505"));
    assert_eq!(db_err.constraint(), Some("uq_categories_slug"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_category_delete_restricted_by_wallpapers(pool: PgPool) {
    let category = CategoryRepo::create(&pool, &new_category("Nature"), "nature")
        .await
        .unwrap();
    WallpaperRepo::create(&pool, &new_wallpaper("Forest", Some(category.id)), "forest")
        .await
        .unwrap();

    let err = CategoryRepo::delete(&pool, category.id).await.unwrap_err();
    let db_err = err.as_database_error().unwrap();
    assert_eq!(db_err.code().as_deref(), Some("23503"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_active_category_counts(pool: PgPool) {
    let nature = CategoryRepo::create(&pool, &new_category("Nature"), "nature")
        .await
        .unwrap();
    let mut hidden = new_category("Hidden");
    hidden.is_active = Some(false);
    CategoryRepo::create(&pool, &hidden, "hidden").await.unwrap();
    WallpaperRepo::create(&pool, &new_wallpaper("Forest", Some(nature.id)), "forest")
        .await
        .unwrap();
    let mut draft = new_wallpaper("Draft", Some(nature.id));
    draft.is_published = Some(false);
    WallpaperRepo::create(&pool, &draft, "draft").await.unwrap();

    let rows = CategoryRepo::list_active_with_counts(&pool).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].slug, "nature");
    assert_eq!(rows[0].wallpaper_count, 1);

    assert_eq!(CategoryRepo::list_all(&pool).await.unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// Wallpapers
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_wallpaper_defaults(pool: PgPool) {
    let mut input = new_wallpaper("Plain", None);
    input.is_published = None;
    let wallpaper = WallpaperRepo::create(&pool, &input, "plain").await.unwrap();
    assert!(!wallpaper.is_published);
    assert!(!wallpaper.is_premium);
    assert!(wallpaper.tags.is_empty());
    assert_eq!(wallpaper.file_size_bytes, 0);
    assert_eq!(wallpaper.download_count, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_wallpaper_filters_and_sort(pool: PgPool) {
    let mut a = new_wallpaper("Ocean Blue", None);
    a.tags = Some(vec!["water".to_string()]);
    let a = WallpaperRepo::create(&pool, &a, "ocean-blue").await.unwrap();
    let mut b = new_wallpaper("Desert_Sun", None);
    b.is_premium = Some(true);
    let b = WallpaperRepo::create(&pool, &b, "desert-sun").await.unwrap();
    WallpaperRepo::increment_download_count(&pool, b.id).await.unwrap();

    let mut filter = published_filter();
    filter.search_pattern = Some("%WATER%".to_string());
    let rows = WallpaperRepo::list(&pool, &filter, 10, 0).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, a.id);

    let mut filter = published_filter();
    filter.search_pattern = Some("%t\\_s%".to_string());
    let rows = WallpaperRepo::list(&pool, &filter, 10, 0).await.unwrap();
    assert_eq!(rows.len(), 1, "escaped underscore matches literally");
    assert_eq!(rows[0].id, b.id);

    let mut filter = published_filter();
    filter.is_premium = Some(true);
    assert_eq!(WallpaperRepo::count(&pool, &filter).await.unwrap(), 1);

    let mut filter = published_filter();
    filter.sort = WallpaperSort::Popular;
    let rows = WallpaperRepo::list(&pool, &filter, 10, 0).await.unwrap();
    assert_eq!(rows[0].id, b.id);

    let rows = WallpaperRepo::list(&pool, &published_filter(), 1, 1).await.unwrap();
    assert_eq!(rows.len(), 1, "limit and offset page through results");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_wallpaper_update_and_related(pool: PgPool) {
    let category = CategoryRepo::create(&pool, &new_category("Nature"), "nature")
        .await
        .unwrap();
    let forest = WallpaperRepo::create(&pool, &new_wallpaper("Forest", Some(category.id)), "forest")
        .await
        .unwrap();
    let river = WallpaperRepo::create(&pool, &new_wallpaper("River", Some(category.id)), "river")
        .await
        .unwrap();

    let related = WallpaperRepo::related(&pool, category.id, forest.id, 8).await.unwrap();
    assert_eq!(related.len(), 1);
    assert_eq!(related[0].id, river.id);

    let update = UpdateWallpaper {
        title: None,
        slug: None,
        description: None,
        category_id: None,
        storage_path: None,
        thumbnail_url: None,
        width: None,
        height: None,
        file_size_bytes: None,
        tags: Some(vec!["green".to_string()]),
        is_premium: None,
        is_published: Some(false),
    };
    let updated = WallpaperRepo::update(&pool, river.id, &update).await.unwrap().unwrap();
    assert!(!updated.is_published);
    assert_eq!(updated.tags, vec!["green".to_string()]);
    assert_eq!(updated.category_id, Some(category.id));

    let related = WallpaperRepo::related(&pool, category.id, forest.id, 8).await.unwrap();
    assert!(related.is_empty(), "unpublished wallpapers are not related");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invalid_dimensions_rejected_by_schema(pool: PgPool) {
    let mut input = new_wallpaper("Flat", None);
    input.height = 0;
    let err = WallpaperRepo::create(&pool, &input, "flat").await.unwrap_err();
    assert_eq!(
        err.as_database_error().unwrap().constraint(),
        Some("ck_wallpapers_dimensions")
    );
}

// ---------------------------------------------------------------------------
// Collections
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_collection_positions(pool: PgPool) {
    let input = CreateCollection {
        name: "Picks".to_string(),
        slug: None,
        description: None,
        cover_image_url: None,
        is_featured: None,
        is_active: None,
        sort_order: None,
    };
    let collection = CollectionRepo::create(&pool, &input, "picks").await.unwrap();
    let a = WallpaperRepo::create(&pool, &new_wallpaper("A", None), "a").await.unwrap();
    let b = WallpaperRepo::create(&pool, &new_wallpaper("B", None), "b").await.unwrap();

    assert_eq!(CollectionRepo::add_wallpaper(&pool, collection.id, a.id, None).await.unwrap(), 0);
    assert_eq!(CollectionRepo::add_wallpaper(&pool, collection.id, b.id, None).await.unwrap(), 1);

    // Re-adding with a position moves the member instead of duplicating it.
    assert_eq!(
        CollectionRepo::add_wallpaper(&pool, collection.id, a.id, Some(5)).await.unwrap(),
        5
    );
    let members = CollectionRepo::list_wallpapers(&pool, collection.id, true).await.unwrap();
    assert_eq!(members.iter().map(|w| w.id).collect::<Vec<_>>(), vec![b.id, a.id]);

    assert!(CollectionRepo::remove_wallpaper(&pool, collection.id, b.id).await.unwrap());
    assert!(!CollectionRepo::remove_wallpaper(&pool, collection.id, b.id).await.unwrap());

    // Deleting a wallpaper removes its memberships.
    WallpaperRepo::delete(&pool, a.id).await.unwrap();
    assert!(CollectionRepo::list_wallpapers(&pool, collection.id, false)
        .await
        .unwrap()
        .is_empty());
}
