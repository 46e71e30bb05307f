//! Integration tests for the cache invalidation queue, admin action log and
//! performance logs.

use chrono::{Duration, Utc};
use serde_json::json;
use sqlx::PgPool;
use backdrop_db::models::admin_action::CreateAdminAction;
use backdrop_db::models::performance_log::CreatePerformanceLog;
use backdrop_db::repositories::{AdminActionRepo, CacheInvalidationRepo, PerformanceLogRepo};

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invalidation_queue(pool: PgPool) {
    let first = CacheInvalidationRepo::create(&pool, "categories", Some("edit"), None)
        .await
        .unwrap();
    let second = CacheInvalidationRepo::create(&pool, "wallpaper:*", None, None)
        .await
        .unwrap();
    assert!(!first.processed);
    assert!(first.processed_at.is_none());

    let pending = CacheInvalidationRepo::list_pending(&pool, 10).await.unwrap();
    assert_eq!(
        pending.iter().map(|r| r.id).collect::<Vec<_>>(),
        vec![first.id, second.id],
        "oldest first"
    );

    let processed = CacheInvalidationRepo::mark_processed(&pool, first.id)
        .await
        .unwrap()
        .unwrap();
    assert!(processed.processed);
    let stamped = processed.processed_at.unwrap();

    // Processing twice keeps the first timestamp.
    let again = CacheInvalidationRepo::mark_processed(&pool, first.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(again.processed_at, Some(stamped));

    assert_eq!(
        CacheInvalidationRepo::mark_many_processed(&pool, &[first.id, second.id])
            .await
            .unwrap(),
        1
    );
    assert!(CacheInvalidationRepo::list_pending(&pool, 10).await.unwrap().is_empty());
    assert_eq!(
        CacheInvalidationRepo::list(&pool, Some(true), 10, 0).await.unwrap().len(),
        2
    );
    assert!(CacheInvalidationRepo::mark_processed(&pool, 999_999).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_after_ignores_processed_flag(pool: PgPool) {
    assert_eq!(CacheInvalidationRepo::latest_id(&pool).await.unwrap(), None);

    let first = CacheInvalidationRepo::create(&pool, "categories", None, None)
        .await
        .unwrap();
    let second = CacheInvalidationRepo::create(&pool, "wallpaper:*", None, None)
        .await
        .unwrap();
    let third = CacheInvalidationRepo::create(&pool, "home", None, None)
        .await
        .unwrap();
    CacheInvalidationRepo::mark_processed(&pool, second.id).await.unwrap();

    assert_eq!(
        CacheInvalidationRepo::latest_id(&pool).await.unwrap(),
        Some(third.id)
    );

    let after_first = CacheInvalidationRepo::list_after(&pool, first.id, 10)
        .await
        .unwrap();
    assert_eq!(
        after_first.iter().map(|r| r.id).collect::<Vec<_>>(),
        vec![second.id, third.id]
    );
    assert!(after_first[0].processed);

    let limited = CacheInvalidationRepo::list_after(&pool, 0, 2).await.unwrap();
    assert_eq!(limited.len(), 2);
    assert!(CacheInvalidationRepo::list_after(&pool, third.id, 10)
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_action_log_filter(pool: PgPool) {
    for action in ["category.create", "wallpaper.update", "category.create"] {
        AdminActionRepo::record(
            &pool,
            &CreateAdminAction {
                admin_id: None,
                action: action.to_string(),
                target_type: "category".to_string(),
                target_id: Some(1),
                details: json!({ "slug": "nature" }),
            },
        )
        .await
        .unwrap();
    }

    let all = AdminActionRepo::list(&pool, None, 10, 0).await.unwrap();
    assert_eq!(all.len(), 3);
    let creates = AdminActionRepo::list(&pool, Some("category.create"), 10, 0)
        .await
        .unwrap();
    assert_eq!(creates.len(), 2);
    assert_eq!(creates[0].details["slug"], "nature");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_performance_log_window_and_retention(pool: PgPool) {
    for (source, name) in [("server", "GET /health"), ("client", "lcp")] {
        PerformanceLogRepo::insert(
            &pool,
            &CreatePerformanceLog {
                source,
                name: name.to_string(),
                method: None,
                status_code: None,
                duration_ms: 12.5,
            },
        )
        .await
        .unwrap();
    }
    sqlx::query("UPDATE performance_logs SET created_at = NOW() - INTERVAL '40 days' WHERE source = 'client'")
        .execute(&pool)
        .await
        .unwrap();

    let now = Utc::now();
    let recent = PerformanceLogRepo::list_between(
        &pool,
        "server",
        now - Duration::days(1),
        now + Duration::minutes(1),
        100,
    )
    .await
    .unwrap();
    assert_eq!(recent.len(), 1);

    let removed = PerformanceLogRepo::delete_older_than(&pool, now - Duration::days(30))
        .await
        .unwrap();
    assert_eq!(removed, 1);
    assert_eq!(PerformanceLogRepo::list_page(&pool, None, 10, 0).await.unwrap().len(), 1);
}
