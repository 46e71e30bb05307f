//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod admin_action_repo;
pub mod cache_invalidation_repo;
pub mod category_repo;
pub mod collection_repo;
pub mod download_session_repo;
pub mod performance_log_repo;
pub mod profile_repo;
pub mod wallpaper_repo;

pub use admin_action_repo::AdminActionRepo;
pub use cache_invalidation_repo::CacheInvalidationRepo;
pub use category_repo::CategoryRepo;
pub use collection_repo::CollectionRepo;
pub use download_session_repo::DownloadSessionRepo;
pub use performance_log_repo::PerformanceLogRepo;
pub use profile_repo::ProfileRepo;
pub use wallpaper_repo::WallpaperRepo;
