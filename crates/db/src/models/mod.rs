//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod admin_action;
pub mod cache_invalidation;
pub mod category;
pub mod collection;
pub mod download_session;
pub mod performance_log;
pub mod profile;
pub mod wallpaper;
