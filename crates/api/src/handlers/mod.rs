//! Request handlers.
//!
//! Each submodule provides async handler functions for one resource.
//! Handlers delegate to the repositories in `backdrop_db` and map errors via
//! [`AppError`](crate::error::AppError).

pub mod admin_actions;
pub mod admin_cache;
pub mod admin_catalog;
pub mod admin_metrics;
pub mod admin_profiles;
pub mod auth;
pub mod categories;
pub mod collections;
pub mod downloads;
pub mod performance;
pub mod profile;
pub mod seo;
pub mod storage;
pub mod wallpapers;
