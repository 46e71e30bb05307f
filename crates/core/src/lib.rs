//! Backdrop domain logic.
//!
//! Pure functions and types shared by the database and API crates. Nothing
//! in here performs I/O.

pub mod cache;
pub mod download_token;
pub mod error;
pub mod hashing;
pub mod metrics;
pub mod pagination;
pub mod roles;
pub mod signed_url;
pub mod sitemap;
pub mod storage;
pub mod subscription;
pub mod types;
pub mod validation;
