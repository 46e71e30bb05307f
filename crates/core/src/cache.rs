//! Response cache key vocabulary and invalidation targets.
//!
//! Keys are plain strings. An invalidation names either one key, a prefix
//! (trailing `*`), or the [`CLEAR_ALL_CACHE`] sentinel.

use crate::error::CoreError;
use crate::types::DbId;

/// Sentinel key that drops every cached entry.
pub const CLEAR_ALL_CACHE: &str = "CLEAR_ALL_CACHE";

pub const CATEGORIES: &str = "categories";
pub const COLLECTIONS: &str = "collections";
pub const SITEMAP: &str = "sitemap";
pub const ROBOTS: &str = "robots";

/// Prefix shared by every wallpaper-detail entry.
pub const WALLPAPER_PREFIX: &str = "wallpaper:";

/// Prefix shared by every cached category page.
pub const CATEGORY_PREFIX: &str = "category:";

pub const MAX_CACHE_KEY_LEN: usize = 200;

/// Default time-to-live of a cached response in seconds.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

pub fn wallpaper_key(id: DbId) -> String {
    format!("{WALLPAPER_PREFIX}{id}")
}

pub fn category_key(slug: &str) -> String {
    format!("{CATEGORY_PREFIX}{slug}")
}

pub fn collection_key(slug: &str) -> String {
    format!("collection:{slug}")
}

/// What an invalidation request drops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidationTarget {
    All,
    Exact(String),
    Prefix(String),
}

impl InvalidationTarget {
    /// Interpret a stored `cache_key`.
    pub fn parse(key: &str) -> Self {
        if key == CLEAR_ALL_CACHE {
            Self::All
        } else if let Some(prefix) = key.strip_suffix('*') {
            Self::Prefix(prefix.to_string())
        } else {
            Self::Exact(key.to_string())
        }
    }

    pub fn matches(&self, key: &str) -> bool {
        match self {
            Self::All => true,
            Self::Exact(k) => k == key,
            Self::Prefix(p) => key.starts_with(p.as_str()),
        }
    }
}

/// Validate a cache key submitted by an admin.
///
/// A lone `*` is refused; use [`CLEAR_ALL_CACHE`] for that.
pub fn validate_cache_key(key: &str) -> Result<(), CoreError> {
    let trimmed = key.trim();
    if trimmed.is_empty() || trimmed == "*" {
        return Err(CoreError::Validation(
            "Cache key must not be empty (use CLEAR_ALL_CACHE to clear everything)".into(),
        ));
    }
    if trimmed.len() > MAX_CACHE_KEY_LEN {
        return Err(CoreError::Validation(format!(
            "Cache key must be at most {MAX_CACHE_KEY_LEN} characters"
        )));
    }
    let body = trimmed.strip_suffix('*').unwrap_or(trimmed);
    if body.contains('*') {
        return Err(CoreError::Validation(
            "Wildcard '*' is only allowed at the end of a cache key".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_targets() {
        assert_eq!(InvalidationTarget::parse(CLEAR_ALL_CACHE), InvalidationTarget::All);
        assert_eq!(
            InvalidationTarget::parse("wallpaper:*"),
            InvalidationTarget::Prefix("wallpaper:".into())
        );
        assert_eq!(
            InvalidationTarget::parse(CATEGORIES),
            InvalidationTarget::Exact("categories".into())
        );
    }

    #[test]
    fn prefix_matches_family() {
        let target = InvalidationTarget::parse("wallpaper:*");
        assert!(target.matches(&wallpaper_key(7)));
        assert!(!target.matches(CATEGORIES));
    }

    #[test]
    fn exact_matches_only_itself() {
        let target = InvalidationTarget::parse(&wallpaper_key(7));
        assert!(target.matches("wallpaper:7"));
        assert!(!target.matches("wallpaper:70"));
    }

    #[test]
    fn key_validation() {
        assert!(validate_cache_key("categories").is_ok());
        assert!(validate_cache_key("wallpaper:*").is_ok());
        assert!(validate_cache_key(CLEAR_ALL_CACHE).is_ok());
        assert!(validate_cache_key("").is_err());
        assert!(validate_cache_key("*").is_err());
        assert!(validate_cache_key("a*b").is_err());
        assert!(validate_cache_key(&"k".repeat(MAX_CACHE_KEY_LEN + 1)).is_err());
    }
}
