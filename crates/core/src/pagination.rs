//! Pagination defaults and listing helpers.

use serde::{Deserialize, Serialize};

/// Default page size for public wallpaper grids.
pub const DEFAULT_PAGE_LIMIT: i64 = 24;

/// Maximum page size accepted from clients.
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Default number of rows on admin log pages.
pub const DEFAULT_LOG_LIMIT: i64 = 50;

/// Maximum number of rows on admin log pages.
pub const MAX_LOG_LIMIT: i64 = 500;

/// Clamp a user-provided limit to valid bounds.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

/// Build an `ILIKE` pattern matching `query` anywhere, with `%`, `_` and `\`
/// escaped. Returns `None` for blank input.
pub fn contains_pattern(query: &str) -> Option<String> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return None;
    }
    let mut escaped = String::with_capacity(trimmed.len() + 2);
    escaped.push('%');
    for c in trimmed.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    Some(escaped)
}

/// A page of results with the total row count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}
