//! Shared query parameter types for API handlers.

use backdrop_core::types::Timestamp;
use chrono::{Duration, Utc};
use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Generic pagination parameters (`?limit=&offset=`).
///
/// Values are clamped in handlers via `clamp_limit` / `clamp_offset`.
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Date range query parameters (`?from=&to=`, RFC 3339).
#[derive(Debug, Default, Deserialize)]
pub struct DateRangeQuery {
    /// Start of the window. Defaults to `default_days` before `to`.
    pub from: Option<String>,
    /// End of the window. Defaults to now.
    pub to: Option<String>,
}

fn parse_timestamp(field: &str, raw: &str) -> AppResult<Timestamp> {
    raw.parse::<Timestamp>()
        .map_err(|_| AppError::BadRequest(format!("Invalid '{field}' date format")))
}

impl DateRangeQuery {
    /// Resolve to a concrete `(from, to)` window.
    pub fn resolve(&self, default_days: i64) -> AppResult<(Timestamp, Timestamp)> {
        let to = match &self.to {
            Some(raw) => parse_timestamp("to", raw)?,
            None => Utc::now(),
        };
        let from = match &self.from {
            Some(raw) => parse_timestamp("from", raw)?,
            None => to - Duration::days(default_days),
        };
        if from > to {
            return Err(AppError::BadRequest("'from' must not be after 'to'".into()));
        }
        Ok((from, to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn defaults_to_trailing_window() {
        let (from, to) = DateRangeQuery::default().resolve(7).unwrap();
        assert_eq!(to - from, Duration::days(7));
    }

    #[test]
    fn rejects_bad_and_inverted_ranges() {
        let bad = DateRangeQuery {
            from: Some("yesterday".into()),
            to: None,
        };
        assert_matches!(bad.resolve(7), Err(AppError::BadRequest(_)));

        let inverted = DateRangeQuery {
            from: Some("2024-06-02T00:00:00Z".into()),
            to: Some("2024-06-01T00:00:00Z".into()),
        };
        assert_matches!(inverted.resolve(7), Err(AppError::BadRequest(_)));
    }
}
