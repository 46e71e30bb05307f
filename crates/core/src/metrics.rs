//! Aggregation for the admin metrics dashboard.
//!
//! Everything here works on rows already loaded from `performance_logs`;
//! no I/O.

use std::collections::HashMap;

use serde::Serialize;

/// Status codes at or above this count as errors.
pub const ERROR_STATUS_THRESHOLD: i32 = 500;

/// Upper bound on log rows loaded for a single dashboard request.
pub const MAX_SAMPLES: i64 = 20_000;

/// Default number of rows in "slowest endpoints" / "top wallpapers".
pub const DEFAULT_TOP_N: usize = 10;

pub const SOURCE_SERVER: &str = "server";
pub const SOURCE_CLIENT: &str = "client";

/// One timed request or client measurement.
#[derive(Debug, Clone, Copy)]
pub struct RequestSample<'a> {
    pub name: &'a str,
    pub method: Option<&'a str>,
    pub status_code: Option<i32>,
    pub duration_ms: f64,
}

impl RequestSample<'_> {
    fn is_error(&self) -> bool {
        self.status_code
            .is_some_and(|code| code >= ERROR_STATUS_THRESHOLD)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PerformanceSummary {
    pub request_count: usize,
    pub error_count: usize,
    pub error_rate: f64,
    pub avg_duration_ms: f64,
    pub p95_duration_ms: f64,
    pub max_duration_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointStats {
    pub method: Option<String>,
    pub name: String,
    pub request_count: usize,
    pub error_count: usize,
    pub avg_duration_ms: f64,
    pub max_duration_ms: f64,
}

/// Nearest-rank percentile over an ascending slice. `pct` in `(0, 100]`.
fn percentile(sorted: &[f64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = ((pct / 100.0) * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

/// Summarise a set of samples. An empty slice yields all zeros.
pub fn summarize(samples: &[RequestSample<'_>]) -> PerformanceSummary {
    if samples.is_empty() {
        return PerformanceSummary::default();
    }

    let mut durations: Vec<f64> = samples.iter().map(|s| s.duration_ms).collect();
    durations.sort_by(|a, b| a.total_cmp(b));

    let request_count = samples.len();
    let error_count = samples.iter().filter(|s| s.is_error()).count();
    let total: f64 = durations.iter().sum();

    PerformanceSummary {
        request_count,
        error_count,
        error_rate: error_count as f64 / request_count as f64,
        avg_duration_ms: total / request_count as f64,
        p95_duration_ms: percentile(&durations, 95.0),
        max_duration_ms: durations.last().copied().unwrap_or(0.0),
    }
}

/// Group samples by `(method, name)` and return the `limit` slowest groups by
/// average duration, ties broken by name.
pub fn slowest_endpoints(samples: &[RequestSample<'_>], limit: usize) -> Vec<EndpointStats> {
    let mut groups: HashMap<(Option<&str>, &str), EndpointStats> = HashMap::new();

    for sample in samples {
        let entry = groups
            .entry((sample.method, sample.name))
            .or_insert_with(|| EndpointStats {
                method: sample.method.map(str::to_string),
                name: sample.name.to_string(),
                request_count: 0,
                error_count: 0,
                avg_duration_ms: 0.0,
                max_duration_ms: 0.0,
            });
        entry.request_count += 1;
        if sample.is_error() {
            entry.error_count += 1;
        }
        // Running sum; divided below.
        entry.avg_duration_ms += sample.duration_ms;
        entry.max_duration_ms = entry.max_duration_ms.max(sample.duration_ms);
    }

    let mut stats: Vec<EndpointStats> = groups
        .into_values()
        .map(|mut s| {
            s.avg_duration_ms /= s.request_count as f64;
            s
        })
        .collect();

    stats.sort_by(|a, b| {
        b.avg_duration_ms
            .total_cmp(&a.avg_duration_ms)
            .then_with(|| a.name.cmp(&b.name))
    });
    stats.truncate(limit);
    stats
}

/// Share of issued download tokens that were redeemed.
pub fn download_conversion_rate(issued: i64, redeemed: i64) -> f64 {
    if issued <= 0 {
        0.0
    } else {
        redeemed.clamp(0, issued) as f64 / issued as f64
    }
}
