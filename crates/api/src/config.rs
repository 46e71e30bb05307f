use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use backdrop_core::cache::DEFAULT_CACHE_TTL_SECS;
use backdrop_core::download_token::DEFAULT_TOKEN_TTL_SECS;
use backdrop_core::signed_url::DEFAULT_SIGNED_URL_TTL_SECS;

use crate::auth::jwt::{JwtConfig, DEFAULT_ACCESS_EXPIRY_MINS, MAX_ACCESS_EXPIRY_MINS};

const DAY_SECS: i64 = 24 * 60 * 60;

pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 600;
pub const MAX_SHUTDOWN_TIMEOUT_SECS: u64 = 300;
pub const MAX_DOWNLOAD_TOKEN_TTL_SECS: i64 = DAY_SECS;
pub const MAX_SIGNED_URL_TTL_SECS: i64 = DAY_SECS;
pub const MAX_CACHE_TTL_SECS: u64 = DAY_SECS as u64;
pub const MAX_CACHE_SYNC_INTERVAL_SECS: u64 = 60 * 60;
pub const MAX_SESSION_RETENTION_HOURS: i64 = 365 * 24;
pub const MAX_PERF_LOG_RETENTION_DAYS: i64 = 10 * 365;

/// A configuration value outside its accepted range.
#[derive(Debug, thiserror::Error)]
#[error("{key} has invalid value '{value}': {reason}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

fn check_range<T>(key: &'static str, value: T, min: T, max: T) -> Result<(), ConfigError>
where
    T: PartialOrd + Display,
{
    if value < min || value > max {
        return Err(ConfigError {
            key,
            value: value.to_string(),
            reason: format!("must be between {min} and {max}"),
        });
    }
    Ok(())
}

fn check_http_url(key: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError {
            key,
            value: value.to_string(),
            reason: "must start with http:// or https://".into(),
        })
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields except secrets have sensible defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long background tasks get to stop after shutdown starts (default: `10`).
    pub shutdown_timeout_secs: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// Directory holding wallpaper originals.
    pub storage_root: PathBuf,
    /// Origin under which `/storage` URLs are handed out.
    pub public_base_url: String,
    /// Public SPA origin used in the sitemap.
    pub site_url: String,
    /// HMAC secret for signed storage URLs.
    pub url_signing_secret: String,
    pub download_token_ttl_secs: i64,
    pub signed_url_ttl_secs: i64,
    pub cache_ttl_secs: u64,
    pub cache_sync_interval_secs: u64,
    /// Unredeemed sessions are purged this long after they expire.
    pub session_retention_hours: i64,
    pub perf_log_retention_days: i64,
    /// Whether the timing middleware writes `performance_logs` rows.
    pub perf_log_enabled: bool,
}

/// Read `key`, falling back to `default`, and parse it.
///
/// # Panics
///
/// Panics if the value does not parse; misconfiguration should fail fast.
fn env_or<T>(key: &str, default: &str) -> T
where
    T: FromStr,
    T::Err: Display,
{
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse()
        .unwrap_or_else(|e| panic!("{key} has invalid value '{raw}': {e}"))
}

/// Read a required, non-empty secret.
///
/// # Panics
///
/// Panics if `key` is unset or empty.
fn required_secret(key: &str) -> String {
    let value = std::env::var(key).unwrap_or_else(|_| panic!("{key} must be set in the environment"));
    assert!(!value.is_empty(), "{key} must not be empty");
    value
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// # Panics
    ///
    /// Panics on a missing secret, an unparsable value, or a value rejected
    /// by [`ServerConfig::validate`].
    ///
    /// | Env Var                    | Default                    |
    /// |----------------------------|----------------------------|
    /// | `JWT_SECRET`               | **required**               |
    /// | `JWT_ACCESS_EXPIRY_MINS`   | `60`                       |
    /// | `HOST`                     | `0.0.0.0`                  |
    /// | `PORT`                     | `3000`                     |
    /// | `CORS_ORIGINS`             | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`     | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`    | `10`                       |
    /// | `STORAGE_ROOT`             | `./storage`                |
    /// | `PUBLIC_BASE_URL`          | `http://localhost:3000`    |
    /// | `SITE_URL`                 | `http://localhost:5173`    |
    /// | `URL_SIGNING_SECRET`       | **required**               |
    /// | `DOWNLOAD_TOKEN_TTL_SECS`  | `300`                      |
    /// | `SIGNED_URL_TTL_SECS`      | `60`                       |
    /// | `CACHE_TTL_SECS`           | `300`                      |
    /// | `CACHE_SYNC_INTERVAL_SECS` | `15`                       |
    /// | `SESSION_RETENTION_HOURS`  | `24`                       |
    /// | `PERF_LOG_RETENTION_DAYS`  | `30`                       |
    /// | `PERF_LOG_ENABLED`         | `true`                     |
    pub fn from_env() -> Self {
        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let config = Self {
            host: env_or("HOST", "0.0.0.0"),
            port: env_or("PORT", "3000"),
            cors_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", "30"),
            shutdown_timeout_secs: env_or("SHUTDOWN_TIMEOUT_SECS", "10"),
            jwt: JwtConfig {
                secret: required_secret("JWT_SECRET"),
                access_token_expiry_mins: env_or(
                    "JWT_ACCESS_EXPIRY_MINS",
                    &DEFAULT_ACCESS_EXPIRY_MINS.to_string(),
                ),
            },
            storage_root: env_or("STORAGE_ROOT", "./storage"),
            public_base_url: env_or("PUBLIC_BASE_URL", "http://localhost:3000"),
            site_url: env_or("SITE_URL", "http://localhost:5173"),
            url_signing_secret: required_secret("URL_SIGNING_SECRET"),
            download_token_ttl_secs: env_or(
                "DOWNLOAD_TOKEN_TTL_SECS",
                &DEFAULT_TOKEN_TTL_SECS.to_string(),
            ),
            signed_url_ttl_secs: env_or(
                "SIGNED_URL_TTL_SECS",
                &DEFAULT_SIGNED_URL_TTL_SECS.to_string(),
            ),
            cache_ttl_secs: env_or("CACHE_TTL_SECS", &DEFAULT_CACHE_TTL_SECS.to_string()),
            cache_sync_interval_secs: env_or("CACHE_SYNC_INTERVAL_SECS", "15"),
            session_retention_hours: env_or("SESSION_RETENTION_HOURS", "24"),
            perf_log_retention_days: env_or("PERF_LOG_RETENTION_DAYS", "30"),
            perf_log_enabled: env_or("PERF_LOG_ENABLED", "true"),
        };

        if let Err(e) = config.validate() {
            panic!("{e}");
        }
        config
    }

    /// Range-check every numeric setting and the public URLs.
    ///
    /// `CACHE_TTL_SECS=0` disables the response cache; retention windows of
    /// zero purge as soon as rows qualify.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range(
            "REQUEST_TIMEOUT_SECS",
            self.request_timeout_secs,
            1,
            MAX_REQUEST_TIMEOUT_SECS,
        )?;
        check_range(
            "SHUTDOWN_TIMEOUT_SECS",
            self.shutdown_timeout_secs,
            0,
            MAX_SHUTDOWN_TIMEOUT_SECS,
        )?;
        check_range(
            "JWT_ACCESS_EXPIRY_MINS",
            self.jwt.access_token_expiry_mins,
            1,
            MAX_ACCESS_EXPIRY_MINS,
        )?;
        check_range(
            "DOWNLOAD_TOKEN_TTL_SECS",
            self.download_token_ttl_secs,
            1,
            MAX_DOWNLOAD_TOKEN_TTL_SECS,
        )?;
        check_range(
            "SIGNED_URL_TTL_SECS",
            self.signed_url_ttl_secs,
            1,
            MAX_SIGNED_URL_TTL_SECS,
        )?;
        check_range("CACHE_TTL_SECS", self.cache_ttl_secs, 0, MAX_CACHE_TTL_SECS)?;
        check_range(
            "CACHE_SYNC_INTERVAL_SECS",
            self.cache_sync_interval_secs,
            1,
            MAX_CACHE_SYNC_INTERVAL_SECS,
        )?;
        check_range(
            "SESSION_RETENTION_HOURS",
            self.session_retention_hours,
            0,
            MAX_SESSION_RETENTION_HOURS,
        )?;
        check_range(
            "PERF_LOG_RETENTION_DAYS",
            self.perf_log_retention_days,
            0,
            MAX_PERF_LOG_RETENTION_DAYS,
        )?;
        check_http_url("PUBLIC_BASE_URL", &self.public_base_url)?;
        check_http_url("SITE_URL", &self.site_url)?;
        Ok(())
    }
}
