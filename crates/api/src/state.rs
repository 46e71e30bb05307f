use std::sync::Arc;

use backdrop_core::signed_url::UrlSigner;

use crate::cache::ResponseCache;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: backdrop_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Response cache for public catalog reads.
    pub cache: Arc<ResponseCache>,
    /// Signs and verifies `/storage` URLs.
    pub signer: Arc<UrlSigner>,
}

impl AppState {
    /// Build the state from a pool and configuration.
    pub fn new(pool: backdrop_db::DbPool, config: ServerConfig) -> Self {
        let cache = ResponseCache::new(std::time::Duration::from_secs(config.cache_ttl_secs));
        let signer = UrlSigner::new(config.url_signing_secret.clone());
        Self {
            pool,
            config: Arc::new(config),
            cache: Arc::new(cache),
            signer: Arc::new(signer),
        }
    }
}
