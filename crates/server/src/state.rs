use crate::config::ServerConfig;
use crate::error::ServerResult;
use dashmap::DashMap;
use pool::MatcherPool;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Rate limit tracking: API key -> (count, window_start)
    pub rate_limiter: Arc<DashMap<String, (u32, std::time::Instant)>>,

    /// Matcher pool (shared across requests)
    pub pool: Arc<MatcherPool>,
}

impl ServerState {
    /// Create new server state with a pool built from the configuration.
    ///
    /// The pool starts empty; the embedding application registers its
    /// matchers on `state.pool` before serving traffic.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let pool = Arc::new(MatcherPool::new(config.pool.clone())?);
        Ok(Self::with_pool(config, pool))
    }

    /// Create server state around an existing pool, e.g. one that already
    /// has matchers registered.
    pub fn with_pool(config: ServerConfig, pool: Arc<MatcherPool>) -> Self {
        Self {
            config: Arc::new(config),
            rate_limiter: Arc::new(DashMap::new()),
            pool,
        }
    }

    /// Check if API key is valid
    pub fn is_valid_api_key(&self, key: &str) -> bool {
        self.config.api_keys.contains(key)
    }

    /// Check rate limit for API key
    pub fn check_rate_limit(&self, key: &str) -> bool {
        let now = std::time::Instant::now();
        let window = std::time::Duration::from_secs(60);
        let limit = self.config.rate_limit_per_minute;

        let mut entry = self.rate_limiter.entry(key.to_string()).or_insert((0, now));
        let (count, window_start) = entry.value_mut();

        // Reset if window has passed
        if now.duration_since(*window_start) > window {
            *count = 0;
            *window_start = now;
        }

        // Check limit
        if *count >= limit {
            return false;
        }

        *count += 1;
        true
    }
}

/// Server metadata for health checks
#[derive(Debug, serde::Serialize)]
pub struct ServerMetadata {
    pub version: String,
    pub uptime_seconds: u64,
    pub registered_categories: usize,
}
