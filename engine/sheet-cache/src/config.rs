//! Cache configuration

use crate::error::{CacheError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Redis connection URL
    pub redis_url: String,

    /// Expiry applied to written tables; `None` keeps them until the next refresh
    pub ttl_seconds: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { redis_url: "redis://127.0.0.1:6379".to_string(), ttl_seconds: None }
    }
}

impl CacheConfig {
    /// Create a configuration pointing at the given Redis URL
    pub fn new(redis_url: impl Into<String>) -> Self {
        Self { redis_url: redis_url.into(), ..Default::default() }
    }

    /// Get the table TTL as Duration
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_seconds.map(Duration::from_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !self.redis_url.starts_with("redis://") && !self.redis_url.starts_with("rediss://") {
            return Err(CacheError::config(format!("Invalid Redis URL: {}", self.redis_url)));
        }

        if self.ttl_seconds == Some(0) {
            return Err(CacheError::config("Cache ttl_seconds must be greater than 0 when set"));
        }

        Ok(())
    }
}
