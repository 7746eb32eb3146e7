//! Typed JSON access on top of a key-value store

use crate::backend::KeyValueStore;
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Cache of JSON-encoded tables
#[derive(Clone)]
pub struct SheetCache {
    store: Arc<dyn KeyValueStore>,
    ttl: Option<Duration>,
}

impl SheetCache {
    /// Wrap a store; values are written without expiry
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store, ttl: None }
    }

    /// Wrap a store using the TTL from configuration
    pub fn with_config(store: Arc<dyn KeyValueStore>, config: &CacheConfig) -> Self {
        Self { store, ttl: config.ttl() }
    }

    /// Get cached data
    pub async fn get<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        match self.store.get(key).await? {
            Some(data) => {
                let value: T = serde_json::from_str(&data)
                    .map_err(|e| CacheError::serialization(key, e))?;
                debug!("Cache hit for key: {}", key);
                Ok(Some(value))
            }
            None => {
                debug!("Cache miss for key: {}", key);
                Ok(None)
            }
        }
    }

    /// Set cached data with the configured TTL
    pub async fn set<T>(&self, key: &str, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let serialized =
            serde_json::to_string(value).map_err(|e| CacheError::serialization(key, e))?;
        self.store.set(key, serialized, self.ttl).await?;
        info!("Inserted {} into cache", key);
        Ok(())
    }

    /// Delete cached data
    pub async fn delete(&self, key: &str) -> Result<()> {
        self.store.delete(key).await?;
        debug!("Deleted cache key: {}", key);
        Ok(())
    }

    /// Delete every key matching `"{prefix}-{name}*"` for each name.
    ///
    /// An empty `names` list flushes the whole store.
    pub async fn clear_matching(&self, names: &[String], prefix: &str) -> Result<usize> {
        if names.is_empty() {
            warn!("Clearing all data in cache");
            self.store.flush_all().await?;
            return Ok(0);
        }

        let mut doomed = Vec::new();
        for name in names {
            let keys = self.store.keys_with_prefix(&format!("{}-{}", prefix, name)).await?;
            doomed.extend(keys);
        }

        for key in &doomed {
            self.delete(key).await?;
        }

        info!("Cleared {} cache keys", doomed.len());
        Ok(doomed.len())
    }

    /// Remove every key
    pub async fn flush(&self) -> Result<()> {
        self.clear_matching(&[], "").await.map(|_| ())
    }
}
