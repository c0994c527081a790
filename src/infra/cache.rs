//! Redis cache implementation.
//!
//! Backs the login rate limiter and a best-effort copy of the public
//! catalog. Catalog cache failures are logged and never fail a request.

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client, RedisError};
use serde::{de::DeserializeOwned, Serialize};

use crate::config::{
    Config, CACHE_KEY_CATALOG, CACHE_PREFIX_RATE_LIMIT, DEFAULT_CACHE_TTL_SECONDS,
};
use crate::domain::CatalogProduct;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Storage for the assembled storefront catalog.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CatalogCache: Send + Sync {
    /// Cached catalog, if present and readable
    async fn load_catalog(&self) -> Option<Vec<CatalogProduct>>;

    async fn store_catalog(&self, catalog: Vec<CatalogProduct>);

    /// Drop the cached catalog after a product, stock or image change
    async fn invalidate_catalog(&self);
}

/// Redis cache wrapper over a multiplexed connection manager.
#[derive(Clone)]
pub struct Cache {
    connection: ConnectionManager,
    default_ttl: u64,
}

impl Cache {
    /// Connect to Redis.
    pub async fn connect(config: &Config) -> AppResult<Self> {
        let cache = Self::try_connect(config).await.map_err(cache_error)?;
        tracing::info!("Redis cache connected");
        Ok(cache)
    }

    /// Try to connect to Redis, returning the raw Redis error.
    pub async fn try_connect(config: &Config) -> Result<Self, RedisError> {
        let client = Client::open(config.redis_url.as_str())?;
        let connection = ConnectionManager::new(client).await?;

        Ok(Self {
            connection,
            default_ttl: DEFAULT_CACHE_TTL_SECONDS,
        })
    }

    // =========================================================================
    // Generic Cache Operations
    // =========================================================================

    /// Get a value from cache.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        let mut conn = self.connection.clone();
        let value: Option<String> = conn.get(key).await.map_err(cache_error)?;

        match value {
            Some(json) => {
                let parsed = serde_json::from_str(&json).map_err(|e| {
                    AppError::internal(format!("Cache deserialization error: {}", e))
                })?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

    /// Set a value in cache with default TTL.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> AppResult<()> {
        self.set_with_ttl(key, value, self.default_ttl).await
    }

    /// Set a value in cache with custom TTL (in seconds).
    pub async fn set_with_ttl<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl_seconds: u64,
    ) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let json = serde_json::to_string(value)
            .map_err(|e| AppError::internal(format!("Cache serialization error: {}", e)))?;

        conn.set_ex::<_, _, ()>(key, json, ttl_seconds)
            .await
            .map_err(cache_error)?;

        Ok(())
    }

    /// Delete a value from cache.
    pub async fn delete(&self, key: &str) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let _: () = conn.del(key).await.map_err(cache_error)?;
        Ok(())
    }

    /// Check if a key exists in cache.
    pub async fn exists(&self, key: &str) -> AppResult<bool> {
        let mut conn = self.connection.clone();
        let exists: bool = conn.exists(key).await.map_err(cache_error)?;
        Ok(exists)
    }

    // =========================================================================
    // Rate Limiting Operations
    // =========================================================================

    /// Count a request against a fixed window.
    /// Returns (current_count, is_allowed) tuple.
    pub async fn check_rate_limit(
        &self,
        identifier: &str,
        max_requests: u64,
        window_seconds: u64,
    ) -> AppResult<(u64, bool)> {
        let key = rate_limit_key(identifier);
        let mut conn = self.connection.clone();

        let (count,): (i64,) = rate_limit_pipeline(&key, window_seconds)
            .query_async(&mut conn)
            .await
            .map_err(cache_error)?;

        let count = count.max(0) as u64;
        Ok((count, count <= max_requests))
    }
}

#[async_trait]
impl CatalogCache for Cache {
    async fn load_catalog(&self) -> Option<Vec<CatalogProduct>> {
        match self.get(CACHE_KEY_CATALOG).await {
            Ok(catalog) => catalog,
            Err(e) => {
                tracing::warn!(error = %e, "Catalog cache read failed");
                None
            }
        }
    }

    async fn store_catalog(&self, catalog: Vec<CatalogProduct>) {
        if let Err(e) = self.set(CACHE_KEY_CATALOG, &catalog).await {
            tracing::warn!(error = %e, "Catalog cache write failed");
        }
    }

    async fn invalidate_catalog(&self) {
        if let Err(e) = self.delete(CACHE_KEY_CATALOG).await {
            tracing::warn!(error = %e, "Catalog cache invalidation failed");
        }
    }
}

/// `MULTI; INCR; EXPIRE NX; EXEC`. EXPIRE NX (Redis 7+) only sets the TTL
/// when the window opens.
fn rate_limit_pipeline(key: &str, window_seconds: u64) -> redis::Pipeline {
    let mut pipe = redis::pipe();
    pipe.atomic()
        .incr(key, 1)
        .cmd("EXPIRE")
        .arg(key)
        .arg(window_seconds)
        .arg("NX")
        .ignore();
    pipe
}

fn rate_limit_key(identifier: &str) -> String {
    format!("{}{}", CACHE_PREFIX_RATE_LIMIT, identifier)
}

/// Convert Redis error to AppError.
fn cache_error(e: RedisError) -> AppError {
    tracing::error!("Redis error: {}", e);
    AppError::internal(format!("Cache error: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_key() {
        assert_eq!(rate_limit_key("login:1.2.3.4"), "rate_limit:login:1.2.3.4");
    }

    #[test]
    fn test_rate_limit_pipeline_is_one_transaction() {
        let packed = rate_limit_pipeline(&rate_limit_key("login:1.2.3.4"), 60).get_packed_pipeline();
        let packed = String::from_utf8(packed).unwrap();

        let order: Vec<usize> = ["MULTI", "INCR", "EXPIRE", "NX", "EXEC"]
            .iter()
            .map(|cmd| packed.find(cmd).unwrap())
            .collect();
        assert!(order.windows(2).all(|w| w[0] < w[1]));
        assert!(packed.contains("\r\n60\r\n"));
    }

    #[test]
    fn test_catalog_key() {
        assert_eq!(CACHE_KEY_CATALOG, "catalog:listed");
    }
}
