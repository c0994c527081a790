//! Application state - Dependency injection container.
//!
//! Handlers reach services through the container; the raw database and
//! Redis handles are kept only for the health check and rate limiting.

use std::sync::Arc;

use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::{Cache, CatalogCache, Database};
use crate::services::{ServiceContainer, Services};

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Storefront services
    pub services: Arc<dyn ServiceContainer>,
    pub config: Arc<Config>,
    /// Redis cache; without it rate limiting is skipped and health is degraded
    pub cache: Option<Arc<Cache>>,
    /// Database handle; without it health is degraded
    pub database: Option<Arc<Database>>,
}

impl AppState {
    /// Build every service over live infrastructure.
    pub fn from_config(
        database: Arc<Database>,
        cache: Arc<Cache>,
        config: Config,
    ) -> AppResult<Self> {
        let catalog_cache: Arc<dyn CatalogCache> = cache.clone();
        let services = Services::from_connection(
            database.get_connection(),
            config.clone(),
            catalog_cache,
        )?;

        Ok(Self {
            services: Arc::new(services),
            config: Arc::new(config),
            cache: Some(cache),
            database: Some(database),
        })
    }

    /// Create state around an existing container, with no infrastructure
    /// attached. Used by tests and tools that bring their own services.
    pub fn new(services: Arc<dyn ServiceContainer>, config: Config) -> Self {
        Self {
            services,
            config: Arc::new(config),
            cache: None,
            database: None,
        }
    }
}
