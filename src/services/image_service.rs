//! Product image management.

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::{AppError, AppResult};
use crate::infra::{CatalogCache, ImageStore};

#[async_trait]
pub trait ImageService: Send + Sync {
    async fn list(&self, name: &str) -> AppResult<Vec<String>>;

    async fn find(&self, name: &str, index: u32) -> AppResult<String>;

    /// Store a new image and return its index
    async fn upload(&self, name: &str, bytes: Vec<u8>) -> AppResult<u32>;

    async fn delete(&self, name: &str, index: u32) -> AppResult<()>;

    async fn swap(&self, name: &str, first: u32, second: u32) -> AppResult<()>;

    async fn read(&self, name: &str, file: &str) -> AppResult<Vec<u8>>;
}

pub struct ImageManager {
    store: ImageStore,
    cache: Arc<dyn CatalogCache>,
}

impl ImageManager {
    pub fn new(store: ImageStore, cache: Arc<dyn CatalogCache>) -> Self {
        Self { store, cache }
    }
}

#[async_trait]
impl ImageService for ImageManager {
    async fn list(&self, name: &str) -> AppResult<Vec<String>> {
        self.store.list(name).await
    }

    async fn find(&self, name: &str, index: u32) -> AppResult<String> {
        self.store.find(name, index).await
    }

    async fn upload(&self, name: &str, bytes: Vec<u8>) -> AppResult<u32> {
        if bytes.is_empty() {
            return Err(AppError::bad_request("Image is empty"));
        }
        let index = self.store.upload(name, &bytes).await?;
        self.cache.invalidate_catalog().await;
        Ok(index)
    }

    async fn delete(&self, name: &str, index: u32) -> AppResult<()> {
        self.store.delete(name, index).await?;
        self.cache.invalidate_catalog().await;
        Ok(())
    }

    async fn swap(&self, name: &str, first: u32, second: u32) -> AppResult<()> {
        self.store.swap(name, first, second).await?;
        self.cache.invalidate_catalog().await;
        Ok(())
    }

    async fn read(&self, name: &str, file: &str) -> AppResult<Vec<u8>> {
        self.store.read(name, file).await
    }
}
