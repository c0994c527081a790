//! Stock levels.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{Stock, StockUpdate};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{CatalogCache, UnitOfWork};

#[async_trait]
pub trait StockService: Send + Sync {
    /// Total units over every variant with this name
    async fn by_name(&self, name: &str) -> AppResult<i64>;

    async fn list(&self) -> AppResult<Vec<Stock>>;

    /// Stock of a product; a zero placeholder when it has no row
    async fn for_product(&self, product_id: i64) -> AppResult<Stock>;

    async fn update(&self, id: i64, update: StockUpdate) -> AppResult<Stock>;
}

pub struct StockManager<U: UnitOfWork> {
    uow: Arc<U>,
    cache: Arc<dyn CatalogCache>,
}

impl<U: UnitOfWork> StockManager<U> {
    pub fn new(uow: Arc<U>, cache: Arc<dyn CatalogCache>) -> Self {
        Self { uow, cache }
    }
}

#[async_trait]
impl<U: UnitOfWork> StockService for StockManager<U> {
    async fn by_name(&self, name: &str) -> AppResult<i64> {
        let variants = self.uow.products().list_by_name(name).await?;
        let ids = variants.iter().map(|p| p.id).collect();
        let stocks = self.uow.stocks().list_for_products(ids).await?;
        Ok(stocks.iter().map(|s| s.quantity).sum())
    }

    async fn list(&self) -> AppResult<Vec<Stock>> {
        self.uow.stocks().list().await
    }

    async fn for_product(&self, product_id: i64) -> AppResult<Stock> {
        Ok(self
            .uow
            .stocks()
            .find_by_product(product_id)
            .await?
            .unwrap_or_else(|| Stock::empty(product_id)))
    }

    async fn update(&self, id: i64, update: StockUpdate) -> AppResult<Stock> {
        if update.quantity < 0 {
            return Err(AppError::validation("Quantity must not be negative"));
        }
        if !(0.0..=100.0).contains(&update.discount) {
            return Err(AppError::validation("Discount must be between 0 and 100"));
        }

        let stock = self
            .uow
            .stocks()
            .update(id, update)
            .await?
            .ok_or_not_found("Stock")?;

        self.cache.invalidate_catalog().await;
        Ok(stock)
    }
}
