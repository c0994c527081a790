//! Product management and the storefront catalog.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;

use super::container::parallel;
use crate::config::MAX_PRODUCT_PRICE;
use crate::domain::{
    build_catalog, build_entry, validate_product_name, CatalogProduct, NewProduct, Product,
    ProductChanges, SizeDetail, Stock,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{CatalogCache, ImageStore, UnitOfWork};

#[async_trait]
pub trait ProductService: Send + Sync {
    async fn create(&self, product: NewProduct) -> AppResult<Product>;

    async fn update(&self, id: i64, changes: ProductChanges) -> AppResult<Product>;

    async fn delete(&self, id: i64) -> AppResult<()>;

    async fn list(&self) -> AppResult<Vec<Product>>;

    async fn get(&self, id: i64) -> AppResult<Product>;

    /// Listed products grouped by name, color and size
    async fn catalog(&self) -> AppResult<Vec<CatalogProduct>>;

    /// Every variant of one product name, with discounts
    async fn details(&self, name: &str) -> AppResult<CatalogProduct>;
}

pub struct ProductManager<U: UnitOfWork> {
    uow: Arc<U>,
    images: ImageStore,
    cache: Arc<dyn CatalogCache>,
}

impl<U: UnitOfWork> ProductManager<U> {
    pub fn new(uow: Arc<U>, images: ImageStore, cache: Arc<dyn CatalogCache>) -> Self {
        Self { uow, images, cache }
    }

    async fn stocks_by_product(&self, products: &[Product]) -> AppResult<HashMap<i64, Stock>> {
        let ids = products.iter().map(|p| p.id).collect();
        let stocks = self.uow.stocks().list_for_products(ids).await?;
        Ok(stocks.into_iter().map(|s| (s.product_id, s)).collect())
    }

    async fn images_by_name(&self, names: Vec<String>) -> AppResult<HashMap<String, Vec<String>>> {
        let lists =
            parallel::join_all(names.iter().map(|name| self.images.list(name)).collect()).await?;
        Ok(names.into_iter().zip(lists).collect())
    }
}

fn validate_price(price: i64) -> AppResult<()> {
    if price < 0 {
        return Err(AppError::validation("Price must not be negative"));
    }
    if price > MAX_PRODUCT_PRICE {
        return Err(AppError::validation(format!(
            "Price must not exceed {}",
            MAX_PRODUCT_PRICE
        )));
    }
    Ok(())
}

#[async_trait]
impl<U: UnitOfWork> ProductService for ProductManager<U> {
    async fn create(&self, product: NewProduct) -> AppResult<Product> {
        validate_product_name(&product.name)?;
        validate_price(product.price)?;

        let created = self.uow.products().create(product).await?;
        self.cache.invalidate_catalog().await;

        tracing::info!(product_id = created.id, name = %created.name, "Product created");
        Ok(created)
    }

    async fn update(&self, id: i64, changes: ProductChanges) -> AppResult<Product> {
        let mut product = self
            .uow
            .products()
            .find_by_id(id)
            .await?
            .ok_or_not_found("Product")?;

        if let Some(name) = &changes.name {
            validate_product_name(name)?;
        }
        if let Some(price) = changes.price {
            validate_price(price)?;
        }

        let previous_name = product.name.clone();
        let renamed_to = changes.rename_of(&product).map(str::to_string);

        changes.apply(&mut product);
        let updated = self.uow.products().update(product).await?;

        if let Some(new_name) = renamed_to {
            if let Err(e) = self.images.rename_folder(&previous_name, &new_name).await {
                tracing::error!(
                    product_id = id,
                    from = %previous_name,
                    to = %new_name,
                    error = %e,
                    "Failed to rename image folder"
                );
            }
        }

        self.cache.invalidate_catalog().await;
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let product = self
            .uow
            .products()
            .find_by_id(id)
            .await?
            .ok_or_not_found("Product")?;

        if !self.uow.products().delete(id).await? {
            return Err(AppError::not_found("Product"));
        }

        // Images are shared by every variant with the same name
        if self.uow.products().count_by_name(&product.name).await? == 0 {
            if let Err(e) = self.images.delete_folder(&product.name).await {
                tracing::error!(name = %product.name, error = %e, "Failed to remove image folder");
            }
        }

        self.cache.invalidate_catalog().await;
        tracing::info!(product_id = id, "Product deleted");
        Ok(())
    }

    async fn list(&self) -> AppResult<Vec<Product>> {
        self.uow.products().list().await
    }

    async fn get(&self, id: i64) -> AppResult<Product> {
        self.uow
            .products()
            .find_by_id(id)
            .await?
            .ok_or_not_found("Product")
    }

    async fn catalog(&self) -> AppResult<Vec<CatalogProduct>> {
        if let Some(cached) = self.cache.load_catalog().await {
            return Ok(cached);
        }

        let products = self.uow.products().list_listed().await?;
        let names: Vec<String> = products
            .iter()
            .map(|p| p.name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let (stocks, images) = parallel::join2(
            self.stocks_by_product(&products),
            self.images_by_name(names),
        )
        .await?;

        let catalog = build_catalog(products, &stocks, &images);
        self.cache.store_catalog(catalog.clone()).await;
        Ok(catalog)
    }

    async fn details(&self, name: &str) -> AppResult<CatalogProduct> {
        if name.trim().is_empty() {
            return Err(AppError::bad_request("Product name is required"));
        }

        let variants = self.uow.products().list_by_name(name).await?;
        if variants.is_empty() {
            return Err(AppError::not_found("Product"));
        }

        let (stocks, images) =
            parallel::join2(self.stocks_by_product(&variants), self.images.list(name)).await?;

        build_entry(&variants, &stocks, &images, SizeDetail::WithDiscount)
            .ok_or_else(|| AppError::not_found("Product"))
    }
}
