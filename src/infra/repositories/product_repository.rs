//! Product repository.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use super::entities::product::{self, ActiveModel, Entity as ProductEntity};
use super::stock_repository;
use crate::domain::{NewProduct, Product};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Product repository trait for dependency injection.
///
/// Products and their stock row are created and deleted together.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Product>>;

    /// Products with the given ids, in no particular order
    async fn find_many(&self, ids: Vec<i64>) -> AppResult<Vec<Product>>;

    /// Every product, listed or not
    async fn list(&self) -> AppResult<Vec<Product>>;

    /// Listed products ordered by name
    async fn list_listed(&self) -> AppResult<Vec<Product>>;

    /// All variants sharing a name
    async fn list_by_name(&self, name: &str) -> AppResult<Vec<Product>>;

    async fn count_by_name(&self, name: &str) -> AppResult<u64>;

    /// Insert a product together with an empty stock row
    async fn create(&self, product: NewProduct) -> AppResult<Product>;

    /// Persist every field of an existing product
    async fn update(&self, product: Product) -> AppResult<Product>;

    /// Delete a product and its stock row. Returns false when it did not exist.
    async fn delete(&self, id: i64) -> AppResult<bool>;
}

pub struct ProductStore {
    db: DatabaseConnection,
}

impl ProductStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductRepository for ProductStore {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Product>> {
        let result = ProductEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Product::from))
    }

    async fn find_many(&self, ids: Vec<i64>) -> AppResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = ProductEntity::find()
            .filter(product::Column::Id.is_in(ids))
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Product::from).collect())
    }

    async fn list(&self) -> AppResult<Vec<Product>> {
        let models = ProductEntity::find()
            .order_by_asc(product::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Product::from).collect())
    }

    async fn list_listed(&self) -> AppResult<Vec<Product>> {
        let models = ProductEntity::find()
            .filter(product::Column::Listed.eq(true))
            .order_by_asc(product::Column::Name)
            .order_by_asc(product::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Product::from).collect())
    }

    async fn list_by_name(&self, name: &str) -> AppResult<Vec<Product>> {
        let models = ProductEntity::find()
            .filter(product::Column::Name.eq(name))
            .order_by_asc(product::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Product::from).collect())
    }

    async fn count_by_name(&self, name: &str) -> AppResult<u64> {
        let count = ProductEntity::find()
            .filter(product::Column::Name.eq(name))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    async fn create(&self, product: NewProduct) -> AppResult<Product> {
        let now = chrono::Utc::now();
        let txn = self.db.begin().await?;

        let model = ActiveModel {
            name: Set(product.name),
            description: Set(product.description),
            price: Set(product.price),
            size: Set(product.size),
            color: Set(product.color),
            material: Set(product.material),
            is_virtual: Set(product.is_virtual),
            listed: Set(product.listed),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(AppError::from)?;

        stock_repository::insert_empty(&txn, model.id).await?;
        txn.commit().await?;

        Ok(Product::from(model))
    }

    async fn update(&self, product: Product) -> AppResult<Product> {
        let existing = ProductEntity::find_by_id(product.id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("Product"))?;

        let mut active: ActiveModel = existing.into();
        active.name = Set(product.name);
        active.description = Set(product.description);
        active.price = Set(product.price);
        active.size = Set(product.size);
        active.color = Set(product.color);
        active.material = Set(product.material);
        active.is_virtual = Set(product.is_virtual);
        active.listed = Set(product.listed);
        active.updated_at = Set(product.updated_at);

        let model = active.update(&self.db).await.map_err(AppError::from)?;
        Ok(Product::from(model))
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let txn = self.db.begin().await?;

        stock_repository::delete_for_product(&txn, id).await?;
        let result = ProductEntity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(result.rows_affected > 0)
    }
}
