//! Stock repository.

use async_trait::async_trait;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, Set,
};

use super::entities::stock::{self, ActiveModel, Entity as StockEntity};
use crate::domain::{Stock, StockUpdate};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait StockRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Stock>>;

    async fn find_by_product(&self, product_id: i64) -> AppResult<Option<Stock>>;

    async fn list(&self) -> AppResult<Vec<Stock>>;

    /// Stock rows of the given products; products without a row are absent
    async fn list_for_products(&self, product_ids: Vec<i64>) -> AppResult<Vec<Stock>>;

    /// Overwrite quantity and discount. `None` when the row does not exist.
    async fn update(&self, id: i64, update: StockUpdate) -> AppResult<Option<Stock>>;
}

pub struct StockStore {
    db: DatabaseConnection,
}

impl StockStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl StockRepository for StockStore {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Stock>> {
        let result = StockEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Stock::from))
    }

    async fn find_by_product(&self, product_id: i64) -> AppResult<Option<Stock>> {
        let result = StockEntity::find()
            .filter(stock::Column::ProductId.eq(product_id))
            .one(&self.db)
            .await?;

        Ok(result.map(Stock::from))
    }

    async fn list(&self) -> AppResult<Vec<Stock>> {
        let models = StockEntity::find()
            .order_by_asc(stock::Column::ProductId)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Stock::from).collect())
    }

    async fn list_for_products(&self, product_ids: Vec<i64>) -> AppResult<Vec<Stock>> {
        if product_ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = StockEntity::find()
            .filter(stock::Column::ProductId.is_in(product_ids))
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Stock::from).collect())
    }

    async fn update(&self, id: i64, update: StockUpdate) -> AppResult<Option<Stock>> {
        let Some(existing) = StockEntity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut active: ActiveModel = existing.into();
        active.quantity = Set(update.quantity);
        active.discount = Set(update.discount);

        let model = active.update(&self.db).await.map_err(AppError::from)?;
        Ok(Some(Stock::from(model)))
    }
}

/// Insert a zero stock row for a freshly created product.
pub(crate) async fn insert_empty<C: ConnectionTrait>(conn: &C, product_id: i64) -> AppResult<()> {
    ActiveModel {
        product_id: Set(product_id),
        quantity: Set(0),
        discount: Set(0.0),
        ..Default::default()
    }
    .insert(conn)
    .await?;
    Ok(())
}

/// Take one unit of a product out of stock. Never goes below zero.
pub(crate) async fn take_one<C: ConnectionTrait>(conn: &C, product_id: i64) -> AppResult<bool> {
    let result = StockEntity::update_many()
        .col_expr(
            stock::Column::Quantity,
            Expr::col(stock::Column::Quantity).sub(1),
        )
        .filter(stock::Column::ProductId.eq(product_id))
        .filter(stock::Column::Quantity.gt(0))
        .exec(conn)
        .await?;

    Ok(result.rows_affected > 0)
}

/// Remove the stock row of a product.
pub(crate) async fn delete_for_product<C: ConnectionTrait>(
    conn: &C,
    product_id: i64,
) -> AppResult<()> {
    StockEntity::delete_many()
        .filter(stock::Column::ProductId.eq(product_id))
        .exec(conn)
        .await?;
    Ok(())
}
