//! Order repository, including checkout fulfilment.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use uuid::Uuid;

use super::entities::order::{self, ActiveModel, Entity as OrderEntity};
use super::{conflict_on_duplicate, cosmetic_repository, stock_repository};
use crate::domain::{CheckoutRecord, Order, OrderStatus};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Order>>;

    /// Order paid by the given checkout session
    async fn find_by_transaction(&self, transaction: &str) -> AppResult<Option<Order>>;

    /// Every order, newest first
    async fn list(&self) -> AppResult<Vec<Order>>;

    async fn list_by_player(&self, uuid: Uuid) -> AppResult<Vec<Order>>;

    /// `None` when the order does not exist
    async fn update_status(&self, id: i64, status: OrderStatus) -> AppResult<Option<Order>>;

    async fn delete(&self, id: i64) -> AppResult<bool>;

    /// Insert the order, take the bought units out of stock and grant
    /// virtual products, all in one transaction.
    async fn record_checkout(&self, record: CheckoutRecord) -> AppResult<Order>;
}

pub struct OrderStore {
    db: DatabaseConnection,
}

impl OrderStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_orders(models: Vec<order::Model>) -> AppResult<Vec<Order>> {
    models.into_iter().map(Order::try_from).collect()
}

#[async_trait]
impl OrderRepository for OrderStore {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Order>> {
        OrderEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Order::try_from)
            .transpose()
    }

    async fn find_by_transaction(&self, transaction: &str) -> AppResult<Option<Order>> {
        OrderEntity::find()
            .filter(order::Column::Transaction.eq(transaction))
            .one(&self.db)
            .await?
            .map(Order::try_from)
            .transpose()
    }

    async fn list(&self) -> AppResult<Vec<Order>> {
        let models = OrderEntity::find()
            .order_by_desc(order::Column::CreatedAt)
            .all(&self.db)
            .await?;
        to_orders(models)
    }

    async fn list_by_player(&self, uuid: Uuid) -> AppResult<Vec<Order>> {
        let models = OrderEntity::find()
            .filter(order::Column::Uuid.eq(uuid))
            .order_by_desc(order::Column::CreatedAt)
            .all(&self.db)
            .await?;
        to_orders(models)
    }

    async fn update_status(&self, id: i64, status: OrderStatus) -> AppResult<Option<Order>> {
        let Some(existing) = OrderEntity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut active: ActiveModel = existing.into();
        active.status = Set(status.as_str().to_string());
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await.map_err(AppError::from)?;
        Order::try_from(model).map(Some)
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = OrderEntity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn record_checkout(&self, record: CheckoutRecord) -> AppResult<Order> {
        let CheckoutRecord {
            order,
            stock_reductions,
            wardrobe_grants,
        } = record;
        let buyer = order.uuid;
        let now = chrono::Utc::now();

        let txn = self.db.begin().await?;

        let model = ActiveModel {
            uuid: Set(order.uuid),
            cart: Set(order.cart),
            destination: Set(order.destination),
            phone: Set(order.phone),
            email: Set(order.email),
            status: Set(order.status.as_str().to_string()),
            transaction: Set(order.transaction),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| conflict_on_duplicate(e, "Order"))?;

        for product_id in stock_reductions {
            if !stock_repository::take_one(&txn, product_id).await? {
                tracing::warn!(product_id, order_id = model.id, "Stock already at zero");
            }
        }

        if let Some(player) = buyer {
            for cosmetic_id in wardrobe_grants {
                cosmetic_repository::grant(&txn, player, cosmetic_id).await?;
            }
        } else if !wardrobe_grants.is_empty() {
            tracing::warn!(order_id = model.id, "Virtual products bought without a player");
        }

        txn.commit().await?;
        Order::try_from(model)
    }
}
