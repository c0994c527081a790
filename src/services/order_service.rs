//! Order administration and the player's order history.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Order, OrderStatus};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

#[async_trait]
pub trait OrderService: Send + Sync {
    async fn by_player(&self, uuid: Uuid) -> AppResult<Vec<Order>>;

    async fn get(&self, id: i64) -> AppResult<Order>;

    async fn list(&self) -> AppResult<Vec<Order>>;

    async fn delete(&self, id: i64) -> AppResult<()>;

    async fn update_status(&self, id: i64, status: OrderStatus) -> AppResult<Order>;
}

pub struct OrderManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> OrderManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> OrderService for OrderManager<U> {
    async fn by_player(&self, uuid: Uuid) -> AppResult<Vec<Order>> {
        self.uow.orders().list_by_player(uuid).await
    }

    async fn get(&self, id: i64) -> AppResult<Order> {
        self.uow.orders().find_by_id(id).await?.ok_or_not_found("Order")
    }

    async fn list(&self) -> AppResult<Vec<Order>> {
        self.uow.orders().list().await
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        if !self.uow.orders().delete(id).await? {
            return Err(AppError::not_found("Order"));
        }
        tracing::info!(order_id = id, "Order deleted");
        Ok(())
    }

    async fn update_status(&self, id: i64, status: OrderStatus) -> AppResult<Order> {
        let order = self
            .uow
            .orders()
            .update_status(id, status)
            .await?
            .ok_or_not_found("Order")?;

        tracing::info!(order_id = id, status = %status, "Order status updated");
        Ok(order)
    }
}
