//! Order database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{Order, OrderStatus};
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub uuid: Option<Uuid>,
    /// One product id per unit bought
    pub cart: Vec<i64>,
    pub destination: String,
    pub phone: String,
    pub email: String,
    pub status: String,
    pub transaction: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Order {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let status: OrderStatus = model.status.parse().map_err(|_| {
            AppError::internal(format!(
                "Order {} has unknown status {}",
                model.id, model.status
            ))
        })?;

        Ok(Order {
            id: model.id,
            uuid: model.uuid,
            cart: model.cart,
            destination: model.destination,
            phone: model.phone,
            email: model.email,
            status,
            transaction: model.transaction,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
