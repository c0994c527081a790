//! Stock database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::Stock;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "stocks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub product_id: i64,
    pub quantity: i64,
    pub discount: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_delete = "Cascade"
    )]
    Product,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Stock {
    fn from(model: Model) -> Self {
        Stock {
            id: model.id,
            product_id: model.product_id,
            quantity: model.quantity,
            discount: model.discount,
        }
    }
}
