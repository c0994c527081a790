//! Cosmetic database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::Cosmetic;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "cosmetics")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    #[sea_orm(column_name = "type")]
    pub kind: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub model: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub script: Option<String>,
    pub preview_image: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Cosmetic {
    fn from(model: Model) -> Self {
        Cosmetic {
            id: model.id,
            name: model.name,
            kind: model.kind,
            model: model.model,
            script: model.script,
            preview_image: model.preview_image,
        }
    }
}
