//! Admin database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{Admin, HashedPassword};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "admins")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub username: String,
    /// Argon2 hash
    pub password: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Admin {
    fn from(model: Model) -> Self {
        Admin {
            id: model.id,
            username: model.username,
            password: HashedPassword::from_stored(model.password),
        }
    }
}
