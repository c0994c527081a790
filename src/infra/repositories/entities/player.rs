//! Player account entity (`users` table) for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{Player, PlayerRole};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub uuid: Uuid,
    pub username: String,
    pub creation: DateTimeUtc,
    pub last_seen: DateTimeUtc,
    pub roles: Vec<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub stats: Json,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Player {
    fn from(model: Model) -> Self {
        let roles = model
            .roles
            .iter()
            .filter_map(|role| match role.parse::<PlayerRole>() {
                Ok(role) => Some(role),
                Err(_) => {
                    tracing::warn!(player = %model.uuid, role = %role, "Skipping unknown role");
                    None
                }
            })
            .collect();

        Player {
            uuid: model.uuid,
            username: model.username,
            creation: model.creation,
            last_seen: model.last_seen,
            roles,
            stats: model.stats,
        }
    }
}
