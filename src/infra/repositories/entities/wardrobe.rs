//! Wardrobe ownership entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::WardrobeItem;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "wardrobes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub player_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub cosmetic_id: i64,
    pub equipped: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cosmetic::Entity",
        from = "Column::CosmeticId",
        to = "super::cosmetic::Column::Id"
    )]
    Cosmetic,
}

impl Related<super::cosmetic::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cosmetic.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Join a wardrobe row with its cosmetic.
pub fn to_item(entry: Model, cosmetic: super::cosmetic::Model) -> WardrobeItem {
    WardrobeItem {
        id: cosmetic.id,
        name: cosmetic.name,
        kind: cosmetic.kind,
        equipped: entry.equipped,
        preview_image: cosmetic.preview_image,
    }
}
