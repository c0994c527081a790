//! Cosmetic and wardrobe repository.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{
    sea_query::{Expr, OnConflict},
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use uuid::Uuid;

use super::entities::cosmetic::Entity as CosmeticEntity;
use super::entities::wardrobe::{self, Entity as WardrobeEntity};
use crate::domain::{Cosmetic, WardrobeItem};
use crate::errors::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CosmeticRepository: Send + Sync {
    async fn find(&self, id: i64) -> AppResult<Option<Cosmetic>>;

    /// Cosmetics owned by a player, with their equipped flag
    async fn wardrobe(&self, player: Uuid) -> AppResult<Vec<WardrobeItem>>;

    /// Mark exactly `cosmetic_ids` as equipped in the player's wardrobe
    async fn set_equipped(&self, player: Uuid, cosmetic_ids: Vec<i64>) -> AppResult<()>;

    async fn unequip(&self, player: Uuid, cosmetic_id: i64) -> AppResult<()>;

    /// Ids of the cosmetics a player has equipped
    async fn equipped(&self, player: Uuid) -> AppResult<Vec<i64>>;

    /// Equipped cosmetic ids per player; players with nothing equipped are absent
    async fn equipped_for(&self, players: Vec<Uuid>) -> AppResult<HashMap<Uuid, Vec<i64>>>;
}

pub struct CosmeticStore {
    db: DatabaseConnection,
}

impl CosmeticStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CosmeticRepository for CosmeticStore {
    async fn find(&self, id: i64) -> AppResult<Option<Cosmetic>> {
        let result = CosmeticEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Cosmetic::from))
    }

    async fn wardrobe(&self, player: Uuid) -> AppResult<Vec<WardrobeItem>> {
        let rows = WardrobeEntity::find()
            .filter(wardrobe::Column::PlayerId.eq(player))
            .find_also_related(CosmeticEntity)
            .order_by_asc(wardrobe::Column::CosmeticId)
            .all(&self.db)
            .await?;

        // Grants for virtual products without a cosmetic row are skipped
        Ok(rows
            .into_iter()
            .filter_map(|(entry, cosmetic)| cosmetic.map(|c| wardrobe::to_item(entry, c)))
            .collect())
    }

    async fn set_equipped(&self, player: Uuid, cosmetic_ids: Vec<i64>) -> AppResult<()> {
        let txn = self.db.begin().await?;

        WardrobeEntity::update_many()
            .col_expr(wardrobe::Column::Equipped, Expr::value(false))
            .filter(wardrobe::Column::PlayerId.eq(player))
            .exec(&txn)
            .await?;

        if !cosmetic_ids.is_empty() {
            WardrobeEntity::update_many()
                .col_expr(wardrobe::Column::Equipped, Expr::value(true))
                .filter(wardrobe::Column::PlayerId.eq(player))
                .filter(wardrobe::Column::CosmeticId.is_in(cosmetic_ids))
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;
        Ok(())
    }

    async fn unequip(&self, player: Uuid, cosmetic_id: i64) -> AppResult<()> {
        WardrobeEntity::update_many()
            .col_expr(wardrobe::Column::Equipped, Expr::value(false))
            .filter(wardrobe::Column::PlayerId.eq(player))
            .filter(wardrobe::Column::CosmeticId.eq(cosmetic_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn equipped(&self, player: Uuid) -> AppResult<Vec<i64>> {
        let rows = WardrobeEntity::find()
            .filter(wardrobe::Column::PlayerId.eq(player))
            .filter(wardrobe::Column::Equipped.eq(true))
            .order_by_asc(wardrobe::Column::CosmeticId)
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(|row| row.cosmetic_id).collect())
    }

    async fn equipped_for(&self, players: Vec<Uuid>) -> AppResult<HashMap<Uuid, Vec<i64>>> {
        if players.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = WardrobeEntity::find()
            .filter(wardrobe::Column::PlayerId.is_in(players))
            .filter(wardrobe::Column::Equipped.eq(true))
            .order_by_asc(wardrobe::Column::CosmeticId)
            .all(&self.db)
            .await?;

        let mut equipped: HashMap<Uuid, Vec<i64>> = HashMap::new();
        for row in rows {
            equipped.entry(row.player_id).or_default().push(row.cosmetic_id);
        }
        Ok(equipped)
    }
}

/// Add a cosmetic to a player's wardrobe, unequipped. Owning it already is a no-op.
pub(crate) async fn grant<C: ConnectionTrait>(
    conn: &C,
    player: Uuid,
    cosmetic_id: i64,
) -> AppResult<()> {
    let entry = wardrobe::ActiveModel {
        player_id: Set(player),
        cosmetic_id: Set(cosmetic_id),
        equipped: Set(false),
    };

    WardrobeEntity::insert(entry)
        .on_conflict(
            OnConflict::columns([wardrobe::Column::PlayerId, wardrobe::Column::CosmeticId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;
    Ok(())
}
