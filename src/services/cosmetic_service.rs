//! In-game cosmetics for the game server.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{resolve_equipped, CosmeticData, EquippedCosmetics, WardrobeItem};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

#[async_trait]
pub trait CosmeticService: Send + Sync {
    async fn get(&self, id: i64) -> AppResult<CosmeticData>;

    /// Equip a cosmetic, replacing whatever occupies the same slot
    async fn equip(&self, player: Uuid, cosmetic_id: i64) -> AppResult<EquippedCosmetics>;

    async fn unequip(&self, player: Uuid, cosmetic_id: i64) -> AppResult<EquippedCosmetics>;

    async fn wardrobe(&self, player: Uuid) -> AppResult<Vec<WardrobeItem>>;

    async fn equipped(&self, players: Vec<Uuid>) -> AppResult<HashMap<Uuid, Vec<i64>>>;
}

pub struct CosmeticManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> CosmeticManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> CosmeticService for CosmeticManager<U> {
    async fn get(&self, id: i64) -> AppResult<CosmeticData> {
        let cosmetic = self.uow.cosmetics().find(id).await?.ok_or_not_found("Cosmetic")?;
        Ok(CosmeticData::from(cosmetic))
    }

    async fn equip(&self, player: Uuid, cosmetic_id: i64) -> AppResult<EquippedCosmetics> {
        let cosmetic = self
            .uow
            .cosmetics()
            .find(cosmetic_id)
            .await?
            .ok_or_else(|| AppError::bad_request("Unknown cosmetic"))?;

        let wardrobe = self.uow.cosmetics().wardrobe(player).await?;
        let equipped = resolve_equipped(&wardrobe, cosmetic.id, &cosmetic.kind)?;

        self.uow
            .cosmetics()
            .set_equipped(player, equipped.clone())
            .await?;

        tracing::debug!(player = %player, cosmetic_id, "Cosmetic equipped");
        Ok(EquippedCosmetics {
            equipped_cosmetics: equipped,
        })
    }

    async fn unequip(&self, player: Uuid, cosmetic_id: i64) -> AppResult<EquippedCosmetics> {
        self.uow.cosmetics().unequip(player, cosmetic_id).await?;
        let equipped = self.uow.cosmetics().equipped(player).await?;
        Ok(EquippedCosmetics {
            equipped_cosmetics: equipped,
        })
    }

    async fn wardrobe(&self, player: Uuid) -> AppResult<Vec<WardrobeItem>> {
        self.uow.cosmetics().wardrobe(player).await
    }

    async fn equipped(&self, players: Vec<Uuid>) -> AppResult<HashMap<Uuid, Vec<i64>>> {
        self.uow.cosmetics().equipped_for(players).await
    }
}
