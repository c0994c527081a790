//! Player account operations.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{AccountResponse, PlayerRole, RoleAction};
use crate::errors::{AppResult, OptionExt};
use crate::infra::UnitOfWork;

#[async_trait]
pub trait PlayerService: Send + Sync {
    /// Account of the signed-in player. Refreshes last-seen.
    async fn account(&self, uuid: Uuid) -> AppResult<AccountResponse>;

    async fn roles(&self, uuid: Uuid) -> AppResult<Vec<PlayerRole>>;

    async fn update_roles(
        &self,
        uuid: Uuid,
        action: RoleAction,
        roles: Vec<PlayerRole>,
    ) -> AppResult<Vec<PlayerRole>>;
}

pub struct PlayerManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> PlayerManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> PlayerService for PlayerManager<U> {
    async fn account(&self, uuid: Uuid) -> AppResult<AccountResponse> {
        let player = self.uow.players().find(uuid).await?.ok_or_not_found("Player")?;
        self.uow.players().touch(uuid).await?;
        Ok(AccountResponse::from(player))
    }

    async fn roles(&self, uuid: Uuid) -> AppResult<Vec<PlayerRole>> {
        let player = self.uow.players().find(uuid).await?.ok_or_not_found("Player")?;
        Ok(player.roles)
    }

    async fn update_roles(
        &self,
        uuid: Uuid,
        action: RoleAction,
        roles: Vec<PlayerRole>,
    ) -> AppResult<Vec<PlayerRole>> {
        let mut player = self.uow.players().find(uuid).await?.ok_or_not_found("Player")?;
        player.apply_roles(action, &roles);

        let updated = self
            .uow
            .players()
            .set_roles(uuid, player.roles)
            .await?
            .ok_or_not_found("Player")?;

        tracing::info!(player = %uuid, ?action, roles = ?updated.roles, "Player roles updated");
        Ok(updated.roles)
    }
}
