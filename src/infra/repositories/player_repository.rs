//! Player account repository.

use async_trait::async_trait;
use sea_orm::{
    sea_query::OnConflict, ActiveModelTrait, DatabaseConnection, EntityTrait, Set,
};
use uuid::Uuid;

use super::entities::player::{self, ActiveModel, Entity as PlayerEntity};
use crate::config::ROLE_DEFAULT;
use crate::domain::{Player, PlayerRole};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PlayerRepository: Send + Sync {
    async fn find(&self, uuid: Uuid) -> AppResult<Option<Player>>;

    /// Create the player with default role and empty stats, or refresh the
    /// username and last-seen time of an existing one.
    async fn upsert(&self, uuid: Uuid, username: String) -> AppResult<Player>;

    /// Bump the last-seen time
    async fn touch(&self, uuid: Uuid) -> AppResult<()>;

    /// Replace the player's roles. `None` when the player does not exist.
    async fn set_roles(&self, uuid: Uuid, roles: Vec<PlayerRole>) -> AppResult<Option<Player>>;
}

pub struct PlayerStore {
    db: DatabaseConnection,
}

impl PlayerStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PlayerRepository for PlayerStore {
    async fn find(&self, uuid: Uuid) -> AppResult<Option<Player>> {
        let result = PlayerEntity::find_by_id(uuid).one(&self.db).await?;
        Ok(result.map(Player::from))
    }

    async fn upsert(&self, uuid: Uuid, username: String) -> AppResult<Player> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            uuid: Set(uuid),
            username: Set(username),
            creation: Set(now),
            last_seen: Set(now),
            roles: Set(vec![ROLE_DEFAULT.to_string()]),
            stats: Set(serde_json::json!({})),
        };

        PlayerEntity::insert(active_model)
            .on_conflict(
                OnConflict::column(player::Column::Uuid)
                    .update_columns([player::Column::Username, player::Column::LastSeen])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        PlayerEntity::find_by_id(uuid)
            .one(&self.db)
            .await?
            .map(Player::from)
            .ok_or_else(|| AppError::internal(format!("Player {} missing after upsert", uuid)))
    }

    async fn touch(&self, uuid: Uuid) -> AppResult<()> {
        if let Some(existing) = PlayerEntity::find_by_id(uuid).one(&self.db).await? {
            let mut active: ActiveModel = existing.into();
            active.last_seen = Set(chrono::Utc::now());
            active.update(&self.db).await?;
        }
        Ok(())
    }

    async fn set_roles(&self, uuid: Uuid, roles: Vec<PlayerRole>) -> AppResult<Option<Player>> {
        let Some(existing) = PlayerEntity::find_by_id(uuid).one(&self.db).await? else {
            return Ok(None);
        };

        let mut active: ActiveModel = existing.into();
        active.roles = Set(roles.iter().map(|role| role.as_str().to_string()).collect());

        let model = active.update(&self.db).await.map_err(AppError::from)?;
        Ok(Some(Player::from(model)))
    }
}
