//! Player accounts (game accounts that sign in through login links).

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{ROLE_COLLABORATOR, ROLE_DEFAULT, ROLE_KRYEITOR, ROLE_STAFF};
use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayerRole {
    Default,
    Kryeitor,
    Collaborator,
    Staff,
}

impl PlayerRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerRole::Default => ROLE_DEFAULT,
            PlayerRole::Kryeitor => ROLE_KRYEITOR,
            PlayerRole::Collaborator => ROLE_COLLABORATOR,
            PlayerRole::Staff => ROLE_STAFF,
        }
    }
}

impl FromStr for PlayerRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_DEFAULT => Ok(PlayerRole::Default),
            ROLE_KRYEITOR => Ok(PlayerRole::Kryeitor),
            ROLE_COLLABORATOR => Ok(PlayerRole::Collaborator),
            ROLE_STAFF => Ok(PlayerRole::Staff),
            other => Err(AppError::bad_request(format!("Unknown role: {}", other))),
        }
    }
}

impl std::fmt::Display for PlayerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a role update combines with the current roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RoleAction {
    Add,
    Remove,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub uuid: Uuid,
    pub username: String,
    pub creation: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub roles: Vec<PlayerRole>,
    pub stats: serde_json::Value,
}

impl Player {
    /// Add or remove roles. Adding never duplicates a role.
    pub fn apply_roles(&mut self, action: RoleAction, roles: &[PlayerRole]) {
        match action {
            RoleAction::Add => {
                for role in roles {
                    if !self.roles.contains(role) {
                        self.roles.push(*role);
                    }
                }
            }
            RoleAction::Remove => self.roles.retain(|role| !roles.contains(role)),
        }
    }
}

/// Account payload returned to the storefront
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AccountResponse {
    pub uuid: Uuid,
    pub username: String,
    pub creation: DateTime<Utc>,
    #[serde(rename = "last-seen")]
    pub last_seen: DateTime<Utc>,
    pub roles: Vec<PlayerRole>,
    #[schema(value_type = Object)]
    pub stats: serde_json::Value,
    /// Only present right after a login link is redeemed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl AccountResponse {
    pub fn with_token(player: Player, token: String) -> Self {
        Self {
            token: Some(token),
            ..Self::from(player)
        }
    }
}

impl From<Player> for AccountResponse {
    fn from(player: Player) -> Self {
        Self {
            uuid: player.uuid,
            username: player.username,
            creation: player.creation,
            last_seen: player.last_seen,
            roles: player.roles,
            stats: player.stats,
            token: None,
        }
    }
}
