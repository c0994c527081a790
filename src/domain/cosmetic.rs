//! In-game cosmetics and player wardrobes.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cosmetic {
    pub id: i64,
    pub name: String,
    /// Slot the cosmetic occupies; one cosmetic per type can be equipped
    pub kind: String,
    pub model: Option<String>,
    pub script: Option<String>,
    pub preview_image: Option<String>,
}

/// Rendering data handed to the game client
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CosmeticData {
    pub model: Option<String>,
    pub script: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
}

impl From<Cosmetic> for CosmeticData {
    fn from(cosmetic: Cosmetic) -> Self {
        Self {
            model: cosmetic.model,
            script: cosmetic.script,
            kind: cosmetic.kind,
        }
    }
}

/// A cosmetic owned by a player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WardrobeItem {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub equipped: bool,
    pub preview_image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EquippedCosmetics {
    pub equipped_cosmetics: Vec<i64>,
}

/// Cosmetics equipped after putting on `cosmetic_id`: whatever is already
/// equipped in other slots, plus the new one.
pub fn resolve_equipped(
    wardrobe: &[WardrobeItem],
    cosmetic_id: i64,
    kind: &str,
) -> AppResult<Vec<i64>> {
    if !wardrobe.iter().any(|item| item.id == cosmetic_id) {
        return Err(AppError::bad_request("Cosmetic not in wardrobe"));
    }

    let mut equipped: Vec<i64> = wardrobe
        .iter()
        .filter(|item| item.equipped && item.kind != kind && item.id != cosmetic_id)
        .map(|item| item.id)
        .collect();
    equipped.push(cosmetic_id);
    Ok(equipped)
}
