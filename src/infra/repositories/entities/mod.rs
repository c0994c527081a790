//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod admin;
pub mod cosmetic;
pub mod order;
pub mod player;
pub mod product;
pub mod stock;
pub mod wardrobe;
