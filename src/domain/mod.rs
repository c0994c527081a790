//! Domain layer - Core business entities and logic
//!
//! Storefront products and their catalog layout, stock, orders and carts,
//! player accounts, admin accounts and in-game cosmetics. Nothing here
//! touches the database or the network.

pub mod admin;
pub mod catalog;
pub mod cosmetic;
pub mod order;
pub mod password;
pub mod player;
pub mod product;
pub mod stock;

pub use admin::{Admin, AdminResponse};
pub use catalog::{build_catalog, build_entry, CatalogProduct, ColorVariant, SizeDetail, SizeVariant};
pub use cosmetic::{resolve_equipped, Cosmetic, CosmeticData, EquippedCosmetics, WardrobeItem};
pub use order::{Cart, CartItem, CheckoutRecord, NewOrder, Order, OrderStatus};
pub use password::HashedPassword;
pub use player::{AccountResponse, Player, PlayerRole, RoleAction};
pub use product::{validate_product_name, NewProduct, Product, ProductChanges};
pub use stock::{Stock, StockUpdate};
