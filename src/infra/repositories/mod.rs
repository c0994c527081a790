//! Repository layer - Data access abstraction
//!
//! Each repository trait hides the SeaORM queries for one aggregate.
//! Writes that touch several tables open their own transaction.

mod admin_repository;
mod cosmetic_repository;
pub(crate) mod entities;
mod order_repository;
mod player_repository;
mod product_repository;
mod stock_repository;

pub use admin_repository::{AdminRepository, AdminStore};
pub use cosmetic_repository::{CosmeticRepository, CosmeticStore};
pub use order_repository::{OrderRepository, OrderStore};
pub use player_repository::{PlayerRepository, PlayerStore};
pub use product_repository::{ProductRepository, ProductStore};
pub use stock_repository::{StockRepository, StockStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use admin_repository::MockAdminRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use cosmetic_repository::MockCosmeticRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use order_repository::MockOrderRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use player_repository::MockPlayerRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use product_repository::MockProductRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use stock_repository::MockStockRepository;

use sea_orm::{DbErr, SqlErr};

use crate::errors::AppError;

/// Map a unique constraint violation to a conflict on `entity`.
pub(crate) fn conflict_on_duplicate(err: DbErr, entity: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::conflict(entity),
        _ => AppError::from(err),
    }
}
