//! Unit of Work pattern implementation.
//!
//! Centralizes access to every repository behind one injectable handle.
//! Multi-table writes open their transaction inside the repository that
//! owns them (see `ProductRepository::create` and
//! `OrderRepository::record_checkout`).

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::repositories::{
    AdminRepository, AdminStore, CosmeticRepository, CosmeticStore, OrderRepository, OrderStore,
    PlayerRepository, PlayerStore, ProductRepository, ProductStore, StockRepository, StockStore,
};

/// Unit of Work trait for dependency injection.
///
/// Services hold a `UnitOfWork` instead of individual repositories. Tests
/// plug in a struct handing out `Mock*Repository` instances.
pub trait UnitOfWork: Send + Sync {
    fn admins(&self) -> Arc<dyn AdminRepository>;

    fn players(&self) -> Arc<dyn PlayerRepository>;

    fn products(&self) -> Arc<dyn ProductRepository>;

    fn stocks(&self) -> Arc<dyn StockRepository>;

    fn orders(&self) -> Arc<dyn OrderRepository>;

    fn cosmetics(&self) -> Arc<dyn CosmeticRepository>;
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    admin_repo: Arc<AdminStore>,
    player_repo: Arc<PlayerStore>,
    product_repo: Arc<ProductStore>,
    stock_repo: Arc<StockStore>,
    order_repo: Arc<OrderStore>,
    cosmetic_repo: Arc<CosmeticStore>,
}

impl Persistence {
    /// Create new UnitOfWork instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            admin_repo: Arc::new(AdminStore::new(db.clone())),
            player_repo: Arc::new(PlayerStore::new(db.clone())),
            product_repo: Arc::new(ProductStore::new(db.clone())),
            stock_repo: Arc::new(StockStore::new(db.clone())),
            order_repo: Arc::new(OrderStore::new(db.clone())),
            cosmetic_repo: Arc::new(CosmeticStore::new(db)),
        }
    }
}

impl UnitOfWork for Persistence {
    fn admins(&self) -> Arc<dyn AdminRepository> {
        self.admin_repo.clone()
    }

    fn players(&self) -> Arc<dyn PlayerRepository> {
        self.player_repo.clone()
    }

    fn products(&self) -> Arc<dyn ProductRepository> {
        self.product_repo.clone()
    }

    fn stocks(&self) -> Arc<dyn StockRepository> {
        self.stock_repo.clone()
    }

    fn orders(&self) -> Arc<dyn OrderRepository> {
        self.order_repo.clone()
    }

    fn cosmetics(&self) -> Arc<dyn CosmeticRepository> {
        self.cosmetic_repo.clone()
    }
}
