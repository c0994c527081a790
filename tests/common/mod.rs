//! Shared fixtures for service tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use merch_api::domain::{Order, OrderStatus, Product, Stock};
use merch_api::infra::{
    AdminRepository, CosmeticRepository, MockAdminRepository, MockCosmeticRepository,
    MockOrderRepository, MockPlayerRepository, MockProductRepository, MockStockRepository,
    OrderRepository, PlayerRepository, ProductRepository, StockRepository, UnitOfWork,
};

/// UnitOfWork handing out mock repositories. Repositories a test does not
/// configure have no expectations and panic when called.
#[derive(Default)]
pub struct TestUnitOfWork {
    pub admins: MockAdminRepository,
    pub players: MockPlayerRepository,
    pub products: MockProductRepository,
    pub stocks: MockStockRepository,
    pub orders: MockOrderRepository,
    pub cosmetics: MockCosmeticRepository,
}

impl TestUnitOfWork {
    pub fn build(self) -> Arc<BuiltUnitOfWork> {
        Arc::new(BuiltUnitOfWork {
            admins: Arc::new(self.admins),
            players: Arc::new(self.players),
            products: Arc::new(self.products),
            stocks: Arc::new(self.stocks),
            orders: Arc::new(self.orders),
            cosmetics: Arc::new(self.cosmetics),
        })
    }
}

pub struct BuiltUnitOfWork {
    admins: Arc<MockAdminRepository>,
    players: Arc<MockPlayerRepository>,
    products: Arc<MockProductRepository>,
    stocks: Arc<MockStockRepository>,
    orders: Arc<MockOrderRepository>,
    cosmetics: Arc<MockCosmeticRepository>,
}

impl UnitOfWork for BuiltUnitOfWork {
    fn admins(&self) -> Arc<dyn AdminRepository> {
        self.admins.clone()
    }

    fn players(&self) -> Arc<dyn PlayerRepository> {
        self.players.clone()
    }

    fn products(&self) -> Arc<dyn ProductRepository> {
        self.products.clone()
    }

    fn stocks(&self) -> Arc<dyn StockRepository> {
        self.stocks.clone()
    }

    fn orders(&self) -> Arc<dyn OrderRepository> {
        self.orders.clone()
    }

    fn cosmetics(&self) -> Arc<dyn CosmeticRepository> {
        self.cosmetics.clone()
    }
}

pub fn product(id: i64, name: &str, price: i64, is_virtual: bool) -> Product {
    let now = Utc::now();
    Product {
        id,
        name: name.to_string(),
        description: None,
        price,
        size: None,
        color: None,
        material: None,
        is_virtual,
        listed: true,
        created_at: now,
        updated_at: now,
    }
}

pub fn stock(product_id: i64, quantity: i64) -> Stock {
    Stock {
        id: product_id,
        product_id,
        quantity,
        discount: 0.0,
    }
}

pub fn order(id: i64, uuid: Option<Uuid>, transaction: &str) -> Order {
    let now = Utc::now();
    Order {
        id,
        uuid,
        cart: vec![1],
        destination: "Main St 1".to_string(),
        phone: String::new(),
        email: "steve@example.com".to_string(),
        status: OrderStatus::Pending,
        transaction: Some(transaction.to_string()),
        created_at: now,
        updated_at: now,
    }
}
