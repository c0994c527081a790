//! Infrastructure layer - External systems integration
//!
//! Database access, the Redis cache, product image storage and the
//! Stripe and Modrinth clients.

pub mod cache;
pub mod crypto;
pub mod db;
pub mod images;
pub mod modrinth;
pub mod repositories;
pub mod stripe;
pub mod unit_of_work;

pub use cache::{Cache, CatalogCache};
pub use crypto::{LinkCipher, LinkPayload};
pub use db::{Database, Migrator};
pub use images::ImageStore;
pub use modrinth::{ModrinthClient, PackSource};
pub use repositories::{
    AdminRepository, AdminStore, CosmeticRepository, CosmeticStore, OrderRepository, OrderStore,
    PlayerRepository, PlayerStore, ProductRepository, ProductStore, StockRepository, StockStore,
};
pub use stripe::{CheckoutLine, CheckoutRequest, CheckoutSession, PaymentGateway, StripeClient, WebhookEvent};
pub use unit_of_work::{Persistence, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use cache::MockCatalogCache;
#[cfg(any(test, feature = "test-utils"))]
pub use modrinth::MockPackSource;
#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{
    MockAdminRepository, MockCosmeticRepository, MockOrderRepository, MockPlayerRepository,
    MockProductRepository, MockStockRepository,
};
#[cfg(any(test, feature = "test-utils"))]
pub use stripe::MockPaymentGateway;
