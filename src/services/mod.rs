//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! storefront use cases. They reach the database only through the
//! Unit of Work, and the outside world only through infra traits.

mod admin_service;
mod auth_service;
pub mod container;
mod cosmetic_service;
mod image_service;
mod modpack_service;
mod order_service;
mod payment_service;
mod player_service;
mod product_service;
mod stock_service;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use admin_service::{AdminLogin, AdminManager, AdminService};
pub use auth_service::{AdminClaims, AuthService, Authenticator, LoginLink, PlayerClaims};
pub use cosmetic_service::{CosmeticManager, CosmeticService};
pub use image_service::{ImageManager, ImageService};
pub use modpack_service::{ModpackBuilder, ModpackService};
pub use order_service::{OrderManager, OrderService};
pub use payment_service::{CheckoutContact, CheckoutResponse, PaymentManager, PaymentService};
pub use player_service::{PlayerManager, PlayerService};
pub use product_service::{ProductManager, ProductService};
pub use stock_service::{StockManager, StockService};

// Parallel execution utilities
pub use container::parallel;

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
