//! Merch API - storefront backend for the Kryeit server shop
//!
//! Sells merch through Stripe checkout, keeps stock and orders, links
//! Minecraft players to web sessions and serves their cosmetics to the
//! game server.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Core business entities and logic
//! - **services**: Application use cases and business logic
//! - **infra**: Database, Redis, image storage, Stripe and Modrinth
//! - **api**: HTTP handlers, middleware, and routes
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//!
//! # Create an admin panel account
//! cargo run -- admin create --username shopkeeper --password 'correct horse'
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;

pub use api::AppState;
pub use config::Config;
pub use errors::{AppError, AppResult};
pub use infra::Cache;
