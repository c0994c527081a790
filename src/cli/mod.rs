//! CLI module - Command-line interface for the application.
//!
//! - `serve` - Start the HTTP server (default)
//! - `migrate` - Database migrations
//! - `admin` - Admin account management

pub mod args;

pub use args::{Cli, Commands};
