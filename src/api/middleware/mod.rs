//! API middleware.

mod auth;
mod rate_limit;

pub use auth::{
    admin_auth_middleware, cosmetic_auth_middleware, player_auth_middleware, session_token,
    CurrentAdmin, CurrentPlayer,
};
pub use rate_limit::login_rate_limit_middleware;
