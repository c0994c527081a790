//! Admin panel accounts and sessions.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use super::auth_service::{decode_token, issue_token, token_window, AdminClaims};
use crate::config::Config;
use crate::domain::{Admin, HashedPassword};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

/// Token returned after an admin logs in
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminLogin {
    pub token: String,
    #[schema(example = "shopkeeper")]
    pub username: String,
}

#[async_trait]
pub trait AdminService: Send + Sync {
    /// Create the first admin. Refused once any admin exists.
    async fn register(&self, username: String, password: String) -> AppResult<Admin>;

    /// Create an admin unconditionally (CLI only)
    async fn create(&self, username: String, password: String) -> AppResult<Admin>;

    async fn login(&self, username: String, password: String) -> AppResult<AdminLogin>;

    /// Resolve a session token to an existing admin
    async fn authenticate(&self, token: &str) -> AppResult<Admin>;
}

pub struct AdminManager<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
}

impl<U: UnitOfWork> AdminManager<U> {
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self { uow, config }
    }
}

#[async_trait]
impl<U: UnitOfWork> AdminService for AdminManager<U> {
    async fn register(&self, username: String, password: String) -> AppResult<Admin> {
        if self.uow.admins().exists_any().await? {
            return Err(AppError::bad_request("An admin account already exists"));
        }
        self.create(username, password).await
    }

    async fn create(&self, username: String, password: String) -> AppResult<Admin> {
        let username = username.trim().to_string();
        if username.is_empty() {
            return Err(AppError::validation("Username is required"));
        }

        let hashed = HashedPassword::create(&password)?;
        let admin = self.uow.admins().create(username, hashed).await?;

        tracing::info!(admin_id = admin.id, username = %admin.username, "Admin registered");
        Ok(admin)
    }

    async fn login(&self, username: String, password: String) -> AppResult<AdminLogin> {
        let admin = self.uow.admins().find_by_username(username.trim()).await?;

        // Verify against a stand-in hash for unknown users so both paths take as long
        let matches = match &admin {
            Some(admin) => admin.password.matches(&password),
            None => HashedPassword::unmatchable().matches(&password),
        };

        let admin = match admin {
            Some(admin) if matches => admin,
            _ => return Err(AppError::InvalidCredentials),
        };

        let (iat, exp) = token_window();
        let token = issue_token(
            &AdminClaims {
                admin_id: admin.id,
                exp,
                iat,
            },
            self.config.admin_jwt_secret_bytes(),
        )?;

        Ok(AdminLogin {
            token,
            username: admin.username,
        })
    }

    async fn authenticate(&self, token: &str) -> AppResult<Admin> {
        let claims: AdminClaims = decode_token(token, self.config.admin_jwt_secret_bytes())?;
        self.uow
            .admins()
            .find_by_id(claims.admin_id)
            .await?
            .ok_or(AppError::Unauthorized)
    }
}
