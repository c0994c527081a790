//! Admin account repository.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};

use super::conflict_on_duplicate;
use super::entities::admin::{self, ActiveModel, Entity as AdminEntity};
use crate::domain::{Admin, HashedPassword};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AdminRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Admin>>;

    async fn find_by_username(&self, username: &str) -> AppResult<Option<Admin>>;

    /// Whether at least one admin account exists
    async fn exists_any(&self) -> AppResult<bool>;

    /// Create an admin. Fails with a conflict when the username is taken.
    async fn create(&self, username: String, password: HashedPassword) -> AppResult<Admin>;
}

pub struct AdminStore {
    db: DatabaseConnection,
}

impl AdminStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AdminRepository for AdminStore {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Admin>> {
        let result = AdminEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Admin::from))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<Admin>> {
        let result = AdminEntity::find()
            .filter(admin::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Admin::from))
    }

    async fn exists_any(&self) -> AppResult<bool> {
        let count = AdminEntity::find().count(&self.db).await?;
        Ok(count > 0)
    }

    async fn create(&self, username: String, password: HashedPassword) -> AppResult<Admin> {
        let active_model = ActiveModel {
            username: Set(username),
            password: Set(password.into_string()),
            ..Default::default()
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| conflict_on_duplicate(e, "Admin"))?;
        Ok(Admin::from(model))
    }
}
