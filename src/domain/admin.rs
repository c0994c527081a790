//! Admin panel accounts.

use serde::Serialize;
use utoipa::ToSchema;

use super::HashedPassword;

#[derive(Debug, Clone, PartialEq)]
pub struct Admin {
    pub id: i64,
    pub username: String,
    pub password: HashedPassword,
}

/// Admin identity returned by the panel endpoints
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminResponse {
    pub id: i64,
    #[schema(example = "shopkeeper")]
    pub username: String,
}

impl From<Admin> for AdminResponse {
    fn from(admin: Admin) -> Self {
        Self {
            id: admin.id,
            username: admin.username,
        }
    }
}
