//! User management service (admin surface).

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::is_valid_role;
use crate::domain::{UpdateUser, UserResponse, UserRole};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UserRepository;

/// User management operations. Route-level guards restrict these to
/// admins; the service itself is role-agnostic.
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
#[async_trait]
pub trait UserService: Send + Sync {
    async fn list_users(&self) -> AppResult<Vec<UserResponse>>;

    async fn get_user(&self, id: Uuid) -> AppResult<UserResponse>;

    async fn update_user(&self, id: Uuid, data: UpdateUser) -> AppResult<UserResponse>;

    async fn delete_user(&self, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of UserService.
pub struct UserManager {
    users: Arc<dyn UserRepository>,
}

impl UserManager {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn list_users(&self) -> AppResult<Vec<UserResponse>> {
        let users = self.users.list().await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    async fn get_user(&self, id: Uuid) -> AppResult<UserResponse> {
        let user = self.users.find_by_id(id).await?.ok_or_not_found()?;
        Ok(user.into())
    }

    async fn update_user(&self, id: Uuid, data: UpdateUser) -> AppResult<UserResponse> {
        let role = match data.role {
            Some(role) => {
                if !is_valid_role(&role) {
                    return Err(AppError::bad_request(format!("Invalid role: {}", role)));
                }
                Some(UserRole::from(role.as_str()))
            }
            None => None,
        };

        let user = self.users.update(id, data.name, role).await?;
        Ok(user.into())
    }

    async fn delete_user(&self, id: Uuid) -> AppResult<()> {
        self.users.delete(id).await
    }
}
