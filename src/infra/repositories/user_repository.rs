//! User repository - data access for user accounts.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::domain::{User, UserRole};
use crate::errors::{AppError, AppResult, OptionExt};

use super::entities::user::{ActiveModel, Column, Entity};

/// Data access contract for user accounts.
///
/// Services depend on this trait so tests can substitute a mock.
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Look up a user by stored reset-token fingerprint. Expiry is the
    /// caller's concern.
    async fn find_by_reset_fingerprint(&self, fingerprint: &str) -> AppResult<Option<User>>;

    async fn create(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
        role: UserRole,
    ) -> AppResult<User>;

    /// Store a reset-token fingerprint and expiry, replacing any
    /// outstanding pair (last write wins).
    async fn set_reset_token(
        &self,
        id: Uuid,
        fingerprint: &str,
        expires: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Clear the reset-token pair without touching anything else.
    async fn clear_reset_token(&self, id: Uuid) -> AppResult<()>;

    /// Set a new password hash and clear the reset-token pair in the
    /// same update, so a consumed token can never be replayed.
    async fn update_password_and_clear_reset(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> AppResult<User>;

    async fn update(
        &self,
        id: Uuid,
        name: Option<String>,
        role: Option<UserRole>,
    ) -> AppResult<User>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;

    async fn list(&self) -> AppResult<Vec<User>>;
}

/// SeaORM-backed implementation of [`UserRepository`].
#[derive(Clone)]
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn active_model(&self, id: Uuid) -> AppResult<ActiveModel> {
        let model = Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_not_found()?;
        Ok(model.into())
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let model = Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let model = Entity::find()
            .filter(Column::Email.eq(email))
            .one(&self.db)
            .await?;
        Ok(model.map(User::from))
    }

    async fn find_by_reset_fingerprint(&self, fingerprint: &str) -> AppResult<Option<User>> {
        let model = Entity::find()
            .filter(Column::ResetTokenHash.eq(fingerprint))
            .one(&self.db)
            .await?;
        Ok(model.map(User::from))
    }

    async fn create(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
        role: UserRole,
    ) -> AppResult<User> {
        let now = Utc::now();
        let model = ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email.to_string()),
            password_hash: Set(password_hash.to_string()),
            name: Set(name.to_string()),
            role: Set(role.to_string()),
            reset_token_hash: Set(None),
            reset_token_expires: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        // The unique index backs up the service-level duplicate check
        let inserted = model.insert(&self.db).await.map_err(|e| {
            if e.to_string().contains("unique") || e.to_string().contains("duplicate") {
                AppError::DuplicateEmail
            } else {
                AppError::from(e)
            }
        })?;
        Ok(inserted.into())
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        fingerprint: &str,
        expires: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut model = self.active_model(id).await?;
        model.reset_token_hash = Set(Some(fingerprint.to_string()));
        model.reset_token_expires = Set(Some(expires));
        model.updated_at = Set(Utc::now());
        model.update(&self.db).await?;
        Ok(())
    }

    async fn clear_reset_token(&self, id: Uuid) -> AppResult<()> {
        let mut model = self.active_model(id).await?;
        model.reset_token_hash = Set(None);
        model.reset_token_expires = Set(None);
        model.updated_at = Set(Utc::now());
        model.update(&self.db).await?;
        Ok(())
    }

    async fn update_password_and_clear_reset(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> AppResult<User> {
        let mut model = self.active_model(id).await?;
        model.password_hash = Set(password_hash.to_string());
        model.reset_token_hash = Set(None);
        model.reset_token_expires = Set(None);
        model.updated_at = Set(Utc::now());
        let updated = model.update(&self.db).await?;
        Ok(updated.into())
    }

    async fn update(
        &self,
        id: Uuid,
        name: Option<String>,
        role: Option<UserRole>,
    ) -> AppResult<User> {
        let mut model = self.active_model(id).await?;
        if let Some(name) = name {
            model.name = Set(name);
        }
        if let Some(role) = role {
            model.role = Set(role.to_string());
        }
        model.updated_at = Set(Utc::now());
        let updated = model.update(&self.db).await?;
        Ok(updated.into())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let models = Entity::find()
            .order_by_asc(Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(User::from).collect())
    }
}
