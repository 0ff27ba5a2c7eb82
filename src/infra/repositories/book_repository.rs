//! Book repository - data access for the book catalogue.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use uuid::Uuid;

use crate::domain::{Book, CreateBook, UpdateBook};
use crate::errors::{AppError, AppResult, OptionExt};

use super::entities::book::{ActiveModel, Column, Entity};

/// Data access contract for books.
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
#[async_trait]
pub trait BookRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Book>>;

    async fn list(&self) -> AppResult<Vec<Book>>;

    async fn create(&self, data: CreateBook, uploaded_by: Uuid) -> AppResult<Book>;

    async fn update(&self, id: Uuid, data: UpdateBook) -> AppResult<Book>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// SeaORM-backed implementation of [`BookRepository`].
#[derive(Clone)]
pub struct BookStore {
    db: DatabaseConnection,
}

impl BookStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BookRepository for BookStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Book>> {
        let model = Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Book::from))
    }

    async fn list(&self) -> AppResult<Vec<Book>> {
        let models = Entity::find()
            .order_by_desc(Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Book::from).collect())
    }

    async fn create(&self, data: CreateBook, uploaded_by: Uuid) -> AppResult<Book> {
        let now = Utc::now();
        let model = ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(data.title),
            author: Set(data.author),
            category: Set(data.category),
            description: Set(data.description),
            price: Set(data.price),
            uploaded_by: Set(uploaded_by),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let inserted = model.insert(&self.db).await?;
        Ok(inserted.into())
    }

    async fn update(&self, id: Uuid, data: UpdateBook) -> AppResult<Book> {
        let model = Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_not_found()?;
        let mut model: ActiveModel = model.into();

        if let Some(title) = data.title {
            model.title = Set(title);
        }
        if let Some(author) = data.author {
            model.author = Set(author);
        }
        if let Some(category) = data.category {
            model.category = Set(category);
        }
        if let Some(description) = data.description {
            model.description = Set(description);
        }
        if let Some(price) = data.price {
            model.price = Set(price);
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
}
