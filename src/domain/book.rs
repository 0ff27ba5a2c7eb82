//! Book domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Book domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub category: String,
    pub description: String,
    pub price: f64,
    /// Owner of the listing; grants update/delete alongside admins.
    pub uploaded_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Book creation payload
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    /// Book title
    #[schema(example = "The Rust Programming Language")]
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,
    /// Author name
    #[schema(example = "Steve Klabnik")]
    #[validate(length(min = 1, max = 255, message = "Author must be 1-255 characters"))]
    pub author: String,
    /// Category label
    #[schema(example = "Programming")]
    #[validate(length(min = 1, max = 100, message = "Category must be 1-100 characters"))]
    pub category: String,
    /// Free-form description
    #[schema(example = "The official book on Rust")]
    pub description: String,
    /// Price in the store currency
    #[schema(example = 39.95)]
    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: f64,
}

/// Book update payload; absent fields are left unchanged
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Author must be 1-255 characters"))]
    pub author: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Category must be 1-100 characters"))]
    pub category: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: Option<f64>,
}

/// Book response
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookResponse {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub category: String,
    pub description: String,
    pub price: f64,
    pub uploaded_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            author: book.author,
            category: book.category,
            description: book.description,
            price: book.price,
            uploaded_by: book.uploaded_by,
            created_at: book.created_at,
        }
    }
}

/// Mock purchase receipt; no payment settlement happens
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PurchaseReceipt {
    /// Purchased book id
    pub book_id: Uuid,
    pub title: String,
    pub price: f64,
    /// Generated reference for the mock transaction
    pub transaction_id: Uuid,
    pub purchased_at: DateTime<Utc>,
}
