//! Book catalogue service.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{BookResponse, CreateBook, PurchaseReceipt, UpdateBook};
use crate::errors::{AppResult, OptionExt};
use crate::infra::BookRepository;

/// Book catalogue operations. Ownership checks for update/delete are
/// enforced at the route layer before these are called.
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
#[async_trait]
pub trait BookService: Send + Sync {
    async fn list_books(&self) -> AppResult<Vec<BookResponse>>;

    async fn get_book(&self, id: Uuid) -> AppResult<BookResponse>;

    /// Owner id of a book, for ownership guards. None if the book is gone.
    async fn book_owner(&self, id: Uuid) -> AppResult<Option<Uuid>>;

    async fn create_book(&self, data: CreateBook, uploaded_by: Uuid) -> AppResult<BookResponse>;

    async fn update_book(&self, id: Uuid, data: UpdateBook) -> AppResult<BookResponse>;

    async fn delete_book(&self, id: Uuid) -> AppResult<()>;

    /// Mock checkout: no payment settlement, just a receipt.
    async fn purchase_book(&self, id: Uuid, buyer: Uuid) -> AppResult<PurchaseReceipt>;
}

/// Concrete implementation of BookService.
pub struct Bookshelf {
    books: Arc<dyn BookRepository>,
}

impl Bookshelf {
    pub fn new(books: Arc<dyn BookRepository>) -> Self {
        Self { books }
    }
}

#[async_trait]
impl BookService for Bookshelf {
    async fn list_books(&self) -> AppResult<Vec<BookResponse>> {
        let books = self.books.list().await?;
        Ok(books.into_iter().map(BookResponse::from).collect())
    }

    async fn get_book(&self, id: Uuid) -> AppResult<BookResponse> {
        let book = self.books.find_by_id(id).await?.ok_or_not_found()?;
        Ok(book.into())
    }

    async fn book_owner(&self, id: Uuid) -> AppResult<Option<Uuid>> {
        let book = self.books.find_by_id(id).await?;
        Ok(book.map(|b| b.uploaded_by))
    }

    async fn create_book(&self, data: CreateBook, uploaded_by: Uuid) -> AppResult<BookResponse> {
        let book = self.books.create(data, uploaded_by).await?;
        Ok(book.into())
    }

    async fn update_book(&self, id: Uuid, data: UpdateBook) -> AppResult<BookResponse> {
        let book = self.books.update(id, data).await?;
        Ok(book.into())
    }

    async fn delete_book(&self, id: Uuid) -> AppResult<()> {
        self.books.delete(id).await
    }

    async fn purchase_book(&self, id: Uuid, buyer: Uuid) -> AppResult<PurchaseReceipt> {
        let book = self.books.find_by_id(id).await?.ok_or_not_found()?;

        let receipt = PurchaseReceipt {
            book_id: book.id,
            title: book.title,
            price: book.price,
            transaction_id: Uuid::new_v4(),
            purchased_at: Utc::now(),
        };

        tracing::info!(
            book_id = %receipt.book_id,
            buyer = %buyer,
            transaction_id = %receipt.transaction_id,
            "Mock purchase completed"
        );

        Ok(receipt)
    }
}
