//! Domain layer - core business entities and value objects.
//!
//! No infrastructure concerns here; entities and value objects only
//! depend on the shared error types.

pub mod book;
pub mod password;
pub mod reset_token;
pub mod user;

pub use book::{Book, BookResponse, CreateBook, PurchaseReceipt, UpdateBook};
pub use password::Password;
pub use reset_token::ResetToken;
pub use user::{UpdateUser, User, UserResponse, UserRole};
