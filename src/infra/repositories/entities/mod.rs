//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod book;
pub mod user;

// Re-exports for public API convenience
#[allow(unused_imports)]
pub use book::{ActiveModel as BookActiveModel, Entity as BookEntity, Model as BookModel};
#[allow(unused_imports)]
pub use user::{ActiveModel as UserActiveModel, Entity as UserEntity, Model as UserModel};
