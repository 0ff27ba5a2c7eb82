//! BookNook API - online bookstore backend
//!
//! User registration and login, email-based password reset, a book
//! catalogue with mock checkout, and admin user management. The core
//! of the design is the authentication and authorization flow:
//! argon2 credential hashing, JWT sessions, fingerprinted reset
//! tokens, and role/ownership route guards.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Core business entities and value objects
//! - **services**: Application use cases and business logic
//! - **infra**: Infrastructure concerns (database, cache)
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared response types
//! - **utils**: Utility functions and helpers
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;
pub mod utils;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Book, Password, ResetToken, User, UserRole};
pub use errors::{AppError, AppResult};
pub use infra::Cache;
