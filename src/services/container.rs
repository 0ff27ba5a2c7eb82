//! Service container - centralized service access.

use std::sync::Arc;

use super::{AuthService, BookService, UserService};
use crate::config::Config;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
///
/// Provides centralized access to all application services.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    /// Get authentication service
    fn auth(&self) -> Arc<dyn AuthService>;

    /// Get user management service
    fn users(&self) -> Arc<dyn UserService>;

    /// Get book catalogue service
    fn books(&self) -> Arc<dyn BookService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
    book_service: Arc<dyn BookService>,
}

impl Services {
    /// Create a new service container with all services initialized
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        user_service: Arc<dyn UserService>,
        book_service: Arc<dyn BookService>,
    ) -> Self {
        Self {
            auth_service,
            user_service,
            book_service,
        }
    }

    /// Create service container from database connection and config
    pub fn from_connection(db: sea_orm::DatabaseConnection, config: Config) -> Self {
        use super::{Authenticator, Bookshelf, LogMailer, UserManager};
        use crate::infra::{BookStore, UserStore};

        let users = Arc::new(UserStore::new(db.clone()));
        let books = Arc::new(BookStore::new(db));
        let mailer = Arc::new(LogMailer::new(config.mail_from.clone()));

        let auth_service = Arc::new(Authenticator::new(users.clone(), mailer, config));
        let user_service = Arc::new(UserManager::new(users));
        let book_service = Arc::new(Bookshelf::new(books));

        Self {
            auth_service,
            user_service,
            book_service,
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn books(&self) -> Arc<dyn BookService> {
        self.book_service.clone()
    }
}
