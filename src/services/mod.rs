//! Service layer - application business logic.

mod auth_service;
mod book_service;
mod container;
mod mailer;
mod user_service;

pub use auth_service::{
    issue_session_token, verify_session_token, AuthResponse, AuthService, Authenticator, Claims,
    TokenResponse,
};
pub use book_service::{BookService, Bookshelf};
pub use container::{ServiceContainer, Services};
pub use mailer::{LogMailer, Mailer};
pub use user_service::{UserManager, UserService};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use auth_service::MockAuthService;
#[cfg(any(test, feature = "test-utils"))]
pub use book_service::MockBookService;
#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
#[cfg(any(test, feature = "test-utils"))]
pub use mailer::MockMailer;
#[cfg(any(test, feature = "test-utils"))]
pub use user_service::MockUserService;
