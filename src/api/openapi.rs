//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{admin_handler, auth_handler, book_handler, user_handler};
use crate::domain::{BookResponse, CreateBook, PurchaseReceipt, UpdateBook, UserResponse, UserRole};
use crate::services::{AuthResponse, TokenResponse};
use crate::types::MessageResponse;

/// OpenAPI documentation for the BookNook API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "BookNook API",
        version = "0.1.0",
        description = "Online bookstore backend with JWT auth, password reset, and role-based access control",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
        contact(name = "API Support", email = "support@example.com")
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development server")
    ),
    paths(
        // Authentication endpoints
        auth_handler::register,
        auth_handler::login,
        auth_handler::forgot_password,
        auth_handler::reset_password,
        auth_handler::me,
        // Admin bootstrap
        admin_handler::create_admin,
        // Book endpoints
        book_handler::list_books,
        book_handler::get_book,
        book_handler::create_book,
        book_handler::update_book,
        book_handler::delete_book,
        book_handler::purchase_book,
        // User management endpoints
        user_handler::list_users,
        user_handler::get_user,
        user_handler::update_user,
        user_handler::delete_user,
    ),
    components(
        schemas(
            // Domain types
            UserRole,
            UserResponse,
            BookResponse,
            CreateBook,
            UpdateBook,
            PurchaseReceipt,
            // Auth types
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            auth_handler::ForgotPasswordRequest,
            auth_handler::ResetPasswordRequest,
            admin_handler::CreateAdminRequest,
            TokenResponse,
            AuthResponse,
            // User handler types
            user_handler::UpdateUserRequest,
            // Shared types
            MessageResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login, and password reset"),
        (name = "Admin", description = "Operator-gated admin bootstrap"),
        (name = "Books", description = "Book catalogue and mock checkout"),
        (name = "Users", description = "Admin-only user management")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT token obtained from /auth/login"))
                        .build(),
                ),
            );
        }
    }
}
