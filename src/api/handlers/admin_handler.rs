//! Admin bootstrap handler.

use axum::{extract::State, http::StatusCode, response::Json, routing::post, Router};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::errors::AppResult;
use crate::services::AuthResponse;

/// Admin creation request, gated by the operator setup key
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAdminRequest {
    /// Admin display name
    #[validate(length(min = 1, message = "Name is required"))]
    #[schema(example = "Store Admin")]
    pub name: String,
    /// Admin email address
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "admin@example.com")]
    pub email: String,
    /// Admin password (minimum 8 characters)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "AdminPass123!", min_length = 8)]
    pub password: String,
    /// Operator shared secret from server configuration
    pub setup_key: String,
}

/// Admin routes
pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/create-admin", post(create_admin))
}

/// Create an admin account
#[utoipa::path(
    post,
    path = "/admin/create-admin",
    tag = "Admin",
    request_body = CreateAdminRequest,
    responses(
        (status = 201, description = "Admin created", body = AuthResponse),
        (status = 400, description = "Validation error or email already registered"),
        (status = 403, description = "Wrong setup key")
    )
)]
pub async fn create_admin(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateAdminRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let response = state
        .auth_service
        .create_admin(
            payload.name,
            payload.email,
            payload.password,
            payload.setup_key,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(response)))
}
