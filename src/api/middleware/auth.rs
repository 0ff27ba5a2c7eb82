//! JWT authentication and authorization middleware.

use std::future::Future;

use axum::{
    extract::{Request, State},
    http::header::{AUTHORIZATION, COOKIE},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::api::AppState;
use crate::config::{BEARER_TOKEN_PREFIX, ROLE_ADMIN, SESSION_COOKIE_NAME};
use crate::errors::{AppError, AppResult};

/// Authenticated user extracted from JWT token
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
    pub role: String,
}

impl CurrentUser {
    /// Check if user has admin role.
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

/// Pull the bearer token from the Authorization header, falling back
/// to the `token` cookie.
fn extract_token(request: &Request) -> Option<&str> {
    if let Some(token) = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix(BEARER_TOKEN_PREFIX))
    {
        return Some(token);
    }

    request
        .headers()
        .get(COOKIE)
        .and_then(|h| h.to_str().ok())
        .and_then(|cookies| {
            cookies.split(';').find_map(|pair| {
                let (name, value) = pair.trim().split_once('=')?;
                (name == SESSION_COOKIE_NAME).then_some(value)
            })
        })
}

/// JWT authentication middleware.
///
/// Extracts and validates the session token, then injects the
/// CurrentUser into the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(&request).ok_or(AppError::Unauthorized)?;

    let claims = state.auth_service.verify_token(token)?;

    let current_user = CurrentUser {
        id: claims.sub,
        role: claims.role,
    };

    request.extensions_mut().insert(current_user);

    Ok(next.run(request).await)
}

/// Pure role check: is `role` one of the allowed roles?
pub fn is_authorized(role: &str, allowed: &[&str]) -> bool {
    allowed.contains(&role)
}

/// Require one of the allowed roles, returns Forbidden otherwise.
pub fn require_role(user: &CurrentUser, allowed: &[&str]) -> Result<(), AppError> {
    if is_authorized(&user.role, allowed) {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// Require admin role, returns Forbidden error if not admin.
pub fn require_admin(user: &CurrentUser) -> Result<(), AppError> {
    require_role(user, &[ROLE_ADMIN])
}

/// Owner-or-admin guard over an injected owner lookup.
///
/// Admins pass outright. Everyone else must own the resource: a
/// missing id is a bad request, an unknown resource is not found, and
/// a foreign owner is forbidden.
pub async fn authorize_owner_or_admin<F, Fut>(
    user: &CurrentUser,
    resource_id: Option<Uuid>,
    find_owner: F,
) -> Result<(), AppError>
where
    F: FnOnce(Uuid) -> Fut,
    Fut: Future<Output = AppResult<Option<Uuid>>>,
{
    if user.is_admin() {
        return Ok(());
    }

    let id = resource_id.ok_or_else(|| AppError::bad_request("Missing resource id"))?;
    let owner = find_owner(id).await?.ok_or(AppError::NotFound)?;

    if owner == user.id {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ROLE_USER;
    use axum::body::Body;

    fn user_with_role(role: &str) -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            role: role.to_string(),
        }
    }

    fn request_with_headers(headers: &[(&str, &str)]) -> Request {
        let mut builder = axum::http::Request::builder();
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_extract_token_from_bearer_header() {
        let request = request_with_headers(&[("Authorization", "Bearer abc.def.ghi")]);
        assert_eq!(extract_token(&request), Some("abc.def.ghi"));
    }

    #[test]
    fn test_extract_token_rejects_non_bearer_scheme() {
        let request = request_with_headers(&[("Authorization", "Basic dXNlcjpwYXNz")]);
        assert_eq!(extract_token(&request), None);
    }

    #[test]
    fn test_extract_token_falls_back_to_cookie() {
        let request = request_with_headers(&[("Cookie", "theme=dark; token=abc.def.ghi")]);
        assert_eq!(extract_token(&request), Some("abc.def.ghi"));
    }

    #[test]
    fn test_extract_token_header_wins_over_cookie() {
        let request = request_with_headers(&[
            ("Authorization", "Bearer from-header"),
            ("Cookie", "token=from-cookie"),
        ]);
        assert_eq!(extract_token(&request), Some("from-header"));
    }

    #[test]
    fn test_extract_token_ignores_other_cookies() {
        let request = request_with_headers(&[("Cookie", "session_token=nope; theme=dark")]);
        assert_eq!(extract_token(&request), None);
    }

    #[test]
    fn test_extract_token_missing_everywhere() {
        let request = request_with_headers(&[]);
        assert_eq!(extract_token(&request), None);
    }

    #[test]
    fn test_is_authorized_matrix() {
        assert!(is_authorized("admin", &["admin"]));
        assert!(is_authorized("user", &["user", "admin"]));
        assert!(!is_authorized("user", &["admin"]));
        assert!(!is_authorized("", &["admin"]));
        assert!(!is_authorized("admin", &[]));
    }

    #[test]
    fn test_require_admin() {
        assert!(require_admin(&user_with_role(ROLE_ADMIN)).is_ok());
        assert!(matches!(
            require_admin(&user_with_role(ROLE_USER)),
            Err(AppError::Forbidden)
        ));
    }

    #[tokio::test]
    async fn test_owner_or_admin_admin_passes_without_lookup() {
        let admin = user_with_role(ROLE_ADMIN);
        let result = authorize_owner_or_admin(&admin, Some(Uuid::new_v4()), |_| async {
            panic!("admin must not trigger an owner lookup")
        })
        .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_owner_or_admin_owner_passes() {
        let owner = user_with_role(ROLE_USER);
        let owner_id = owner.id;
        let result =
            authorize_owner_or_admin(&owner, Some(Uuid::new_v4()), |_| async move {
                Ok(Some(owner_id))
            })
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_owner_or_admin_other_user_forbidden() {
        let user = user_with_role(ROLE_USER);
        let result =
            authorize_owner_or_admin(&user, Some(Uuid::new_v4()), |_| async {
                Ok(Some(Uuid::new_v4()))
            })
            .await;
        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[tokio::test]
    async fn test_owner_or_admin_missing_resource_not_found() {
        let user = user_with_role(ROLE_USER);
        let result =
            authorize_owner_or_admin(&user, Some(Uuid::new_v4()), |_| async { Ok(None) }).await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_owner_or_admin_missing_id_bad_request() {
        let user = user_with_role(ROLE_USER);
        let result = authorize_owner_or_admin(&user, None, |_| async { Ok(None) }).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
