//! API middleware.

mod auth;
mod rate_limit;

pub use auth::{
    auth_middleware, authorize_owner_or_admin, is_authorized, require_admin, require_role,
    CurrentUser,
};
pub use rate_limit::{rate_limit_auth_middleware, rate_limit_middleware};
