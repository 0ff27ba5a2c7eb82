//! Full auth lifecycle tests against an in-memory user store.
//!
//! These exercise the real Authenticator (hashing, token issuance,
//! reset-token fingerprinting) without a database or SMTP server.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use booknook_api::config::Config;
use booknook_api::domain::{User, UserRole};
use booknook_api::errors::{AppError, AppResult};
use booknook_api::infra::UserRepository;
use booknook_api::services::{AuthService, Authenticator, Mailer};

// =============================================================================
// In-memory test doubles
// =============================================================================

/// In-memory user store backing the repository trait
#[derive(Default)]
struct InMemoryUsers {
    users: Mutex<HashMap<Uuid, User>>,
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_reset_fingerprint(&self, fingerprint: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.reset_token_hash.as_deref() == Some(fingerprint))
            .cloned())
    }

    async fn create(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
        role: UserRole,
    ) -> AppResult<User> {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            name: name.to_string(),
            role,
            reset_token_hash: None,
            reset_token_expires: None,
            created_at: now,
            updated_at: now,
        };
        self.users.lock().unwrap().insert(user.id, user.clone());
        Ok(user)
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        fingerprint: &str,
        expires: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(&id).ok_or(AppError::NotFound)?;
        user.reset_token_hash = Some(fingerprint.to_string());
        user.reset_token_expires = Some(expires);
        Ok(())
    }

    async fn clear_reset_token(&self, id: Uuid) -> AppResult<()> {
        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(&id).ok_or(AppError::NotFound)?;
        user.reset_token_hash = None;
        user.reset_token_expires = None;
        Ok(())
    }

    async fn update_password_and_clear_reset(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> AppResult<User> {
        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(&id).ok_or(AppError::NotFound)?;
        user.password_hash = password_hash.to_string();
        user.reset_token_hash = None;
        user.reset_token_expires = None;
        Ok(user.clone())
    }

    async fn update(
        &self,
        id: Uuid,
        name: Option<String>,
        role: Option<UserRole>,
    ) -> AppResult<User> {
        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(&id).ok_or(AppError::NotFound)?;
        if let Some(name) = name {
            user.name = name;
        }
        if let Some(role) = role {
            user.role = role;
        }
        Ok(user.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.users
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(AppError::NotFound)
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        Ok(self.users.lock().unwrap().values().cloned().collect())
    }
}

/// Mailer that captures outgoing bodies instead of sending
#[derive(Default)]
struct CapturingMailer {
    sent: Mutex<Vec<String>>,
}

impl CapturingMailer {
    fn last_body(&self) -> Option<String> {
        self.sent.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Mailer for CapturingMailer {
    async fn send(&self, _to: &str, _subject: &str, html_body: &str) -> AppResult<()> {
        self.sent.lock().unwrap().push(html_body.to_string());
        Ok(())
    }
}

/// Pull the reset token out of a captured reset email body
fn token_from_email(body: &str) -> String {
    let start = body
        .find("token=")
        .expect("reset email must contain a token link")
        + "token=".len();
    body[start..]
        .chars()
        .take_while(|c| c.is_ascii_hexdigit())
        .collect()
}

fn auth_with_mailer() -> (Authenticator, Arc<CapturingMailer>) {
    let mailer = Arc::new(CapturingMailer::default());
    // Debug builds fall back to development defaults for the secrets
    let auth = Authenticator::new(
        Arc::new(InMemoryUsers::default()),
        mailer.clone(),
        Config::from_env(),
    );
    (auth, mailer)
}

// =============================================================================
// Lifecycle tests
// =============================================================================

#[tokio::test]
async fn test_register_then_login() {
    let (auth, _mailer) = auth_with_mailer();

    let registered = auth
        .register(
            "Reader".to_string(),
            "reader@example.com".to_string(),
            "password123".to_string(),
        )
        .await
        .unwrap();
    assert_eq!(registered.user.role, "user");

    let session = auth
        .login("reader@example.com".to_string(), "password123".to_string())
        .await
        .unwrap();
    assert_eq!(session.user.id, registered.user.id);

    let claims = auth.verify_token(&session.token.access_token).unwrap();
    assert_eq!(claims.sub, registered.user.id);
}

#[tokio::test]
async fn test_register_normalizes_email_case() {
    let (auth, _mailer) = auth_with_mailer();

    auth.register(
        "Reader".to_string(),
        "Reader@Example.COM".to_string(),
        "password123".to_string(),
    )
    .await
    .unwrap();

    let duplicate = auth
        .register(
            "Other".to_string(),
            "reader@example.com".to_string(),
            "password123".to_string(),
        )
        .await;
    assert!(matches!(duplicate, Err(AppError::DuplicateEmail)));
}

#[tokio::test]
async fn test_full_password_reset_flow() {
    let (auth, mailer) = auth_with_mailer();

    auth.register(
        "Reader".to_string(),
        "reader@example.com".to_string(),
        "old-password1".to_string(),
    )
    .await
    .unwrap();

    auth.forgot_password("reader@example.com".to_string())
        .await
        .unwrap();

    let token = token_from_email(&mailer.last_body().unwrap());
    let response = auth
        .reset_password(token, "new-password1".to_string())
        .await
        .unwrap();
    assert!(!response.token.access_token.is_empty());

    // Old password no longer works, new one does
    let old_login = auth
        .login(
            "reader@example.com".to_string(),
            "old-password1".to_string(),
        )
        .await;
    assert!(matches!(old_login, Err(AppError::InvalidCredentials)));

    auth.login(
        "reader@example.com".to_string(),
        "new-password1".to_string(),
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn test_reset_token_is_single_use() {
    let (auth, mailer) = auth_with_mailer();

    auth.register(
        "Reader".to_string(),
        "reader@example.com".to_string(),
        "old-password1".to_string(),
    )
    .await
    .unwrap();
    auth.forgot_password("reader@example.com".to_string())
        .await
        .unwrap();

    let token = token_from_email(&mailer.last_body().unwrap());
    auth.reset_password(token.clone(), "new-password1".to_string())
        .await
        .unwrap();

    // Consumed token cannot be replayed
    let replay = auth
        .reset_password(token, "another-password1".to_string())
        .await;
    assert!(matches!(replay, Err(AppError::InvalidResetToken)));
}

#[tokio::test]
async fn test_second_reset_request_invalidates_first_token() {
    let (auth, mailer) = auth_with_mailer();

    auth.register(
        "Reader".to_string(),
        "reader@example.com".to_string(),
        "old-password1".to_string(),
    )
    .await
    .unwrap();

    auth.forgot_password("reader@example.com".to_string())
        .await
        .unwrap();
    let first_token = token_from_email(&mailer.last_body().unwrap());

    auth.forgot_password("reader@example.com".to_string())
        .await
        .unwrap();
    let second_token = token_from_email(&mailer.last_body().unwrap());
    assert_ne!(first_token, second_token);

    // Only the latest token is live
    let stale = auth
        .reset_password(first_token, "new-password1".to_string())
        .await;
    assert!(matches!(stale, Err(AppError::InvalidResetToken)));

    auth.reset_password(second_token, "new-password1".to_string())
        .await
        .unwrap();
}
