//! Authentication service.
//!
//! Registration, login, password reset, and session-token handling.
//! Password hashing lives in the domain `Password` value object; this
//! service owns the token lifecycle and the email side effects.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{Config, SECONDS_PER_HOUR, TOKEN_TYPE_BEARER};
use crate::domain::{Password, ResetToken, User, UserResponse, UserRole};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UserRepository;
use crate::utils::emails;

use super::mailer::Mailer;

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Token response returned after successful authentication
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token expiration time in seconds
    #[schema(example = 604800)]
    pub expires_in: i64,
}

/// Session token plus the authenticated user's public profile
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    #[serde(flatten)]
    pub token: TokenResponse,
    pub user: UserResponse,
}

/// Authentication operations, behind a trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new user account with the default role
    async fn register(&self, name: String, email: String, password: String)
        -> AppResult<AuthResponse>;

    /// Create an admin account, gated by the operator setup key
    async fn create_admin(
        &self,
        name: String,
        email: String,
        password: String,
        setup_key: String,
    ) -> AppResult<AuthResponse>;

    /// Login and return a session token
    async fn login(&self, email: String, password: String) -> AppResult<AuthResponse>;

    /// Issue a password-reset token and email the reset link
    async fn forgot_password(&self, email: String) -> AppResult<()>;

    /// Consume a reset token and set a new password
    async fn reset_password(&self, token: String, new_password: String)
        -> AppResult<AuthResponse>;

    /// Public profile of the authenticated user
    async fn me(&self, user_id: Uuid) -> AppResult<UserResponse>;

    /// Verify a session token and extract its claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;
}

/// Issue a session JWT for a user (shared helper to avoid duplication)
pub fn issue_session_token(user: &User, config: &Config) -> AppResult<TokenResponse> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.jwt_expiration_hours);

    let claims = Claims {
        sub: user.id,
        role: user.role.to_string(),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?;

    Ok(TokenResponse {
        access_token: token,
        token_type: TOKEN_TYPE_BEARER.to_string(),
        expires_in: config.jwt_expiration_hours * SECONDS_PER_HOUR,
    })
}

/// Verify a session JWT and extract claims (shared helper).
///
/// Zero leeway: a token is valid strictly while `now < exp`. Expired
/// and malformed tokens both come back as a JWT error (401).
pub fn verify_session_token(token: &str, config: &Config) -> AppResult<Claims> {
    let mut validation = Validation::default();
    validation.leeway = 0;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret_bytes()),
        &validation,
    )?;

    // The decoder only rejects exp < now; the exact expiry instant is
    // already dead here.
    let claims = token_data.claims;
    if claims.exp <= Utc::now().timestamp() {
        return Err(AppError::Jwt(
            jsonwebtoken::errors::ErrorKind::ExpiredSignature.into(),
        ));
    }

    Ok(claims)
}

/// Concrete implementation of AuthService.
pub struct Authenticator {
    users: Arc<dyn UserRepository>,
    mailer: Arc<dyn Mailer>,
    config: Config,
}

impl Authenticator {
    pub fn new(users: Arc<dyn UserRepository>, mailer: Arc<dyn Mailer>, config: Config) -> Self {
        Self {
            users,
            mailer,
            config,
        }
    }

    /// Single delivery attempt, bounded by the configured timeout.
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        let limit = std::time::Duration::from_secs(self.config.mailer_timeout_seconds);
        match tokio::time::timeout(limit, self.mailer.send(to, subject, body)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!(to = %to, "Email delivery timed out");
                Err(AppError::EmailDelivery)
            }
        }
    }

    async fn create_account(
        &self,
        name: String,
        email: String,
        password: String,
        role: UserRole,
    ) -> AppResult<AuthResponse> {
        let email = email.trim().to_lowercase();

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::DuplicateEmail);
        }

        let password_hash = Password::new(&password)?.into_string();
        let user = self
            .users
            .create(&email, name.trim(), &password_hash, role)
            .await?;

        // Welcome email is best-effort; account creation already succeeded
        let (subject, body) = emails::welcome_email(&user.name);
        if let Err(e) = self.send_email(&user.email, &subject, &body).await {
            tracing::warn!(user_id = %user.id, error = %e, "Welcome email failed");
        }

        let token = issue_session_token(&user, &self.config)?;
        Ok(AuthResponse {
            token,
            user: user.into(),
        })
    }
}

#[async_trait]
impl AuthService for Authenticator {
    async fn register(
        &self,
        name: String,
        email: String,
        password: String,
    ) -> AppResult<AuthResponse> {
        self.create_account(name, email, password, UserRole::User)
            .await
    }

    async fn create_admin(
        &self,
        name: String,
        email: String,
        password: String,
        setup_key: String,
    ) -> AppResult<AuthResponse> {
        if !self.config.check_admin_setup_key(&setup_key) {
            return Err(AppError::Forbidden);
        }
        self.create_account(name, email, password, UserRole::Admin)
            .await
    }

    async fn login(&self, email: String, password: String) -> AppResult<AuthResponse> {
        let email = email.trim().to_lowercase();
        let user_result = self.users.find_by_email(&email).await?;

        // SECURITY: Perform password verification even if user doesn't exist
        // to prevent timing attacks that could enumerate valid emails.
        // We use a dummy hash that will always fail verification.
        let dummy_hash =
            "$argon2id$v=19$m=19456,t=2,p=1$dummysalt123456$dummyhash1234567890123456789012";

        let (password_hash, user_exists) = match &user_result {
            Some(user) => (user.password_hash.as_str(), true),
            None => (dummy_hash, false),
        };

        let stored_password = Password::from_hash(password_hash.to_string());
        let password_valid = stored_password.verify(&password);

        // Only succeed if both user exists AND password is valid
        if !user_exists || !password_valid {
            return Err(AppError::InvalidCredentials);
        }

        // Safe to unwrap since we verified user_exists is true
        let user = user_result.unwrap();
        let token = issue_session_token(&user, &self.config)?;
        Ok(AuthResponse {
            token,
            user: user.into(),
        })
    }

    async fn forgot_password(&self, email: String) -> AppResult<()> {
        let email = email.trim().to_lowercase();
        let user = self.users.find_by_email(&email).await?.ok_or_not_found()?;

        let token = ResetToken::generate();
        let expires = Utc::now() + Duration::minutes(self.config.reset_token_ttl_minutes);

        // Last write wins: a repeat request invalidates the earlier token
        self.users
            .set_reset_token(user.id, &token.fingerprint(), expires)
            .await?;

        let link = emails::reset_link(&self.config.frontend_url, token.plaintext());
        let (subject, body) = emails::password_reset_email(&user.name, &link);

        if let Err(e) = self.send_email(&user.email, &subject, &body).await {
            // Roll back so the unreachable token cannot linger
            tracing::error!(user_id = %user.id, error = %e, "Reset email failed, clearing token");
            self.users.clear_reset_token(user.id).await?;
            return Err(AppError::EmailDelivery);
        }

        Ok(())
    }

    async fn reset_password(
        &self,
        token: String,
        new_password: String,
    ) -> AppResult<AuthResponse> {
        let fingerprint = ResetToken::fingerprint_of(&token);
        let user = self
            .users
            .find_by_reset_fingerprint(&fingerprint)
            .await?
            .ok_or(AppError::InvalidResetToken)?;

        if !user.reset_token_live(Utc::now()) {
            return Err(AppError::InvalidResetToken);
        }

        let password_hash = Password::new(&new_password)?.into_string();

        // New hash and token clearing land in one update
        let user = self
            .users
            .update_password_and_clear_reset(user.id, &password_hash)
            .await?;

        let token = issue_session_token(&user, &self.config)?;
        Ok(AuthResponse {
            token,
            user: user.into(),
        })
    }

    async fn me(&self, user_id: Uuid) -> AppResult<UserResponse> {
        let user = self.users.find_by_id(user_id).await?.ok_or_not_found()?;
        Ok(user.into())
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        verify_session_token(token, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;
    use crate::infra::MockUserRepository;
    use crate::services::mailer::MockMailer;
    use mockall::predicate::eq;

    fn test_user(email: &str, password: &str) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: Password::new(password).unwrap().into_string(),
            name: "Test Reader".to_string(),
            role: UserRole::User,
            reset_token_hash: None,
            reset_token_expires: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn authenticator(users: MockUserRepository, mailer: MockMailer) -> Authenticator {
        Authenticator::new(Arc::new(users), Arc::new(mailer), Config::for_tests())
    }

    fn happy_mailer() -> MockMailer {
        let mut mailer = MockMailer::new();
        mailer.expect_send().returning(|_, _, _| Ok(()));
        mailer
    }

    #[test]
    fn test_session_token_round_trip() {
        let config = Config::for_tests();
        let user = test_user("reader@example.com", "password123");

        let token = issue_session_token(&user, &config).unwrap();
        let claims = verify_session_token(&token.access_token, &config).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role, "user");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_expired_session_token_rejected() {
        let expired_config = Config::for_tests_with_expiration(-1);
        let user = test_user("reader@example.com", "password123");

        let token = issue_session_token(&user, &expired_config).unwrap();
        let result = verify_session_token(&token.access_token, &Config::for_tests());

        assert!(matches!(result, Err(AppError::Jwt(_))));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let result = verify_session_token("not.a.jwt", &Config::for_tests());
        assert!(matches!(result, Err(AppError::Jwt(_))));
    }

    #[test]
    fn test_token_at_exact_expiry_instant_rejected() {
        // Zero-hour TTL puts exp at the issue instant
        let config = Config::for_tests_with_expiration(0);
        let user = test_user("reader@example.com", "password123");

        let token = issue_session_token(&user, &config).unwrap();
        let result = verify_session_token(&token.access_token, &config);

        assert!(matches!(result, Err(AppError::Jwt(_))));
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .with(eq("taken@example.com"))
            .returning(|email| Ok(Some(test_user(email, "password123"))));

        let auth = authenticator(users, MockMailer::new());
        let result = auth
            .register(
                "Someone".to_string(),
                "Taken@Example.com ".to_string(),
                "password123".to_string(),
            )
            .await;

        assert!(matches!(result, Err(AppError::DuplicateEmail)));
    }

    #[tokio::test]
    async fn test_register_succeeds_when_welcome_email_fails() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|_| Ok(None));
        users
            .expect_create()
            .returning(|email, name, hash, role| {
                let mut user = test_user(email, "password123");
                user.name = name.to_string();
                user.password_hash = hash.to_string();
                user.role = role;
                Ok(user)
            });

        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .returning(|_, _, _| Err(AppError::EmailDelivery));

        let auth = authenticator(users, mailer);
        let result = auth
            .register(
                "New Reader".to_string(),
                "new@example.com".to_string(),
                "password123".to_string(),
            )
            .await;

        let response = result.unwrap();
        assert_eq!(response.user.email, "new@example.com");
        assert_eq!(response.user.role, "user");
        assert!(!response.token.access_token.is_empty());
    }

    #[tokio::test]
    async fn test_create_admin_rejects_wrong_setup_key() {
        let auth = authenticator(MockUserRepository::new(), MockMailer::new());
        let result = auth
            .create_admin(
                "Operator".to_string(),
                "ops@example.com".to_string(),
                "password123".to_string(),
                "wrong-key".to_string(),
            )
            .await;

        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[tokio::test]
    async fn test_create_admin_assigns_admin_role() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|_| Ok(None));
        users
            .expect_create()
            .withf(|_, _, _, role| *role == UserRole::Admin)
            .returning(|email, name, hash, role| {
                let mut user = test_user(email, "password123");
                user.name = name.to_string();
                user.password_hash = hash.to_string();
                user.role = role;
                Ok(user)
            });

        let auth = authenticator(users, happy_mailer());
        let response = auth
            .create_admin(
                "Operator".to_string(),
                "ops@example.com".to_string(),
                "password123".to_string(),
                "test-admin-setup-key".to_string(),
            )
            .await
            .unwrap();

        assert_eq!(response.user.role, "admin");
    }

    #[tokio::test]
    async fn test_login_unknown_email_and_wrong_password_look_identical() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .with(eq("missing@example.com"))
            .returning(|_| Ok(None));
        users
            .expect_find_by_email()
            .with(eq("known@example.com"))
            .returning(|email| Ok(Some(test_user(email, "correct-password"))));

        let auth = authenticator(users, MockMailer::new());

        let unknown = auth
            .login("missing@example.com".to_string(), "whatever1".to_string())
            .await;
        let wrong = auth
            .login("known@example.com".to_string(), "wrong-password".to_string())
            .await;

        assert!(matches!(unknown, Err(AppError::InvalidCredentials)));
        assert!(matches!(wrong, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_right_password_returns_token() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(|email| Ok(Some(test_user(email, "correct-password"))));

        let auth = authenticator(users, MockMailer::new());
        let response = auth
            .login(
                "known@example.com".to_string(),
                "correct-password".to_string(),
            )
            .await
            .unwrap();

        let claims = auth.verify_token(&response.token.access_token).unwrap();
        assert_eq!(claims.sub, response.user.id);
    }

    #[tokio::test]
    async fn test_forgot_password_unknown_email() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|_| Ok(None));

        let auth = authenticator(users, MockMailer::new());
        let result = auth.forgot_password("missing@example.com".to_string()).await;

        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_forgot_password_stores_fingerprint_and_sends_link() {
        let user = test_user("reader@example.com", "password123");
        let user_id = user.id;

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(move |_| Ok(Some(user.clone())));
        users
            .expect_set_reset_token()
            .withf(move |id, fingerprint, expires| {
                // Stored value must be a SHA-256 hex digest, not the token
                *id == user_id && fingerprint.len() == 64 && *expires > Utc::now()
            })
            .returning(|_, _, _| Ok(()));

        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .withf(|_, _, body| body.contains("/reset-password.html?token="))
            .returning(|_, _, _| Ok(()));

        let auth = authenticator(users, mailer);
        auth.forgot_password("reader@example.com".to_string())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_forgot_password_rolls_back_on_email_failure() {
        let user = test_user("reader@example.com", "password123");
        let user_id = user.id;

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(move |_| Ok(Some(user.clone())));
        users.expect_set_reset_token().returning(|_, _, _| Ok(()));
        users
            .expect_clear_reset_token()
            .with(eq(user_id))
            .times(1)
            .returning(|_| Ok(()));

        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .returning(|_, _, _| Err(AppError::EmailDelivery));

        let auth = authenticator(users, mailer);
        let result = auth.forgot_password("reader@example.com".to_string()).await;

        assert!(matches!(result, Err(AppError::EmailDelivery)));
    }

    /// Mailer that never completes within any real timeout
    struct StalledMailer;

    #[async_trait::async_trait]
    impl Mailer for StalledMailer {
        async fn send(&self, _to: &str, _subject: &str, _body: &str) -> AppResult<()> {
            tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_forgot_password_times_out_on_stalled_mailer() {
        let user = test_user("reader@example.com", "password123");
        let user_id = user.id;

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(move |_| Ok(Some(user.clone())));
        users.expect_set_reset_token().returning(|_, _, _| Ok(()));
        users
            .expect_clear_reset_token()
            .with(eq(user_id))
            .times(1)
            .returning(|_| Ok(()));

        let mut config = Config::for_tests();
        config.mailer_timeout_seconds = 0;

        let auth = Authenticator::new(Arc::new(users), Arc::new(StalledMailer), config);
        let result = auth.forgot_password("reader@example.com".to_string()).await;

        assert!(matches!(result, Err(AppError::EmailDelivery)));
    }

    #[tokio::test]
    async fn test_reset_password_unknown_token() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_reset_fingerprint()
            .returning(|_| Ok(None));

        let auth = authenticator(users, MockMailer::new());
        let result = auth
            .reset_password("deadbeef".to_string(), "new-password1".to_string())
            .await;

        assert!(matches!(result, Err(AppError::InvalidResetToken)));
    }

    #[tokio::test]
    async fn test_reset_password_expired_token() {
        let token = ResetToken::generate();
        let fingerprint = token.fingerprint();

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_reset_fingerprint()
            .returning(move |_| {
                let mut user = test_user("reader@example.com", "password123");
                user.reset_token_hash = Some(fingerprint.clone());
                user.reset_token_expires = Some(Utc::now() - Duration::minutes(1));
                Ok(Some(user))
            });

        let auth = authenticator(users, MockMailer::new());
        let result = auth
            .reset_password(token.plaintext().to_string(), "new-password1".to_string())
            .await;

        assert!(matches!(result, Err(AppError::InvalidResetToken)));
    }

    #[tokio::test]
    async fn test_reset_password_success_returns_fresh_session() {
        let token = ResetToken::generate();
        let fingerprint = token.fingerprint();
        let lookup_fingerprint = fingerprint.clone();

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_reset_fingerprint()
            .with(eq(fingerprint))
            .returning(move |_| {
                let mut user = test_user("reader@example.com", "old-password1");
                user.reset_token_hash = Some(lookup_fingerprint.clone());
                user.reset_token_expires = Some(Utc::now() + Duration::minutes(5));
                Ok(Some(user))
            });
        users
            .expect_update_password_and_clear_reset()
            .withf(|_, hash| {
                // New password verifies against the stored hash, old one doesn't
                let stored = Password::from_hash(hash.to_string());
                stored.verify("new-password1") && !stored.verify("old-password1")
            })
            .returning(|id, hash| {
                let mut user = test_user("reader@example.com", "placeholder1");
                user.id = id;
                user.password_hash = hash.to_string();
                Ok(user)
            });

        let auth = authenticator(users, MockMailer::new());
        let response = auth
            .reset_password(token.plaintext().to_string(), "new-password1".to_string())
            .await
            .unwrap();

        let claims = auth.verify_token(&response.token.access_token).unwrap();
        assert_eq!(claims.sub, response.user.id);
    }

    #[tokio::test]
    async fn test_me_returns_profile_without_hash() {
        let user = test_user("reader@example.com", "password123");
        let user_id = user.id;

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .with(eq(user_id))
            .returning(move |_| Ok(Some(user.clone())));

        let auth = authenticator(users, MockMailer::new());
        let profile = auth.me(user_id).await.unwrap();

        assert_eq!(profile.id, user_id);
        let json = serde_json::to_string(&profile).unwrap();
        assert!(!json.contains("password"));
    }
}
