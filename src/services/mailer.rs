//! Outbound email transport.
//!
//! The auth flow needs to know whether delivery succeeded, so the
//! transport is a trait injected into services rather than a global.
//! In development, emails are logged. In production, configure SMTP
//! settings via environment variables.

use async_trait::async_trait;
use std::env;

use crate::errors::AppResult;

/// Email delivery contract. Implementations are expected to make a
/// single attempt; retries and timeouts are the caller's concern.
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> AppResult<()>;
}

/// SMTP configuration from environment.
/// Note: Some fields are currently unused pending lettre integration.
#[allow(dead_code)]
struct SmtpConfig {
    smtp_host: Option<String>,
    smtp_port: u16,
    smtp_user: Option<String>,
    smtp_pass: Option<String>,
    smtp_tls: bool,
}

impl SmtpConfig {
    fn from_env() -> Self {
        Self {
            smtp_host: env::var("SMTP_HOST").ok(),
            smtp_port: env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(587),
            smtp_user: env::var("SMTP_USER").ok(),
            smtp_pass: env::var("SMTP_PASS").ok(),
            smtp_tls: env::var("SMTP_TLS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
        }
    }

    fn is_configured(&self) -> bool {
        self.smtp_host.is_some()
    }
}

/// Log-transport mailer for development.
///
/// Writes the full message to the log instead of sending it. When SMTP
/// is configured, warns that a real transport is not wired up yet.
pub struct LogMailer {
    from: String,
}

impl LogMailer {
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> AppResult<()> {
        let config = SmtpConfig::from_env();

        if config.is_configured() {
            // TODO: wire up lettre for real SMTP delivery
            tracing::warn!(
                "SMTP is configured but no SMTP transport is installed; logging email instead"
            );
        }

        tracing::info!(
            "=== EMAIL (not sent) ===\n\
             From: {}\n\
             To: {}\n\
             Subject: {}\n\
             Body:\n{}\n\
             ========================",
            self.from,
            to,
            subject,
            html_body
        );

        Ok(())
    }
}
