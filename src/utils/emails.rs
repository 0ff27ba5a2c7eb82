//! Transactional email templates.

/// Welcome email sent after registration.
pub fn welcome_email(name: &str) -> (String, String) {
    let subject = "Welcome to BookNook".to_string();
    let body = format!(
        "<h1>Welcome, {name}!</h1>\
         <p>Your BookNook account is ready. Browse the catalogue, upload \
         your own listings, and happy reading.</p>",
    );
    (subject, body)
}

/// Password-reset email carrying the single-use reset link.
///
/// The link embeds the plaintext token; it is valid for ten minutes
/// and only its fingerprint is stored server-side.
pub fn password_reset_email(name: &str, reset_link: &str) -> (String, String) {
    let subject = "BookNook password reset".to_string();
    let body = format!(
        "<h1>Password reset requested</h1>\
         <p>Hi {name},</p>\
         <p>Click the link below to choose a new password. The link \
         expires in 10 minutes.</p>\
         <p><a href=\"{reset_link}\">{reset_link}</a></p>\
         <p>If you did not request this, you can ignore this email.</p>",
    );
    (subject, body)
}

/// Reset link pointing at the frontend reset page.
pub fn reset_link(frontend_url: &str, token_plaintext: &str) -> String {
    format!(
        "{}/reset-password.html?token={}",
        frontend_url.trim_end_matches('/'),
        token_plaintext
    )
}
