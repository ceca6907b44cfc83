pub mod accounts;
pub mod activation;
pub mod password_reset;
pub mod sessions;

use eduvate_core::errors::AuthError;

/// Lowercases and trims an email, rejecting obviously malformed input
/// before any store access.
pub(crate) fn normalize_email(raw: &str) -> Result<String, AuthError> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AuthError::Validation(
            "A valid email address is required".to_string(),
        ));
    }
    Ok(email)
}
