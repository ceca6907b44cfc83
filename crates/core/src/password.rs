//! Password policy.
//!
//! Enforced before any invitation/reset token is consumed and on every
//! password change. Violations are returned as an itemized list so the
//! client can show the user exactly which rules are unmet.

pub const MIN_PASSWORD_LENGTH: usize = 12;

/// Returns the list of unmet policy rules for `password`.
///
/// An empty list means the password is acceptable.
pub fn policy_violations(password: &str) -> Vec<String> {
    let mut violations = Vec::new();

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        violations.push(format!(
            "must be at least {MIN_PASSWORD_LENGTH} characters long"
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        violations.push("must contain an uppercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        violations.push("must contain a lowercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        violations.push("must contain a digit".to_string());
    }
    if !password.chars().any(|c| !c.is_alphanumeric()) {
        violations.push("must contain a special character".to_string());
    }

    violations
}

/// Validates `password` against the policy, joining violations into a
/// single user-displayable message on failure.
pub fn validate_password(password: &str) -> Result<(), String> {
    let violations = policy_violations(password);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(format!("Password {}", violations.join(", ")))
    }
}
