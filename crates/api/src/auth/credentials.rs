//! Credential hashing with a two-scheme migration path.
//!
//! Most pre-migration accounts carry an unsalted SHA-256 hex digest; every
//! password set through this service uses Argon2. `verify_password`
//! dispatches on the shape of the stored value, so callers never care
//! which scheme a row is on. A stored value in neither recognizable
//! scheme is compared byte-for-byte as plaintext, a concession for rows
//! imported before hashing existed; such rows are upgraded to the digest
//! form on the next successful login.

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use eyre::Result;
use sha2::{Digest, Sha256};

/// Result of a verification attempt.
///
/// `rewrite_digest` carries a replacement stored value when the lookup
/// succeeded through a drifted or plaintext representation; callers should
/// persist it opportunistically and ignore failures doing so.
#[derive(Debug)]
pub struct VerifyOutcome {
    pub valid: bool,
    pub rewrite_digest: Option<String>,
}

impl VerifyOutcome {
    fn invalid() -> Self {
        VerifyOutcome {
            valid: false,
            rewrite_digest: None,
        }
    }
}

/// Hashes a password with Argon2 for storage.
///
/// Generates a fresh random salt and returns the PHC string form
/// (`$argon2id$...`), which `verify_password` recognizes by prefix.
pub fn hash_password(password: &str) -> Result<String> {
    // Generate a fresh, random salt
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| eyre::eyre!("Error hashing password: {}", e))?
        .to_string();

    Ok(password_hash)
}

/// Lowercase SHA-256 hex digest, the legacy fast scheme.
pub fn legacy_digest(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{b:02x}"));
    }
    out
}

/// Verifies `password` against a stored value of any supported scheme.
///
/// Never errors: malformed stored values are simply a non-match. Empty
/// stored values never match anything, including an empty password.
pub fn verify_password(password: &str, stored: &str) -> VerifyOutcome {
    if stored.is_empty() {
        return VerifyOutcome::invalid();
    }

    if stored.starts_with("$argon2") {
        let valid = PasswordHash::new(stored)
            .map(|hash| {
                Argon2::default()
                    .verify_password(password.as_bytes(), &hash)
                    .is_ok()
            })
            .unwrap_or(false);
        return VerifyOutcome {
            valid,
            rewrite_digest: None,
        };
    }

    let fresh = legacy_digest(password);
    if stored.eq_ignore_ascii_case(&fresh) {
        // Case drift from older writers; rewrite to the canonical form.
        let rewrite_digest = if stored != fresh { Some(fresh) } else { None };
        return VerifyOutcome {
            valid: true,
            rewrite_digest,
        };
    }

    if !password.is_empty() && stored.as_bytes() == password.as_bytes() {
        // Plaintext row from before hashing existed.
        return VerifyOutcome {
            valid: true,
            rewrite_digest: Some(fresh),
        };
    }

    VerifyOutcome::invalid()
}
