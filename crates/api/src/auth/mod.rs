//! Authentication primitives: credential hashing, token generation, and
//! rate limiting. These are the pieces of the auth core that need crypto
//! or process-local state; the pure rules live in `eduvate-core`.

pub mod credentials;
pub mod rate_limit;
pub mod tokens;

/// Session lifetime on issuance.
pub const SESSION_TTL_DAYS: i64 = 7;

/// Validating a session with less than this many hours remaining rotates
/// the token (slide-forward).
pub const SESSION_ROTATE_WITHIN_HOURS: i64 = 24;

/// First-time activation links stay valid for a week.
pub const INVITATION_TTL_DAYS: i64 = 7;

/// Reset links replace an existing credential, so the trust window is
/// much tighter than for activation.
pub const RESET_TTL_HOURS: i64 = 2;

/// Max reset requests per address, and the window length in seconds.
pub const RESET_RATE_RULE: (u32, u64) = (3, 60 * 60);
