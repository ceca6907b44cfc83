//! Opaque token generation.
//!
//! Tokens are two v4 UUIDs back to back, over 256 bits from the OS
//! CSPRNG. Uniqueness is trusted to entropy; the store is never consulted.

use rand::seq::SliceRandom;
use rand::Rng;
use uuid::Uuid;

/// Generates an opaque token for sessions, invitations, and resets.
pub fn new_token() -> String {
    format!("{}{}", Uuid::new_v4(), Uuid::new_v4())
}

const UPPER: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";
const LOWER: &[u8] = b"abcdefghijkmnopqrstuvwxyz";
const DIGITS: &[u8] = b"23456789";
const SPECIAL: &[u8] = b"!@#$%^&*-_+=";

/// Generates a random password that satisfies the password policy, used
/// for admin-initiated resets when no explicit password is supplied.
///
/// One character from each required class, the rest drawn from all of
/// them, then shuffled so class positions are not predictable.
pub fn random_password() -> String {
    let mut rng = rand::thread_rng();
    let mut chars: Vec<u8> = vec![
        *UPPER.choose(&mut rng).expect("non-empty charset"),
        *LOWER.choose(&mut rng).expect("non-empty charset"),
        *DIGITS.choose(&mut rng).expect("non-empty charset"),
        *SPECIAL.choose(&mut rng).expect("non-empty charset"),
    ];

    let all: Vec<u8> = [UPPER, LOWER, DIGITS, SPECIAL].concat();
    for _ in 0..12 {
        chars.push(all[rng.gen_range(0..all.len())]);
    }
    chars.shuffle(&mut rng);

    String::from_utf8(chars).expect("ASCII charsets")
}
