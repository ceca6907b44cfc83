//! Sliding-window rate limiting.
//!
//! The limiter is behind a trait so call sites don't change when a shared
//! store replaces the in-memory map. `MemoryRateLimiter` is process-local:
//! with several server instances each enforces its own quota. That is an
//! accepted boundary at this scale, not something the limiter papers over.
//!
//! Callers on anti-enumeration paths must translate a denied check into
//! the same generic success response as the happy path, never into a
//! distinguishable error.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
}

pub trait RateLimiter: Send + Sync {
    /// Checks and records a request under `key`. Allowed requests count
    /// against the window; denied ones are not recorded.
    fn check(&self, key: &str, max_requests: u32, window: Duration) -> RateLimitDecision;
}

pub struct MemoryRateLimiter {
    entries: Mutex<HashMap<String, Vec<Instant>>>,
}

impl MemoryRateLimiter {
    pub fn new() -> Self {
        MemoryRateLimiter {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiter for MemoryRateLimiter {
    fn check(&self, key: &str, max_requests: u32, window: Duration) -> RateLimitDecision {
        let now = Instant::now();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        let timestamps = entries.entry(key.to_string()).or_default();
        timestamps.retain(|t| now.duration_since(*t) < window);

        let decision = if (timestamps.len() as u32) < max_requests {
            timestamps.push(now);
            RateLimitDecision {
                allowed: true,
                remaining: max_requests - timestamps.len() as u32,
            }
        } else {
            RateLimitDecision {
                allowed: false,
                remaining: 0,
            }
        };

        // Evict keys whose window has fully aged out, so probing unique
        // keys cannot grow the map without bound.
        entries.retain(|k, stamps| {
            k == key || stamps.last().is_some_and(|t| now.duration_since(*t) < window)
        });

        decision
    }
}
