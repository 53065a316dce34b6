//! Randomized retry backoff.
//!
//! Jitter breaks retry synchronization between racing clients contending on
//! the same lock. Expressed as a plain function rather than a sleeping loop
//! primitive, so the retry loop itself stays an explicit `loop` (never
//! recursion) that callers can single-step in tests.

use std::time::Duration;

use rand::Rng;

/// `base ± uniform(0, skew)`, clamped at zero so a large skew can never
/// produce a negative delay.
pub fn jittered_delay(base: Duration, skew: Duration) -> Duration {
    if skew.is_zero() {
        return base;
    }
    let skew_ms = skew.as_millis() as i64;
    let jitter_ms = rand::thread_rng().gen_range(-skew_ms..=skew_ms);
    let delay_ms = (base.as_millis() as i64 + jitter_ms).max(0);
    Duration::from_millis(delay_ms as u64)
}
