//! Retry policy and backoff computation.
//!
//! The policy is a plain value object: each call-site builds its own instance
//! and hands it to the executor for one logical operation. Jitter comes from
//! an injectable [`JitterSource`] so delay tests stay deterministic without
//! turning jitter off.

use std::time::Duration;

/// Backoff envelope for one logical operation.
///
/// `max_attempts` counts the initial attempt plus retries; it is never less
/// than one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 6,
            base_delay: Duration::from_millis(400),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
        }
    }

    /// Deterministic exponential envelope for attempt `n` (1-indexed),
    /// before jitter: `min(max_delay, base_delay * 2^(n-1))`.
    pub fn backoff_envelope(&self, attempt: u32) -> Duration {
        let scale = 2f64.powi(attempt.saturating_sub(1).min(i32::MAX as u32) as i32);
        let seconds = self.base_delay.as_secs_f64() * scale;
        Duration::from_secs_f64(seconds.min(self.max_delay.as_secs_f64()))
    }

    /// Jittered delay slept before the retry that follows attempt `n`.
    pub fn backoff_delay(&self, attempt: u32, jitter: &dyn JitterSource) -> Duration {
        self.backoff_envelope(attempt).mul_f64(jitter.factor())
    }
}

/// Source of the random scaling factor applied to backoff delays.
pub trait JitterSource: Send + Sync {
    /// Scaling factor in `[0.5, 1.5)`.
    fn factor(&self) -> f64;
}

/// Uniform jitter in `[0.5, 1.5)`, the production source.
///
/// Spreads simultaneous callers apart so their retries do not land in
/// synchronized bursts.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformJitter;

impl JitterSource for UniformJitter {
    fn factor(&self) -> f64 {
        0.5 + fastrand::f64()
    }
}

/// Constant factor for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedJitter(pub f64);

impl JitterSource for FixedJitter {
    fn factor(&self) -> f64 {
        self.0
    }
}
