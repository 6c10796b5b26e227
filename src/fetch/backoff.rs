// src/fetch/backoff.rs
// =============================================================================
// How long to wait between retry attempts.
//
// Schedule (defaults):
//   after attempt 1 fails -> 500ms
//   after attempt 2 fails -> 1000ms
//   after attempt 3 fails -> 2000ms
//   after attempt 4 fails -> 4000ms
//   attempt 5 is the last one
//
// Each wait gets random jitter in [0, 20%] on top. If the server sent a
// Retry-After header (seconds or an HTTP date), that replaces the computed
// wait (jitter still added).
// =============================================================================

use std::time::{Duration, SystemTime};

use rand::Rng;
use tracing::debug;

/// Default base wait.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(500);

/// Default attempt cap, including the first attempt.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Jitter as a fraction of the wait.
const JITTER_RATIO: f64 = 0.2;

/// Largest Retry-After we are willing to honour.
pub const MAX_RETRY_AFTER: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackoffPolicy {
    base_delay: Duration,
    max_attempts: u32,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base_delay: DEFAULT_BASE_DELAY,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl BackoffPolicy {
    /// `max_attempts` is clamped to at least 1.
    pub fn new(base_delay: Duration, max_attempts: u32) -> Self {
        Self {
            base_delay,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Wait before retrying after `attempt` (1-indexed) failed, without jitter.
    pub fn base_wait(&self, attempt: u32) -> Duration {
        // Exponent capped so a silly max_attempts cannot overflow.
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1u32 << exponent)
    }

    /// Full wait for the retry after `attempt`, honouring Retry-After.
    pub fn wait_for(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let wait = match retry_after {
            Some(server_wait) => server_wait.min(MAX_RETRY_AFTER),
            None => self.base_wait(attempt),
        };
        wait + jitter(wait)
    }
}

/// Uniform jitter in [0, JITTER_RATIO * wait].
fn jitter(wait: Duration) -> Duration {
    let max_ms = (wait.as_millis() as f64 * JITTER_RATIO) as u64;
    if max_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::thread_rng().gen_range(0..=max_ms))
}

/// Parses a Retry-After header: whole seconds or an HTTP date.
///
/// Both forms are capped at MAX_RETRY_AFTER. A date in the past means
/// "retry now"; anything unparseable falls back to the computed backoff.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    retry_after_at(value, SystemTime::now())
}

fn retry_after_at(value: &str, now: SystemTime) -> Option<Duration> {
    let value = value.trim();

    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds).min(MAX_RETRY_AFTER));
    }

    match httpdate::parse_http_date(value) {
        Ok(at) => {
            let wait = at.duration_since(now).unwrap_or(Duration::ZERO);
            Some(wait.min(MAX_RETRY_AFTER))
        }
        Err(_) => {
            debug!(value, "unparseable Retry-After value");
            None
        }
    }
}
