//! Request pacing with adaptive backoff.
//!
//! uta-net.com has no documented rate limit, so the client is simply
//! polite: a minimum interval between page fetches that doubles on
//! failures and eases back down after a long run of clean responses.

use std::thread;
use std::time::{Duration, Instant};

/// Enforces a minimum interval between requests, backing off on failures.
pub struct RateLimiter {
    name: String,
    last_request: Option<Instant>,
    current_interval: Duration,
    base_interval: Duration,
    max_interval: Duration,
    success_count: u32,
}

/// Clean responses in a row before the interval is halved back towards
/// the base.  High on purpose: catalogue runs fetch hundreds of pages,
/// so easing off slowly costs little.
const SUCCESSES_TO_REDUCE: u32 = 20;

impl RateLimiter {
    /// Create a limiter with a base interval in milliseconds.  The
    /// interval can grow to 8× the base under repeated failures.
    pub fn from_millis(name: &str, millis: u64) -> Self {
        let base = Duration::from_millis(millis);
        RateLimiter {
            name: name.to_string(),
            last_request: None,
            current_interval: base,
            base_interval: base,
            max_interval: base * 8,
            success_count: 0,
        }
    }

    /// Sleep until the interval since the previous request has passed.
    /// Call before every request.
    pub fn wait_if_needed(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.current_interval {
                thread::sleep(self.current_interval - elapsed);
            }
        }
        self.last_request = Some(Instant::now());
    }

    /// Report a clean response.  After [`SUCCESSES_TO_REDUCE`] in a row
    /// the interval is halved, never below the base.
    pub fn report_success(&mut self) {
        self.success_count += 1;
        if self.success_count >= SUCCESSES_TO_REDUCE && self.current_interval > self.base_interval {
            self.current_interval = (self.current_interval / 2).max(self.base_interval);
            println!(
                "  [{}] easing request interval back to {:.1}s",
                self.name,
                self.current_interval.as_secs_f64()
            );
            self.success_count = 0;
        }
    }

    /// Report a failed request.  Doubles the interval up to the ceiling.
    pub fn report_failure(&mut self) {
        self.current_interval = (self.current_interval * 2).min(self.max_interval);
        println!(
            "  [{}] backing off, request interval now {:.1}s",
            self.name,
            self.current_interval.as_secs_f64()
        );
        self.success_count = 0;
    }
}
