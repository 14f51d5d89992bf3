//! Per-connection sliding-window rate limiter (C6): at most 10 messages per
//! 1.0 s wall-clock window. Kept as plain data (no background task) so the
//! read loop can check it inline on every frame, mirroring how the size gate
//! works.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

const WINDOW: Duration = Duration::from_secs(1);
const MAX_PER_WINDOW: usize = 10;

pub struct RateLimiter {
    timestamps: VecDeque<Instant>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiter {
    pub fn new() -> Self {
        Self { timestamps: VecDeque::with_capacity(MAX_PER_WINDOW + 1) }
    }

    /// Records a message attempt at `now` and returns whether it's within
    /// the window's budget. Rejected attempts are not recorded, so a client
    /// that stops sending recovers budget as soon as the window rolls.
    pub fn check(&mut self, now: Instant) -> bool {
        while let Some(&front) = self.timestamps.front() {
            if now.duration_since(front) > WINDOW {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
        if self.timestamps.len() >= MAX_PER_WINDOW {
            return false;
        }
        self.timestamps.push_back(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_ten_per_window_then_rejects() {
        let mut limiter = RateLimiter::new();
        let base = Instant::now();
        for _ in 0..10 {
            assert!(limiter.check(base));
        }
        assert!(!limiter.check(base));
    }

    #[test]
    fn window_rolling_frees_budget() {
        let mut limiter = RateLimiter::new();
        let base = Instant::now();
        for _ in 0..10 {
            assert!(limiter.check(base));
        }
        let later = base + Duration::from_millis(1001);
        assert!(limiter.check(later));
    }
}
