//! Reconnection policy.
//!
//! Full-jitter exponential backoff for TCP reconnection: each attempt
//! sleeps a uniformly random duration between zero and the current cap,
//! and the cap doubles (up to a maximum) after every attempt.

use std::time::Duration;

use rand::Rng;

/// Knobs for the reconnect backoff schedule.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Backoff cap for the first attempt.
    pub initial_delay: Duration,
    /// Maximum backoff cap.
    pub max_delay: Duration,
    /// Cap multiplier applied after each attempt (e.g. 2.0 doubles it).
    pub multiplier: f64,
    /// Maximum number of attempts (0 = unlimited).
    pub max_attempts: u32,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            multiplier: 2.0,
            max_attempts: 0,
        }
    }
}

/// Full-jitter exponential backoff policy.
#[derive(Debug)]
pub struct ReconnectPolicy {
    config: ReconnectConfig,
    cap: Duration,
    attempt_count: u32,
}

impl ReconnectPolicy {
    /// Start a policy at the initial cap with no attempts recorded.
    #[must_use]
    pub const fn new(config: ReconnectConfig) -> Self {
        let cap = config.initial_delay;
        Self {
            config,
            cap,
            attempt_count: 0,
        }
    }

    /// Next backoff delay, or `None` once max attempts are exhausted.
    #[must_use]
    pub fn next_delay(&mut self) -> Option<Duration> {
        if !self.should_retry() {
            return None;
        }
        self.attempt_count += 1;

        let delay = rand::rng()
            .random_range(Duration::ZERO..=self.cap)
            .max(Duration::from_millis(1));
        self.cap = self
            .cap
            .mul_f64(self.config.multiplier)
            .min(self.config.max_delay);

        Some(delay)
    }

    /// Forget accumulated attempts once a connection proves healthy.
    pub const fn reset(&mut self) {
        self.cap = self.config.initial_delay;
        self.attempt_count = 0;
    }

    /// Number of attempts made since the last reset.
    #[must_use]
    pub const fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    /// Whether another attempt is allowed.
    #[must_use]
    pub const fn should_retry(&self) -> bool {
        self.config.max_attempts == 0 || self.attempt_count < self.config.max_attempts
    }
}
