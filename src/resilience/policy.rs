//! Resilience policy settings

use std::time::Duration;

/// Timeout, retry and circuit-breaker parameters applied to every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResiliencePolicy {
    /// Budget for a single attempt
    pub attempt_timeout: Duration,
    /// Total attempts per call, including the first
    pub max_attempts: u32,
    /// Delay before retry `n` is `backoff_step * n`
    pub backoff_step: Duration,
    /// Consecutive failed calls that open the circuit
    pub failure_threshold: u32,
    /// How long the circuit stays open
    pub break_duration: Duration,
}

impl Default for ResiliencePolicy {
    fn default() -> Self {
        Self {
            attempt_timeout: Duration::from_secs(2),
            max_attempts: 3,
            backoff_step: Duration::from_millis(200),
            failure_threshold: 2,
            break_duration: Duration::from_secs(10),
        }
    }
}

impl ResiliencePolicy {
    /// Delay after failed attempt number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_step * attempt
    }
}
