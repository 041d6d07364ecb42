//! Circuit Breaker
//!
//! Counts consecutive failed calls and fails fast while the circuit is open.
//!
//! ```text
//! Closed --(threshold failures)--> Open --(break elapsed)--> HalfOpen
//!    ^                               ^                          |
//!    +-----------(trial ok)----------+------(trial failed)------+
//! ```

use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::error::{Result, StoreError};

/// Observable circuit state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug)]
enum State {
    Closed { failures: u32 },
    Open { until: Instant },
    HalfOpen { trial_in_flight: bool },
}

#[derive(Debug)]
pub struct CircuitBreaker {
    failure_threshold: u32,
    break_duration: Duration,
    state: Mutex<State>,
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, break_duration: Duration) -> Self {
        Self {
            failure_threshold: failure_threshold.max(1),
            break_duration,
            state: Mutex::new(State::Closed { failures: 0 }),
        }
    }

    pub fn state(&self) -> CircuitState {
        match *self.state.lock() {
            State::Closed { .. } => CircuitState::Closed,
            State::Open { .. } => CircuitState::Open,
            State::HalfOpen { .. } => CircuitState::HalfOpen,
        }
    }

    // == Acquire ==
    /// Admits a call or rejects it with `CircuitOpen`.
    ///
    /// Once the break has elapsed exactly one trial call is admitted; others
    /// are rejected until that trial reports back through its permit. A trial
    /// permit dropped without an outcome hands the trial slot to the next caller.
    pub fn try_acquire(&self) -> Result<Permit<'_>> {
        let mut state = self.state.lock();
        let trial = match *state {
            State::Closed { .. } => false,
            State::Open { until } if Instant::now() >= until => {
                info!("Circuit half-open: admitting trial call");
                true
            }
            State::HalfOpen {
                trial_in_flight: false,
            } => true,
            State::Open { .. } | State::HalfOpen { .. } => return Err(StoreError::CircuitOpen),
        };
        if trial {
            *state = State::HalfOpen {
                trial_in_flight: true,
            };
        }
        Ok(Permit {
            breaker: self,
            trial,
            resolved: false,
        })
    }

    fn abandon_trial(&self) {
        let mut state = self.state.lock();
        if let State::HalfOpen {
            trial_in_flight: true,
        } = *state
        {
            warn!("Circuit trial call abandoned before completing");
            *state = State::HalfOpen {
                trial_in_flight: false,
            };
        }
    }

    // == Outcomes ==
    pub fn record_success(&self) {
        let mut state = self.state.lock();
        if !matches!(*state, State::Closed { failures: 0 }) {
            if !matches!(*state, State::Closed { .. }) {
                info!("Circuit closed");
            }
            *state = State::Closed { failures: 0 };
        }
    }

    pub fn record_failure(&self) {
        let mut state = self.state.lock();
        match *state {
            State::Closed { failures } => {
                let failures = failures + 1;
                if failures >= self.failure_threshold {
                    warn!(
                        "Circuit opened after {} consecutive failures for {:?}",
                        failures, self.break_duration
                    );
                    *state = State::Open {
                        until: Instant::now() + self.break_duration,
                    };
                } else {
                    *state = State::Closed { failures };
                }
            }
            State::HalfOpen { .. } => {
                warn!("Circuit trial call failed, reopening for {:?}", self.break_duration);
                *state = State::Open {
                    until: Instant::now() + self.break_duration,
                };
            }
            // A call admitted before the circuit opened; keep the current window.
            State::Open { .. } => {}
        }
    }
}

// == Permit ==
/// Admission to one call, returned by `CircuitBreaker::try_acquire`.
#[must_use = "report the call outcome through the permit"]
#[derive(Debug)]
pub struct Permit<'a> {
    breaker: &'a CircuitBreaker,
    trial: bool,
    resolved: bool,
}

impl Permit<'_> {
    pub fn is_trial(&self) -> bool {
        self.trial
    }

    pub fn succeed(mut self) {
        self.resolved = true;
        self.breaker.record_success();
    }

    pub fn fail(mut self) {
        self.resolved = true;
        self.breaker.record_failure();
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        if self.trial && !self.resolved {
            self.breaker.abandon_trial();
        }
    }
}
