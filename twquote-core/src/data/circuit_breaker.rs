//! Request gate shared by every worker that talks to Yahoo Finance.
//!
//! A 403 opens the gate at once; 429s open it after `failure_threshold`
//! consecutive hits. While open, no request leaves the process until the
//! cooldown has elapsed, after which the gate closes again by itself.

use parking_lot::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct Gate {
    /// `Some` while open.
    opened_at: Option<Instant>,
    strikes: u32,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    gate: Mutex<Gate>,
    cooldown: Duration,
    failure_threshold: u32,
}

impl CircuitBreaker {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            gate: Mutex::new(Gate::default()),
            cooldown,
            failure_threshold: 3,
        }
    }

    /// 30-minute cooldown, opens on the third consecutive rate limit.
    pub fn default_provider() -> Self {
        Self::new(Duration::from_secs(30 * 60))
    }

    /// Whether a request may go out now. Closes an expired gate.
    pub fn is_allowed(&self) -> bool {
        let mut gate = self.gate.lock();
        match gate.opened_at {
            Some(at) if at.elapsed() < self.cooldown => false,
            Some(_) => {
                *gate = Gate::default();
                true
            }
            None => true,
        }
    }

    pub fn record_success(&self) {
        self.gate.lock().strikes = 0;
    }

    /// Count a rate-limited response.
    pub fn record_failure(&self) {
        let mut gate = self.gate.lock();
        gate.strikes += 1;
        if gate.strikes >= self.failure_threshold && gate.opened_at.is_none() {
            tracing::warn!(strikes = gate.strikes, cooldown_secs = self.cooldown.as_secs(), "yahoo gate opened");
            gate.opened_at = Some(Instant::now());
        }
    }

    /// Open the gate immediately (HTTP 403).
    pub fn trip(&self) {
        tracing::warn!(cooldown_secs = self.cooldown.as_secs(), "yahoo refused access, gate opened");
        self.gate.lock().opened_at = Some(Instant::now());
    }

    /// Time until the gate closes; zero when closed.
    pub fn remaining_cooldown(&self) -> Duration {
        self.gate
            .lock()
            .opened_at
            .map_or(Duration::ZERO, |at| self.cooldown.saturating_sub(at.elapsed()))
    }
}
