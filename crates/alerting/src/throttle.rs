//! Cooldown and Throttle Implementation

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use tracing::debug;

/// Single cooldown timer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CooldownTimer {
    /// Minimum seconds between two fires
    pub period_secs: f64,
    /// Timestamp of the last fire (`None` = never fired)
    pub last_fired: Option<f64>,
}

impl CooldownTimer {
    /// Create an idle timer
    pub fn new(period_secs: f64) -> Self {
        Self {
            period_secs,
            last_fired: None,
        }
    }

    /// True when never fired or at least `period_secs` have elapsed
    pub fn is_ready(&self, now: f64) -> bool {
        match self.last_fired {
            None => true,
            Some(last) => now - last >= self.period_secs,
        }
    }

    /// Seconds left before the timer is ready again
    pub fn remaining(&self, now: f64) -> f64 {
        match self.last_fired {
            None => 0.0,
            Some(last) => (self.period_secs - (now - last)).max(0.0),
        }
    }

    /// Mark the timer as fired at `now`
    pub fn fire(&mut self, now: f64) {
        self.last_fired = Some(now);
    }

    /// Fire if ready; returns whether it fired
    pub fn try_fire(&mut self, now: f64) -> bool {
        if self.is_ready(now) {
            self.fire(now);
            true
        } else {
            false
        }
    }

    /// Forget the last fire
    pub fn reset(&mut self) {
        self.last_fired = None;
    }
}

/// State of one alert family
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertState {
    /// Cooldown gating this family
    pub timer: CooldownTimer,
    /// Number of times fired
    pub fire_count: usize,
    /// Number of times suppressed by the cooldown
    pub suppressed_count: usize,
}

/// Keyed throttle: one independent cooldown per alert family
#[derive(Debug, Clone)]
pub struct AlertThrottle<K> {
    states: HashMap<K, AlertState>,
}

impl<K> AlertThrottle<K>
where
    K: Eq + Hash + Copy + Debug,
{
    /// Create an empty throttle
    pub fn new() -> Self {
        Self {
            states: HashMap::new(),
        }
    }

    /// Register (or re-register) a family with its cooldown period
    pub fn register(&mut self, key: K, period_secs: f64) {
        self.states.insert(
            key,
            AlertState {
                timer: CooldownTimer::new(period_secs),
                fire_count: 0,
                suppressed_count: 0,
            },
        );
    }

    /// Builder form of [`register`](Self::register)
    pub fn with_family(mut self, key: K, period_secs: f64) -> Self {
        self.register(key, period_secs);
        self
    }

    /// Check whether `key` may fire at `now` without consuming the cooldown.
    /// Unregistered families are never throttled.
    pub fn should_fire(&self, key: K, now: f64) -> bool {
        self.states
            .get(&key)
            .map_or(true, |state| state.timer.is_ready(now))
    }

    /// Fire `key` if its cooldown allows it; returns whether it fired
    pub fn try_fire(&mut self, key: K, now: f64) -> bool {
        let Some(state) = self.states.get_mut(&key) else {
            return true;
        };

        if state.timer.try_fire(now) {
            state.fire_count += 1;
            debug!(family = ?key, count = state.fire_count, "Alert family fired");
            true
        } else {
            state.suppressed_count += 1;
            debug!(
                family = ?key,
                remaining_secs = state.timer.remaining(now),
                "Alert suppressed: in cooldown period"
            );
            false
        }
    }

    /// Get the state of a family
    pub fn state(&self, key: K) -> Option<&AlertState> {
        self.states.get(&key)
    }

    /// Total fires across all families
    pub fn total_fired(&self) -> usize {
        self.states.values().map(|s| s.fire_count).sum()
    }

    /// Reset every cooldown and counter, keeping the registered periods
    pub fn clear(&mut self) {
        for state in self.states.values_mut() {
            state.timer.reset();
            state.fire_count = 0;
            state.suppressed_count = 0;
        }
    }
}

impl<K> Default for AlertThrottle<K>
where
    K: Eq + Hash + Copy + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}
