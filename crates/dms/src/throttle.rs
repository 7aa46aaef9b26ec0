//! Evidence and alert throttling
//!
//! Two independent cooldowns: evidence capture (any capturing event) and the
//! distraction alert. Other alerts are rate-limited by their own duration
//! reset in the detector.

use alerting::AlertThrottle;

use crate::DmsConfig;

/// Throttled event families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThrottleFamily {
    Screenshot,
    DistractionAlert,
}

/// Cooldown gate for screenshots and distraction alerts
#[derive(Debug, Clone)]
pub struct EvidenceThrottler {
    throttle: AlertThrottle<ThrottleFamily>,
}

impl EvidenceThrottler {
    pub fn new(config: &DmsConfig) -> Self {
        Self {
            throttle: AlertThrottle::new()
                .with_family(ThrottleFamily::Screenshot, config.screenshot_cooldown_secs)
                .with_family(ThrottleFamily::DistractionAlert, config.distraction_alert_cooldown_secs),
        }
    }

    /// Consume the screenshot cooldown if it allows a capture at `now`
    pub fn allow_screenshot(&mut self, now: f64) -> bool {
        self.throttle.try_fire(ThrottleFamily::Screenshot, now)
    }

    /// Consume the distraction-alert cooldown if it allows an alert at `now`
    pub fn allow_distraction_alert(&mut self, now: f64) -> bool {
        self.throttle.try_fire(ThrottleFamily::DistractionAlert, now)
    }

    /// Number of times a family passed the gate
    pub fn fired(&self, family: ThrottleFamily) -> usize {
        self.throttle.state(family).map_or(0, |s| s.fire_count)
    }

    /// Number of times a family was held back
    pub fn suppressed(&self, family: ThrottleFamily) -> usize {
        self.throttle.state(family).map_or(0, |s| s.suppressed_count)
    }

    pub fn reset(&mut self) {
        self.throttle.clear();
    }
}
