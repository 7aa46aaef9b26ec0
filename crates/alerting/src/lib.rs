//! Alerting System
//!
//! Provides timestamp-driven cooldown timers and a keyed throttle that
//! decides whether an alert family may fire again.
//!
//! Time is supplied by the caller as seconds (`f64`) so that replayed or
//! simulated streams throttle exactly like live ones.

mod throttle;

pub use throttle::{AlertState, AlertThrottle, CooldownTimer};
