//! DMS configuration

use serde::{Deserialize, Serialize};

use crate::DmsError;

/// Detection sensitivity preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sensitivity {
    /// Wider gaze tolerance, longer durations before alerting
    Easy,
    #[default]
    Normal,
    /// Tighter gaze tolerance, shorter durations before alerting
    Strict,
}

impl Sensitivity {
    /// (gaze tolerance multiplier, duration threshold multiplier)
    pub fn multipliers(&self) -> (f64, f64) {
        match self {
            Self::Easy => (1.5, 1.5),
            Self::Normal => (1.0, 1.0),
            Self::Strict => (0.7, 0.75),
        }
    }

    /// Parse a preset name (`easy`, `normal`, `strict`)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Some(Self::Easy),
            "normal" => Some(Self::Normal),
            "strict" => Some(Self::Strict),
            _ => None,
        }
    }
}

/// DMS configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DmsConfig {
    /// Eye-aspect baseline used until calibration succeeds
    pub default_ear_baseline: f64,

    /// Mouth-aspect baseline used until calibration succeeds
    pub default_mar_baseline: f64,

    /// Calibrated EAR baseline = mean open-eye EAR * this factor
    pub ear_calibration_factor: f64,

    /// Calibrated MAR baseline = mean neutral MAR + this offset
    pub mar_calibration_offset: f64,

    /// Calibration window length (seconds)
    pub calibration_secs: f64,

    /// Max distance between smoothed iris center and reference (normalized units)
    pub eye_center_tolerance: f64,

    /// Number of iris-center samples in the smoothing window
    pub smoothing_window: usize,

    /// Continuous eye closure before an `eyes_closed` event (seconds)
    pub eye_closed_secs: f64,

    /// Continuous mouth opening before a `yawn` event (seconds)
    pub yawn_secs: f64,

    /// Continuous off-reference gaze before a distraction is confirmed (seconds)
    pub distraction_secs: f64,

    /// Off-reference frames required (strictly more than) to confirm a distraction
    pub distraction_frame_threshold: u32,

    /// Off-reference frames required (strictly more than) for the soft warning
    pub distraction_warning_frames: u32,

    /// Minimum seconds between evidence captures
    pub screenshot_cooldown_secs: f64,

    /// Minimum seconds between two distraction alerts
    pub distraction_alert_cooldown_secs: f64,

    /// Fatigue score drops by one per elapsed interval (seconds)
    pub fatigue_decay_secs: f64,

    /// Fatigue score at which `fatigue_alert` fires
    pub alert_level: u8,

    /// Fatigue score at which `fatigue_warning` is reported
    pub warning_level: u8,
}

/// Upper bound of the fatigue score
pub const MAX_FATIGUE: u8 = 10;

impl Default for DmsConfig {
    fn default() -> Self {
        Self {
            default_ear_baseline: 0.25,
            default_mar_baseline: 0.30,
            ear_calibration_factor: 0.85,
            mar_calibration_offset: 0.08,
            calibration_secs: 10.0,
            eye_center_tolerance: 0.07,
            smoothing_window: 5,
            eye_closed_secs: 1.2,
            yawn_secs: 1.0,
            distraction_secs: 4.0,
            distraction_frame_threshold: 10,
            distraction_warning_frames: 2,
            screenshot_cooldown_secs: 5.0,
            distraction_alert_cooldown_secs: 5.0,
            fatigue_decay_secs: 2.0,
            alert_level: 8,
            warning_level: 4,
        }
    }
}

impl DmsConfig {
    /// Create config scaled for a sensitivity preset
    pub fn for_sensitivity(sensitivity: Sensitivity) -> Self {
        let base = Self::default();
        let (tolerance, duration) = sensitivity.multipliers();
        Self {
            eye_center_tolerance: base.eye_center_tolerance * tolerance,
            eye_closed_secs: base.eye_closed_secs * duration,
            yawn_secs: base.yawn_secs * duration,
            distraction_secs: base.distraction_secs * duration,
            ..base
        }
    }

    /// Create strict config (lower thresholds)
    pub fn strict() -> Self {
        Self::for_sensitivity(Sensitivity::Strict)
    }

    /// Create lenient config (higher thresholds)
    pub fn lenient() -> Self {
        Self::for_sensitivity(Sensitivity::Easy)
    }

    /// Set the fatigue alert level; the warning level follows four points below
    pub fn with_alert_threshold(mut self, threshold: u8) -> Result<Self, DmsError> {
        if threshold == 0 || threshold > MAX_FATIGUE {
            return Err(DmsError::Config(format!(
                "alert threshold {} outside 1..={}",
                threshold, MAX_FATIGUE
            )));
        }
        self.alert_level = threshold;
        self.warning_level = threshold.saturating_sub(4).max(1);
        Ok(self)
    }

    /// Check that every threshold is usable
    pub fn validate(&self) -> Result<(), DmsError> {
        let positive = [
            ("default_ear_baseline", self.default_ear_baseline),
            ("default_mar_baseline", self.default_mar_baseline),
            ("ear_calibration_factor", self.ear_calibration_factor),
            ("eye_center_tolerance", self.eye_center_tolerance),
            ("eye_closed_secs", self.eye_closed_secs),
            ("yawn_secs", self.yawn_secs),
            ("distraction_secs", self.distraction_secs),
            ("fatigue_decay_secs", self.fatigue_decay_secs),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(DmsError::Config(format!("{} must be positive, got {}", name, value)));
            }
        }

        let non_negative = [
            ("mar_calibration_offset", self.mar_calibration_offset),
            ("calibration_secs", self.calibration_secs),
            ("screenshot_cooldown_secs", self.screenshot_cooldown_secs),
            ("distraction_alert_cooldown_secs", self.distraction_alert_cooldown_secs),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(DmsError::Config(format!("{} must not be negative, got {}", name, value)));
            }
        }

        if self.smoothing_window == 0 {
            return Err(DmsError::Config("smoothing_window must be at least 1".into()));
        }
        if self.alert_level == 0 || self.alert_level > MAX_FATIGUE {
            return Err(DmsError::Config(format!("alert_level {} outside 1..=10", self.alert_level)));
        }
        if self.warning_level == 0 {
            return Err(DmsError::Config("warning_level must be at least 1".into()));
        }
        if self.warning_level > self.alert_level {
            return Err(DmsError::Config(format!(
                "warning_level {} above alert_level {}",
                self.warning_level, self.alert_level
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(DmsConfig::default().validate().is_ok());
        assert!(DmsConfig::strict().validate().is_ok());
        assert!(DmsConfig::lenient().validate().is_ok());
    }

    #[test]
    fn test_sensitivity_scaling() {
        let strict = DmsConfig::strict();
        let easy = DmsConfig::lenient();
        let normal = DmsConfig::for_sensitivity(Sensitivity::Normal);

        assert_eq!(normal, DmsConfig::default());
        assert!(strict.eye_center_tolerance < normal.eye_center_tolerance);
        assert!(strict.eye_closed_secs < normal.eye_closed_secs);
        assert!(easy.distraction_secs > normal.distraction_secs);
        assert!((easy.eye_center_tolerance - 0.105).abs() < 1e-9);
    }

    #[test]
    fn test_alert_threshold_sets_warning() {
        let config = DmsConfig::default().with_alert_threshold(5).unwrap();
        assert_eq!(config.alert_level, 5);
        assert_eq!(config.warning_level, 1);

        let config = DmsConfig::default().with_alert_threshold(3).unwrap();
        assert_eq!(config.warning_level, 1);

        assert!(DmsConfig::default().with_alert_threshold(0).is_err());
        assert!(DmsConfig::default().with_alert_threshold(11).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = DmsConfig { eye_closed_secs: 0.0, ..Default::default() };
        assert!(config.validate().is_err());

        let config = DmsConfig { smoothing_window: 0, ..Default::default() };
        assert!(config.validate().is_err());

        let config = DmsConfig { warning_level: 9, ..Default::default() };
        assert!(config.validate().is_err());

        let config = DmsConfig { warning_level: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(DmsError::Config(_))));
    }

    #[test]
    fn test_sensitivity_parse_and_serde() {
        assert_eq!(Sensitivity::parse(" Strict "), Some(Sensitivity::Strict));
        assert_eq!(Sensitivity::parse("paranoid"), None);

        let json = serde_json::to_string(&Sensitivity::Easy).unwrap();
        assert_eq!(json, "\"easy\"");
    }
}
