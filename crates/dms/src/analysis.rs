//! DMS verdicts: status, severity, and event kinds

use serde::{Deserialize, Serialize};
use std::fmt;

/// Event reported for a frame (at most one)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    #[default]
    None,

    /// Gaze held away from the calibrated reference
    Distraction,

    /// Eyes closed longer than the closure threshold
    EyesClosed,

    /// Mouth held open longer than the yawn threshold
    Yawn,

    /// Fatigue score at or above the alert level
    FatigueAlert,

    /// Fatigue score at or above the warning level
    FatigueWarning,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Distraction => "distraction",
            Self::EyesClosed => "eyes_closed",
            Self::Yawn => "yawn",
            Self::FatigueAlert => "fatigue_alert",
            Self::FatigueWarning => "fatigue_warning",
        }
    }

    /// File-name label for evidence captured on this event
    pub fn evidence_label(&self) -> &'static str {
        match self {
            Self::Distraction => "distraction_alert",
            Self::EyesClosed => "eye_closure_detected",
            Self::FatigueAlert => "fatigue_alert",
            other => other.as_str(),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display severity of a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Normal,
    Caution,
    Warning,
    Critical,
}

impl Severity {
    /// Display color (RGB)
    pub fn rgb(&self) -> [u8; 3] {
        match self {
            Self::Normal => [0, 255, 0],
            Self::Caution => [255, 255, 0],
            Self::Warning => [255, 165, 0],
            Self::Critical => [255, 0, 0],
        }
    }
}

/// Driver status shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Awake,
    NoFace,
    LookAtRoad,
    PayAttention,
    EyesClosed,
    Yawning,
    Drowsy,
    DrowsyWarning,
}

impl Status {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Awake => "AWAKE",
            Self::NoFace => "NO FACE DETECTED",
            Self::LookAtRoad => "ALERT! LOOK AT ROAD!",
            Self::PayAttention => "WARNING! PAY ATTENTION",
            Self::EyesClosed => "EYES CLOSED! WAKE UP!",
            Self::Yawning => "YAWN DETECTED!",
            Self::Drowsy => "ALERT! DROWSY!",
            Self::DrowsyWarning => "WARNING: Drowsy",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::Awake | Self::NoFace => Severity::Normal,
            Self::DrowsyWarning => Severity::Caution,
            Self::PayAttention | Self::Yawning => Severity::Warning,
            Self::LookAtRoad | Self::EyesClosed | Self::Drowsy => Severity::Critical,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-frame decision returned to the caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameVerdict {
    pub status: Status,

    pub severity: Severity,

    /// Whether a face was present in this frame
    pub face_detected: bool,

    /// Mean EAR; 0.0 when not computed this frame
    pub ear: f64,

    /// MAR; 0.0 when not computed this frame
    pub mar: f64,

    pub fatigue_score: u8,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gaze_ratio: Option<f64>,

    /// A user-visible alert should fire
    pub alert_triggered: bool,

    pub event: EventKind,
}

impl FrameVerdict {
    pub(crate) fn new(status: Status, fatigue_score: u8) -> Self {
        Self {
            status,
            severity: status.severity(),
            fatigue_score,
            ..Default::default()
        }
    }

    pub(crate) fn with_event(mut self, event: EventKind, alert_triggered: bool) -> Self {
        self.event = event;
        self.alert_triggered = alert_triggered;
        self
    }

    pub(crate) fn with_face(mut self, gaze_ratio: Option<f64>) -> Self {
        self.face_detected = true;
        self.gaze_ratio = gaze_ratio;
        self
    }

    pub(crate) fn with_ratios(mut self, ear: f64, mar: f64) -> Self {
        self.ear = ear;
        self.mar = mar;
        self
    }

    pub fn status_label(&self) -> &'static str {
        self.status.label()
    }

    pub fn severity_color(&self) -> [u8; 3] {
        self.severity.rgb()
    }
}
