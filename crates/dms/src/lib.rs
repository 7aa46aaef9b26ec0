//! Driver Monitoring System (DMS)
//!
//! Real-time driver state analysis from face-mesh landmarks:
//! - Eye closure (drowsiness) from the eye-aspect ratio
//! - Yawning from the mouth-aspect ratio
//! - Distraction from iris drift off a calibrated reference
//! - A decaying fatigue score with warning and alert levels
//!
//! Landmark extraction is done upstream; a [`DmsSession`] consumes one
//! [`LandmarkFrame`] (or none, when no face was found) per video frame and
//! returns a [`FrameVerdict`].

pub mod analysis;
pub mod calibration;
pub mod config;
pub mod detector;
pub mod evidence;
pub mod geometry;
pub mod landmarks;
pub mod signals;
pub mod state;
pub mod summary;
pub mod throttle;

#[cfg(test)]
pub(crate) mod testing;

pub use analysis::{EventKind, FrameVerdict, Severity, Status};
pub use calibration::{calibrate, CalibrationBaseline, Calibrator};
pub use config::{DmsConfig, Sensitivity, MAX_FATIGUE};
pub use evidence::{EvidenceError, EvidenceSink, ImageEvidenceWriter, NoEvidence};
pub use landmarks::{LandmarkFrame, LandmarkSample, Point};
pub use signals::FrameSignals;
pub use state::{DetectorSnapshot, DetectorState};
pub use summary::{SessionStats, SessionSummary};
pub use throttle::{EvidenceThrottler, ThrottleFamily};

use std::iter::Peekable;
use thiserror::Error;
use tracing::info;

/// DMS error types
#[derive(Error, Debug)]
pub enum DmsError {
    #[error("Configuration error: {0}")]
    Config(String),
}

/// One monitoring session: owns the baselines and all cross-frame state.
///
/// Frames must be delivered in order with non-decreasing timestamps. Use one
/// session per camera; sessions share nothing.
pub struct DmsSession<S = NoEvidence> {
    config: DmsConfig,
    baseline: CalibrationBaseline,
    state: DetectorState,
    throttler: EvidenceThrottler,
    sink: S,
}

impl DmsSession<NoEvidence> {
    /// Create a session that discards evidence
    pub fn new(config: DmsConfig) -> Result<Self, DmsError> {
        Self::with_evidence_sink(config, NoEvidence)
    }
}

impl<S: EvidenceSink> DmsSession<S> {
    /// Create a session writing evidence to `sink`
    pub fn with_evidence_sink(config: DmsConfig, sink: S) -> Result<Self, DmsError> {
        config.validate()?;
        info!(
            alert_level = config.alert_level,
            warning_level = config.warning_level,
            tolerance = config.eye_center_tolerance,
            "Creating DMS session"
        );
        Ok(Self {
            baseline: CalibrationBaseline::from_config(&config),
            state: DetectorState::new(config.smoothing_window),
            throttler: EvidenceThrottler::new(&config),
            sink,
            config,
        })
    }

    /// Calibrate over the configured window, leaving later samples in `samples`
    pub fn calibrate<I>(&mut self, samples: &mut Peekable<I>) -> CalibrationBaseline
    where
        I: Iterator<Item = LandmarkSample>,
    {
        let duration = self.config.calibration_secs;
        self.calibrate_for(samples, duration)
    }

    /// Calibrate over an explicit window length (seconds)
    pub fn calibrate_for<I>(&mut self, samples: &mut Peekable<I>, duration_secs: f64) -> CalibrationBaseline
    where
        I: Iterator<Item = LandmarkSample>,
    {
        let baseline = calibrate(samples, duration_secs, &self.config);
        self.apply_calibration(baseline);
        baseline
    }

    /// Install baselines and enable distraction tracking
    pub fn apply_calibration(&mut self, baseline: CalibrationBaseline) {
        self.baseline = baseline;
        self.state.calibrated = true;
        self.state.recent_eye_centers.clear();
        self.state.clear_distraction();
    }

    pub fn config(&self) -> &DmsConfig {
        &self.config
    }

    pub fn baseline(&self) -> &CalibrationBaseline {
        &self.baseline
    }

    pub fn state(&self) -> &DetectorState {
        &self.state
    }

    pub fn throttler(&self) -> &EvidenceThrottler {
        &self.throttler
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Access the sink, e.g. to stage the current camera frame
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Reset driver state and calibration (on driver change)
    pub fn reset_state(&mut self) {
        self.state.reset();
        self.baseline = CalibrationBaseline::from_config(&self.config);
        self.throttler.reset();
    }
}
