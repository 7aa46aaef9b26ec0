//! Per-driver calibration pass
//!
//! Observes a short window of frames before monitoring and derives the
//! session baselines. Frames without a face are skipped, and every metric
//! falls back to its configured default when nothing was observed.

use serde::{Deserialize, Serialize};
use std::iter::Peekable;
use tracing::{info, warn};

use crate::landmarks::{LandmarkFrame, LandmarkSample, Point};
use crate::signals::FrameSignals;
use crate::DmsConfig;

/// Baselines used for the life of one monitoring session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationBaseline {
    /// EAR below this counts as closed (always > 0)
    pub ear_baseline: f64,
    /// MAR above this counts as open mouth (always > 0)
    pub mar_baseline: f64,
    pub reference_gaze_ratio: Option<f64>,
    pub reference_eye_center: Option<Point>,
}

impl CalibrationBaseline {
    /// Uncalibrated baselines from config defaults
    pub fn from_config(config: &DmsConfig) -> Self {
        Self {
            ear_baseline: config.default_ear_baseline,
            mar_baseline: config.default_mar_baseline,
            reference_gaze_ratio: None,
            reference_eye_center: None,
        }
    }
}

impl Default for CalibrationBaseline {
    fn default() -> Self {
        Self::from_config(&DmsConfig::default())
    }
}

/// Incremental accumulator for the calibration window
#[derive(Debug, Clone, Default)]
pub struct Calibrator {
    ear_values: Vec<f64>,
    mar_values: Vec<f64>,
    gaze_ratios: Vec<f64>,
    eye_centers: Vec<Point>,
    skipped: usize,
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

impl Calibrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate one frame; `None` (no face) is counted and skipped
    pub fn observe(&mut self, landmarks: Option<&LandmarkFrame>) {
        let Some(landmarks) = landmarks else {
            self.skipped += 1;
            return;
        };

        let signals = FrameSignals::extract(landmarks);
        self.ear_values.push(signals.ear);
        self.mar_values.push(signals.mar);
        if let Some(gaze) = signals.gaze_ratio {
            self.gaze_ratios.push(gaze);
        }
        if let Some(center) = signals.eye_center {
            self.eye_centers.push(center);
        }
    }

    /// Frames with a face observed so far
    pub fn samples(&self) -> usize {
        self.ear_values.len()
    }

    /// Frames skipped for lack of a face
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Derive the baselines
    pub fn finish(&self, config: &DmsConfig) -> CalibrationBaseline {
        let mut baseline = CalibrationBaseline::from_config(config);

        if let Some(ear) = mean(&self.ear_values) {
            let candidate = ear * config.ear_calibration_factor;
            if candidate > 0.0 {
                baseline.ear_baseline = candidate;
            } else {
                warn!(
                    "Calibrated EAR baseline {:.3} not positive, keeping default {:.3}",
                    candidate, baseline.ear_baseline
                );
            }
        }
        if let Some(mar) = mean(&self.mar_values) {
            baseline.mar_baseline = mar + config.mar_calibration_offset;
        }
        baseline.reference_gaze_ratio = mean(&self.gaze_ratios);
        baseline.reference_eye_center = Point::centroid(&self.eye_centers);

        if self.samples() == 0 {
            warn!(skipped = self.skipped, "No face seen during calibration, using default baselines");
        }
        info!(
            samples = self.samples(),
            skipped = self.skipped,
            ear_baseline = baseline.ear_baseline,
            mar_baseline = baseline.mar_baseline,
            "Calibration complete"
        );
        baseline
    }
}

/// Run calibration over `samples` for `duration_secs` of frame time.
///
/// The window starts at the first sample; the first sample at or past the end
/// of the window is left in `samples`.
pub fn calibrate<I>(samples: &mut Peekable<I>, duration_secs: f64, config: &DmsConfig) -> CalibrationBaseline
where
    I: Iterator<Item = LandmarkSample>,
{
    info!("Running calibration for {:.1} seconds...", duration_secs);
    let mut calibrator = Calibrator::new();

    let Some(start) = samples.peek().map(|s| s.timestamp) else {
        return calibrator.finish(config);
    };

    while let Some(sample) = samples.next_if(|s| s.timestamp - start < duration_secs) {
        calibrator.observe(sample.landmarks.as_ref());
    }

    calibrator.finish(config)
}
