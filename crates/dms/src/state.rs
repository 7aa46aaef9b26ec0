//! Driver state tracking

use ring_buffer::RingBuffer;
use serde::{Deserialize, Serialize};

use crate::config::MAX_FATIGUE;
use crate::landmarks::Point;

/// Cross-frame detector state (tracked over time, one owner)
#[derive(Debug, Clone)]
pub struct DetectorState {
    /// Fatigue score in `0..=10`
    pub(crate) fatigue_score: u8,

    /// Start of the current low-EAR run
    pub(crate) eye_closed_since: Option<f64>,

    /// Start of the current high-MAR run
    pub(crate) yawn_since: Option<f64>,

    /// Start of the current off-reference gaze run
    pub(crate) distraction_since: Option<f64>,

    /// Consecutive off-reference frames
    pub(crate) consecutive_distraction_frames: u32,

    /// Recent iris centers for smoothing
    pub(crate) recent_eye_centers: RingBuffer<Point>,

    /// Decay clock; pinned to the current frame while the score is 0
    pub(crate) last_fatigue_decay: Option<f64>,

    /// Whether calibration has completed
    pub(crate) calibrated: bool,
}

impl DetectorState {
    /// Create a fresh state with the given smoothing window
    pub fn new(smoothing_window: usize) -> Self {
        Self {
            fatigue_score: 0,
            eye_closed_since: None,
            yawn_since: None,
            distraction_since: None,
            consecutive_distraction_frames: 0,
            recent_eye_centers: RingBuffer::new(smoothing_window),
            last_fatigue_decay: None,
            calibrated: false,
        }
    }

    pub fn fatigue_score(&self) -> u8 {
        self.fatigue_score
    }

    pub fn eye_closed_since(&self) -> Option<f64> {
        self.eye_closed_since
    }

    pub fn yawn_since(&self) -> Option<f64> {
        self.yawn_since
    }

    pub fn distraction_since(&self) -> Option<f64> {
        self.distraction_since
    }

    pub fn consecutive_distraction_frames(&self) -> u32 {
        self.consecutive_distraction_frames
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibrated
    }

    /// Raise the fatigue score, saturating at 10
    pub(crate) fn raise_fatigue(&mut self, amount: u8) {
        self.fatigue_score = self.fatigue_score.saturating_add(amount).min(MAX_FATIGUE);
    }

    /// Lower the fatigue score by one if a full decay interval has elapsed.
    /// Returns whether the score dropped.
    pub(crate) fn decay_fatigue(&mut self, now: f64, interval_secs: f64) -> bool {
        let last = match self.last_fatigue_decay {
            Some(last) if self.fatigue_score > 0 => last,
            _ => {
                self.last_fatigue_decay = Some(now);
                return false;
            }
        };

        if now - last >= interval_secs {
            self.fatigue_score -= 1;
            self.last_fatigue_decay = Some(last + interval_secs);
            true
        } else {
            false
        }
    }

    /// Mean of the smoothing window after adding `center`
    pub(crate) fn smoothed_eye_center(&mut self, center: Point) -> Point {
        self.recent_eye_centers.push(center);
        Point::centroid(self.recent_eye_centers.iter()).unwrap_or(center)
    }

    /// Gaze back on reference: drop the distraction run
    pub(crate) fn clear_distraction(&mut self) {
        self.consecutive_distraction_frames = 0;
        self.distraction_since = None;
    }

    /// Snapshot for logging or persistence by the caller
    pub fn snapshot(&self) -> DetectorSnapshot {
        DetectorSnapshot {
            fatigue_score: self.fatigue_score,
            eye_closed_since: self.eye_closed_since,
            yawn_since: self.yawn_since,
            distraction_since: self.distraction_since,
            consecutive_distraction_frames: self.consecutive_distraction_frames,
            calibrated: self.calibrated,
        }
    }

    /// Reset state (on driver change), keeping the smoothing capacity
    pub fn reset(&mut self) {
        *self = Self::new(self.recent_eye_centers.capacity());
    }
}

impl Default for DetectorState {
    fn default() -> Self {
        Self::new(ring_buffer::DEFAULT_CAPACITY)
    }
}

/// Serializable view of [`DetectorState`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectorSnapshot {
    pub fatigue_score: u8,
    pub eye_closed_since: Option<f64>,
    pub yawn_since: Option<f64>,
    pub distraction_since: Option<f64>,
    pub consecutive_distraction_frames: u32,
    pub calibrated: bool,
}
