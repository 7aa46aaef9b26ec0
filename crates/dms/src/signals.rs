//! Per-frame signal extraction

use serde::{Deserialize, Serialize};

use crate::geometry::{eye_aspect_ratio, gaze_ratio, iris_center, mouth_aspect_ratio};
use crate::landmarks::{LandmarkFrame, Point, LEFT_EYE, LEFT_IRIS_EYE, MOUTH, RIGHT_EYE, RIGHT_IRIS_EYE};

/// Instantaneous geometry of one face
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameSignals {
    /// Mean eye-aspect ratio of both eyes
    pub ear: f64,
    /// Mouth-aspect ratio
    pub mar: f64,
    /// Mean iris position between eye corners
    pub gaze_ratio: Option<f64>,
    /// Mean of all iris points
    pub eye_center: Option<Point>,
}

impl FrameSignals {
    /// Extract every signal from one landmark frame
    pub fn extract(landmarks: &LandmarkFrame) -> Self {
        Self {
            ear: mean_ear(landmarks),
            mar: mouth_aspect_ratio(landmarks, &MOUTH),
            gaze_ratio: gaze_ratio(landmarks, &LEFT_IRIS_EYE, &RIGHT_IRIS_EYE),
            eye_center: iris_center(landmarks),
        }
    }
}

/// Mean of left and right eye-aspect ratios
pub fn mean_ear(landmarks: &LandmarkFrame) -> f64 {
    (eye_aspect_ratio(landmarks, &LEFT_EYE) + eye_aspect_ratio(landmarks, &RIGHT_EYE)) / 2.0
}
