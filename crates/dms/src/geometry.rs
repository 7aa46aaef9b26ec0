//! Landmark geometry: eye, mouth, and gaze ratios
//!
//! All functions are pure and never fail: a missing landmark or a degenerate
//! reference segment yields the documented neutral value instead.

use crate::landmarks::{IrisEye, LandmarkFrame, MouthIndices, Point, LEFT_IRIS, RIGHT_IRIS};

/// Segments shorter than this are treated as degenerate
pub const MIN_SEGMENT: f64 = 1e-6;

/// Euclidean distance in normalized coordinates
pub fn point_distance(p1: &Point, p2: &Point) -> f64 {
    p1.distance(p2)
}

/// Eye-aspect ratio `(|p2-p6| + |p3-p5|) / (2 * |p1-p4|)`, clamped to `[0, 1]`.
///
/// Returns `0.0` (closed-like) when an index is missing or the eye width is
/// degenerate.
pub fn eye_aspect_ratio(landmarks: &LandmarkFrame, eye: &[usize; 6]) -> f64 {
    let Some([p1, p2, p3, p4, p5, p6]) = landmarks.get_many(eye) else {
        return 0.0;
    };

    let h = point_distance(&p1, &p4);
    if h < MIN_SEGMENT {
        return 0.0;
    }
    let v1 = point_distance(&p2, &p6);
    let v2 = point_distance(&p3, &p5);

    ((v1 + v2) / (2.0 * h)).clamp(0.0, 1.0)
}

/// Mouth-aspect ratio: lip opening over mouth width.
///
/// Returns `0.0` when an index is missing or the width is degenerate.
pub fn mouth_aspect_ratio(landmarks: &LandmarkFrame, mouth: &MouthIndices) -> f64 {
    let Some([top, bottom, left, right]) =
        landmarks.get_many(&[mouth.top, mouth.bottom, mouth.left, mouth.right])
    else {
        return 0.0;
    };

    let h = point_distance(&left, &right);
    if h <= MIN_SEGMENT {
        return 0.0;
    }
    point_distance(&top, &bottom) / h
}

/// Iris position along one eye: distance(iris, outer) / distance(outer, inner)
fn eye_gaze_position(landmarks: &LandmarkFrame, eye: &IrisEye) -> Option<f64> {
    let [outer, inner, iris] = landmarks.get_many(&[eye.outer, eye.inner, eye.iris])?;
    let width = point_distance(&outer, &inner);
    if width < MIN_SEGMENT {
        return None;
    }
    Some(point_distance(&iris, &outer) / width)
}

/// Mean iris position of both eyes, `None` if either eye gives no signal
pub fn gaze_ratio(landmarks: &LandmarkFrame, left: &IrisEye, right: &IrisEye) -> Option<f64> {
    let r = eye_gaze_position(landmarks, right)?;
    let l = eye_gaze_position(landmarks, left)?;
    Some((l + r) / 2.0)
}

/// Mean of all eight iris points, `None` if any is missing
pub fn iris_center(landmarks: &LandmarkFrame) -> Option<Point> {
    let left = landmarks.get_many(&LEFT_IRIS)?;
    let right = landmarks.get_many(&RIGHT_IRIS)?;
    Point::centroid(left.iter().chain(right.iter()))
}
