//! Synthetic face meshes for unit tests

use crate::landmarks::{
    LandmarkFrame, Point, FACE_MESH_POINTS, LEFT_EYE, LEFT_IRIS, MOUTH, RIGHT_EYE, RIGHT_IRIS,
};

/// Geometry of a synthetic face
#[derive(Debug, Clone, Copy)]
pub struct FaceSpec {
    pub ear: f64,
    pub mar: f64,
    /// Shift of both irises from the eye centers
    pub gaze_offset: (f64, f64),
}

impl Default for FaceSpec {
    fn default() -> Self {
        Self { ear: 0.30, mar: 0.10, gaze_offset: (0.0, 0.0) }
    }
}

const EYE_WIDTH: f64 = 0.1;
const EYE_Y: f64 = 0.4;

fn place_eye(frame: &mut LandmarkFrame, eye: &[usize; 6], corner_x: f64, ear: f64) {
    let [p1, p2, p3, p4, p5, p6] = *eye;
    let half_open = ear * EYE_WIDTH / 2.0;
    let x1 = corner_x + EYE_WIDTH / 3.0;
    let x2 = corner_x + 2.0 * EYE_WIDTH / 3.0;

    frame.set(p1, Point::new(corner_x, EYE_Y));
    frame.set(p4, Point::new(corner_x + EYE_WIDTH, EYE_Y));
    frame.set(p2, Point::new(x1, EYE_Y - half_open));
    frame.set(p6, Point::new(x1, EYE_Y + half_open));
    frame.set(p3, Point::new(x2, EYE_Y - half_open));
    frame.set(p5, Point::new(x2, EYE_Y + half_open));
}

/// Build a full mesh whose EAR/MAR match `spec`; irises sit at
/// `(0.35, 0.4)` and `(0.65, 0.4)` plus the gaze offset.
pub fn face(spec: FaceSpec) -> LandmarkFrame {
    let mut frame = LandmarkFrame::new(vec![Point::new(0.5, 0.5); FACE_MESH_POINTS]);

    // Left eye spans x 0.60..0.70 (outer 362 -> inner 263), right eye 0.30..0.40
    place_eye(&mut frame, &LEFT_EYE, 0.60, spec.ear);
    place_eye(&mut frame, &RIGHT_EYE, 0.30, spec.ear);

    let (dx, dy) = spec.gaze_offset;
    for idx in LEFT_IRIS {
        frame.set(idx, Point::new(0.65 + dx, EYE_Y + dy));
    }
    for idx in RIGHT_IRIS {
        frame.set(idx, Point::new(0.35 + dx, EYE_Y + dy));
    }

    let half_gap = spec.mar * 0.1 / 2.0;
    frame.set(MOUTH.left, Point::new(0.45, 0.72));
    frame.set(MOUTH.right, Point::new(0.55, 0.72));
    frame.set(MOUTH.top, Point::new(0.5, 0.72 - half_gap));
    frame.set(MOUTH.bottom, Point::new(0.5, 0.72 + half_gap));

    frame
}
