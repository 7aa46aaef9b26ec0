//! Face-mesh landmark types and index tables
//!
//! Coordinates are normalized to the image (`x`, `y` in `[0, 1]`). Indices
//! follow the 478-point face mesh with iris refinement.

use serde::{Deserialize, Serialize};

/// Number of points in a refined face mesh
pub const FACE_MESH_POINTS: usize = 478;

/// Left eye contour, ordered p1..p6: corner, upper, upper, corner, lower, lower
pub const LEFT_EYE: [usize; 6] = [362, 385, 387, 263, 373, 380];

/// Right eye contour, same ordering as [`LEFT_EYE`]
pub const RIGHT_EYE: [usize; 6] = [33, 160, 158, 133, 153, 144];

/// Left iris ring
pub const LEFT_IRIS: [usize; 4] = [474, 475, 476, 477];

/// Right iris ring
pub const RIGHT_IRIS: [usize; 4] = [469, 470, 471, 472];

/// Eye corners plus the iris point used for the gaze ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrisEye {
    pub outer: usize,
    pub inner: usize,
    pub iris: usize,
}

pub const LEFT_IRIS_EYE: IrisEye = IrisEye { outer: 362, inner: 263, iris: LEFT_IRIS[0] };
pub const RIGHT_IRIS_EYE: IrisEye = IrisEye { outer: 133, inner: 33, iris: RIGHT_IRIS[0] };

/// Lip midpoints and mouth corners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouthIndices {
    pub top: usize,
    pub bottom: usize,
    pub left: usize,
    pub right: usize,
}

pub const MOUTH: MouthIndices = MouthIndices { top: 13, bottom: 14, left: 78, right: 308 };

/// 2D point in normalized image coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance
    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Mean of a set of points, `None` when empty
    pub fn centroid<'a, I>(points: I) -> Option<Point>
    where
        I: IntoIterator<Item = &'a Point>,
    {
        let (sum, count) = points
            .into_iter()
            .fold((Point::default(), 0usize), |(acc, n), p| {
                (Point::new(acc.x + p.x, acc.y + p.y), n + 1)
            });
        if count == 0 {
            return None;
        }
        Some(Point::new(sum.x / count as f64, sum.y / count as f64))
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Landmarks of a single face for one video frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkFrame {
    points: Vec<Point>,
}

impl LandmarkFrame {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Point at `index`, `None` when the mesh does not contain it
    pub fn get(&self, index: usize) -> Option<Point> {
        self.points.get(index).copied()
    }

    /// Points at every index, `None` if any is missing
    pub fn get_many<const N: usize>(&self, indices: &[usize; N]) -> Option<[Point; N]> {
        let mut out = [Point::default(); N];
        for (slot, &idx) in out.iter_mut().zip(indices.iter()) {
            *slot = self.get(idx)?;
        }
        Some(out)
    }

    /// Overwrite (or extend the mesh to include) one point
    pub fn set(&mut self, index: usize, point: Point) {
        if index >= self.points.len() {
            self.points.resize(index + 1, Point::default());
        }
        self.points[index] = point;
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }
}

impl From<Vec<Point>> for LandmarkFrame {
    fn from(points: Vec<Point>) -> Self {
        Self::new(points)
    }
}

/// One timestamped frame of landmark input (`landmarks = None` means no face)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkSample {
    /// Frame time in seconds
    pub timestamp: f64,
    pub landmarks: Option<LandmarkFrame>,
}

impl LandmarkSample {
    pub fn new(timestamp: f64, landmarks: Option<LandmarkFrame>) -> Self {
        Self { timestamp, landmarks }
    }
}
