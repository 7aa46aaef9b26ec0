//! Recorded landmark streams (JSON lines)
//!
//! One frame per line:
//! `{"t": 12.5, "landmarks": [[0.51, 0.42], ...], "frame": "frames/000125.png"}`.
//! `landmarks` is `null` or absent when no face was found; `frame` is optional.

use anyhow::{Context, Result};
use dms::{LandmarkFrame, LandmarkSample, Point};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// One recorded frame
#[derive(Debug, Clone, Deserialize)]
pub struct RecordedFrame {
    /// Frame time (seconds)
    pub t: f64,
    #[serde(default)]
    pub landmarks: Option<Vec<[f64; 2]>>,
    /// Camera image for evidence capture
    #[serde(default)]
    pub frame: Option<PathBuf>,
}

impl RecordedFrame {
    pub fn landmark_frame(&self) -> Option<LandmarkFrame> {
        self.landmarks.as_ref().map(|points| {
            points
                .iter()
                .map(|&[x, y]| Point::new(x, y))
                .collect::<Vec<_>>()
                .into()
        })
    }

    pub fn sample(&self) -> LandmarkSample {
        LandmarkSample::new(self.t, self.landmark_frame())
    }
}

/// Parse a recording; blank lines and `#` comments are skipped
pub fn parse_recording(text: &str) -> Result<Vec<RecordedFrame>> {
    let mut frames = Vec::new();
    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let frame: RecordedFrame = serde_json::from_str(line)
            .with_context(|| format!("invalid frame on line {}", number + 1))?;
        frames.push(frame);
    }
    Ok(frames)
}

/// Read and parse a recording file
pub async fn load_recording(path: &Path) -> Result<Vec<RecordedFrame>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read recording {}", path.display()))?;
    parse_recording(&text)
}
