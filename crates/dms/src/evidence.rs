//! Evidence capture sinks
//!
//! The detector decides *when* evidence is captured; a sink decides *what*
//! is written. Capture failures are reported to the detector, which logs them
//! and keeps its verdict.

use chrono::{DateTime, Utc};
use image::RgbImage;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::analysis::EventKind;

/// Evidence capture errors
#[derive(Error, Debug)]
pub enum EvidenceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("No frame staged for capture")]
    NoFrame,

    #[error("Timestamp {0} cannot be used for a file name")]
    Timestamp(f64),
}

/// Destination for evidence captured on alerting events
pub trait EvidenceSink {
    /// Persist evidence for `event` at frame time `timestamp` (seconds)
    fn capture(&mut self, event: EventKind, timestamp: f64) -> Result<(), EvidenceError>;
}

/// Discards all evidence
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEvidence;

impl EvidenceSink for NoEvidence {
    fn capture(&mut self, _event: EventKind, _timestamp: f64) -> Result<(), EvidenceError> {
        Ok(())
    }
}

/// Writes the staged camera frame as `<label>_<YYYYmmdd_HHMMSS>.jpg`
#[derive(Debug)]
pub struct ImageEvidenceWriter {
    dir: PathBuf,
    staged: Option<RgbImage>,
    written: Vec<PathBuf>,
    /// Added to frame timestamps when naming files
    epoch_offset: f64,
}

impl ImageEvidenceWriter {
    /// Create the writer, creating `dir` if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, EvidenceError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            staged: None,
            written: Vec::new(),
            epoch_offset: 0.0,
        })
    }

    /// Name files by `epoch + timestamp`, for streams with relative timestamps
    pub fn with_epoch_offset(mut self, epoch: f64) -> Self {
        self.epoch_offset = epoch;
        self
    }

    /// Stage the frame that the next capture will write
    pub fn stage(&mut self, frame: RgbImage) {
        self.staged = Some(frame);
    }

    /// Drop the staged frame
    pub fn clear_stage(&mut self) {
        self.staged = None;
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Files written so far
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// File name for an event at `timestamp`
    pub fn file_name(event: EventKind, timestamp: f64) -> Result<String, EvidenceError> {
        let secs = timestamp.floor();
        let nanos = ((timestamp - secs) * 1e9) as u32;
        let time: DateTime<Utc> = DateTime::from_timestamp(secs as i64, nanos)
            .filter(|_| timestamp.is_finite())
            .ok_or(EvidenceError::Timestamp(timestamp))?;
        Ok(format!("{}_{}.jpg", event.evidence_label(), time.format("%Y%m%d_%H%M%S")))
    }
}

impl EvidenceSink for ImageEvidenceWriter {
    fn capture(&mut self, event: EventKind, timestamp: f64) -> Result<(), EvidenceError> {
        let frame = self.staged.as_ref().ok_or(EvidenceError::NoFrame)?;
        let path = self.dir.join(Self::file_name(event, timestamp + self.epoch_offset)?);
        frame.save(&path)?;
        info!("Evidence saved to {}", path.display());
        self.written.push(path);
        Ok(())
    }
}
