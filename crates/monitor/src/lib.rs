//! Fatigue Monitor
//!
//! Reference caller for the `dms` crate: replays a recorded landmark stream
//! through one monitoring session, logging every alert and returning the
//! session summary.

pub mod recording;
pub mod settings;

use anyhow::{Context, Result};
use dms::{DmsSession, EvidenceSink, ImageEvidenceWriter, NoEvidence, SessionStats, SessionSummary};
use std::path::Path;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

pub use recording::{load_recording, parse_recording, RecordedFrame};
pub use settings::MonitorSettings;

/// Initialize logging
pub fn init_logging(level: Level, json: bool) -> Result<()> {
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    let result = if json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    result.context("Failed to set tracing subscriber")
}

/// Sinks that can take a camera frame from disk before analysis
pub trait StageFrame {
    fn stage_path(&mut self, path: &Path);

    /// The current frame has no image; nothing may be captured for it
    fn clear_frame(&mut self);
}

impl StageFrame for NoEvidence {
    fn stage_path(&mut self, _path: &Path) {}

    fn clear_frame(&mut self) {}
}

impl StageFrame for ImageEvidenceWriter {
    fn stage_path(&mut self, path: &Path) {
        match image::open(path) {
            Ok(img) => self.stage(img.to_rgb8()),
            Err(e) => {
                warn!("Failed to load frame {}: {}", path.display(), e);
                self.clear_stage();
            }
        }
    }

    fn clear_frame(&mut self) {
        self.clear_stage();
    }
}

/// Replay a recording file with the given settings
pub async fn run_replay(settings: &MonitorSettings, recording: &Path) -> Result<SessionSummary> {
    let config = settings.dms_config()?;
    let frames = load_recording(recording).await?;
    info!("Loaded {} frames from {}", frames.len(), recording.display());

    match &settings.evidence_dir {
        Some(dir) => {
            let mut writer = ImageEvidenceWriter::new(dir)
                .with_context(|| format!("cannot use evidence directory {}", dir.display()))?;
            if let Some(epoch) = settings.recording_epoch {
                writer = writer.with_epoch_offset(epoch);
            }
            replay(DmsSession::with_evidence_sink(config, writer)?, &frames)
        }
        None => replay(DmsSession::new(config)?, &frames),
    }
}

/// Calibrate on the head of `frames`, then analyze the rest
pub fn replay<S>(mut session: DmsSession<S>, frames: &[RecordedFrame]) -> Result<SessionSummary>
where
    S: EvidenceSink + StageFrame,
{
    let mut samples = frames.iter().map(RecordedFrame::sample).peekable();
    let baseline = session.calibrate(&mut samples);
    let monitored = samples.count();
    info!(
        ear_baseline = baseline.ear_baseline,
        mar_baseline = baseline.mar_baseline,
        calibration_frames = frames.len() - monitored,
        "Calibration applied"
    );

    let mut stats = SessionStats::new();
    for frame in &frames[frames.len() - monitored..] {
        match &frame.frame {
            Some(path) => session.sink_mut().stage_path(path),
            None => session.sink_mut().clear_frame(),
        }

        let landmarks = frame.landmark_frame();
        let verdict = session.analyze(landmarks.as_ref(), frame.t);

        if verdict.alert_triggered {
            info!(
                t = frame.t,
                event = %verdict.event,
                fatigue = verdict.fatigue_score,
                state = ?session.state().snapshot(),
                "ALERT: {}",
                verdict.status
            );
        } else {
            debug!(t = frame.t, ear = verdict.ear, mar = verdict.mar, "{}", verdict.status);
        }
        stats.record(&verdict, frame.t);
    }

    Ok(stats.summary())
}
