//! Session statistics aggregated from verdicts

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::analysis::{EventKind, FrameVerdict};

/// Running totals for one monitoring session
#[derive(Debug, Clone, Default)]
pub struct SessionStats {
    frames: u64,
    face_frames: u64,
    alerts: u64,
    events: BTreeMap<EventKind, u64>,
    peak_fatigue: u8,
    fatigue_sum: u64,
    ear_sum: f64,
    mar_sum: f64,
    first_timestamp: Option<f64>,
    last_timestamp: Option<f64>,
}

/// Serializable end-of-session summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub frames: u64,
    pub face_frames: u64,
    pub alerts: u64,
    pub events: BTreeMap<EventKind, u64>,
    pub peak_fatigue: u8,
    pub avg_fatigue: f64,
    /// Mean EAR over frames with a face
    pub avg_ear: f64,
    /// Mean MAR over frames with a face
    pub avg_mar: f64,
    pub duration_secs: f64,
}

impl SessionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one verdict into the totals
    pub fn record(&mut self, verdict: &FrameVerdict, timestamp: f64) {
        self.frames += 1;
        self.first_timestamp.get_or_insert(timestamp);
        self.last_timestamp = Some(timestamp);

        self.fatigue_sum += u64::from(verdict.fatigue_score);
        self.peak_fatigue = self.peak_fatigue.max(verdict.fatigue_score);

        if verdict.face_detected {
            self.face_frames += 1;
            self.ear_sum += verdict.ear;
            self.mar_sum += verdict.mar;
        }
        if verdict.alert_triggered {
            self.alerts += 1;
        }
        if !verdict.event.is_none() {
            *self.events.entry(verdict.event).or_insert(0) += 1;
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn alerts(&self) -> u64 {
        self.alerts
    }

    pub fn event_count(&self, kind: EventKind) -> u64 {
        self.events.get(&kind).copied().unwrap_or(0)
    }

    pub fn average_fatigue(&self) -> f64 {
        if self.frames == 0 {
            return 0.0;
        }
        self.fatigue_sum as f64 / self.frames as f64
    }

    pub fn duration_secs(&self) -> f64 {
        match (self.first_timestamp, self.last_timestamp) {
            (Some(first), Some(last)) => (last - first).max(0.0),
            _ => 0.0,
        }
    }

    pub fn summary(&self) -> SessionSummary {
        let face_frames = self.face_frames.max(1) as f64;
        SessionSummary {
            frames: self.frames,
            face_frames: self.face_frames,
            alerts: self.alerts,
            events: self.events.clone(),
            peak_fatigue: self.peak_fatigue,
            avg_fatigue: self.average_fatigue(),
            avg_ear: self.ear_sum / face_frames,
            avg_mar: self.mar_sum / face_frames,
            duration_secs: self.duration_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Status;

    fn verdict(fatigue: u8, event: EventKind, alert: bool) -> FrameVerdict {
        FrameVerdict::new(Status::Awake, fatigue)
            .with_face(None)
            .with_ratios(0.3, 0.1)
            .with_event(event, alert)
    }

    #[test]
    fn test_empty_summary() {
        let summary = SessionStats::new().summary();
        assert_eq!(summary.frames, 0);
        assert_eq!(summary.avg_fatigue, 0.0);
        assert_eq!(summary.avg_ear, 0.0);
        assert_eq!(summary.duration_secs, 0.0);
    }

    #[test]
    fn test_aggregation() {
        let mut stats = SessionStats::new();
        stats.record(&verdict(0, EventKind::None, false), 10.0);
        stats.record(&verdict(3, EventKind::EyesClosed, true), 10.5);
        stats.record(&FrameVerdict::new(Status::NoFace, 3), 11.0);
        stats.record(&verdict(5, EventKind::FatigueWarning, false), 12.0);

        let summary = stats.summary();
        assert_eq!(summary.frames, 4);
        assert_eq!(summary.face_frames, 3);
        assert_eq!(summary.alerts, 1);
        assert_eq!(summary.peak_fatigue, 5);
        assert!((summary.avg_fatigue - 11.0 / 4.0).abs() < 1e-9);
        assert!((summary.avg_ear - 0.3).abs() < 1e-9);
        assert!((summary.duration_secs - 2.0).abs() < 1e-9);
        assert_eq!(stats.event_count(EventKind::EyesClosed), 1);
        assert_eq!(stats.event_count(EventKind::Yawn), 0);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["events"]["eyes_closed"], 1);
        assert_eq!(json["events"]["fatigue_warning"], 1);
    }
}
