//! Per-frame decision logic
//!
//! Checks run in strict priority order and the first one that produces a
//! verdict ends the frame, so at most one cause is reported per frame:
//! fatigue decay, no face, distraction, eye closure, yawn, fatigue level.

use tracing::{debug, info, warn};

use crate::analysis::{EventKind, FrameVerdict, Status};
use crate::evidence::EvidenceSink;
use crate::geometry::{gaze_ratio, iris_center, mouth_aspect_ratio};
use crate::landmarks::{LandmarkFrame, LEFT_IRIS_EYE, MOUTH, RIGHT_IRIS_EYE};
use crate::signals::mean_ear;
use crate::DmsSession;

/// Fatigue added per confirmed distraction alert
const DISTRACTION_FATIGUE: u8 = 1;
/// Fatigue added per eye-closure event
const EYES_CLOSED_FATIGUE: u8 = 3;
/// Fatigue added per yawn
const YAWN_FATIGUE: u8 = 2;

impl<S: EvidenceSink> DmsSession<S> {
    /// Analyze one frame. `landmarks = None` means no face was detected.
    ///
    /// `now` is the frame time in seconds and must not decrease between calls.
    pub fn analyze(&mut self, landmarks: Option<&LandmarkFrame>, now: f64) -> FrameVerdict {
        if self.state.decay_fatigue(now, self.config.fatigue_decay_secs) {
            debug!(fatigue = self.state.fatigue_score, "Fatigue decayed");
        }

        let Some(landmarks) = landmarks else {
            return FrameVerdict::new(Status::NoFace, self.state.fatigue_score);
        };

        let gaze = gaze_ratio(landmarks, &LEFT_IRIS_EYE, &RIGHT_IRIS_EYE);

        if let Some(verdict) = self.check_distraction(landmarks, gaze, now) {
            return verdict;
        }

        let ear = mean_ear(landmarks);
        let mar = mouth_aspect_ratio(landmarks, &MOUTH);

        if let Some(verdict) = self.check_eye_closure(ear, mar, gaze, now) {
            return verdict;
        }
        if let Some(verdict) = self.check_yawn(ear, mar, gaze, now) {
            return verdict;
        }
        self.check_fatigue_level(ear, mar, gaze, now)
    }

    /// Smoothed iris center farther than the tolerance from the reference.
    /// Always false before calibration or without an iris signal.
    fn is_off_reference(&mut self, landmarks: &LandmarkFrame) -> bool {
        if !self.state.calibrated {
            return false;
        }
        let Some(reference) = self.baseline.reference_eye_center else {
            return false;
        };
        let Some(center) = iris_center(landmarks) else {
            return false;
        };

        let smoothed = self.state.smoothed_eye_center(center);
        smoothed.distance(&reference) > self.config.eye_center_tolerance
    }

    fn check_distraction(
        &mut self,
        landmarks: &LandmarkFrame,
        gaze: Option<f64>,
        now: f64,
    ) -> Option<FrameVerdict> {
        if !self.is_off_reference(landmarks) {
            self.state.clear_distraction();
            return None;
        }

        self.state.consecutive_distraction_frames =
            self.state.consecutive_distraction_frames.saturating_add(1);
        let frames = self.state.consecutive_distraction_frames;
        let since = *self.state.distraction_since.get_or_insert(now);

        let confirmed = now - since > self.config.distraction_secs
            && frames > self.config.distraction_frame_threshold;

        if confirmed {
            if self.throttler.allow_distraction_alert(now) {
                self.capture_evidence(EventKind::Distraction, now);
                self.state.raise_fatigue(DISTRACTION_FATIGUE);
                info!(
                    duration_secs = now - since,
                    frames,
                    fatigue = self.state.fatigue_score,
                    "Distraction alert"
                );
                return Some(
                    FrameVerdict::new(Status::LookAtRoad, self.state.fatigue_score)
                        .with_face(gaze)
                        .with_event(EventKind::Distraction, true),
                );
            }
            debug!(frames, "Distraction persists, alert in cooldown");
            return Some(self.attention_warning(gaze));
        }

        if frames > self.config.distraction_warning_frames {
            debug!(frames, "Gaze off reference");
            return Some(self.attention_warning(gaze));
        }
        None
    }

    /// Soft nudge: no event, no alert
    fn attention_warning(&self, gaze: Option<f64>) -> FrameVerdict {
        FrameVerdict::new(Status::PayAttention, self.state.fatigue_score).with_face(gaze)
    }

    fn check_eye_closure(&mut self, ear: f64, mar: f64, gaze: Option<f64>, now: f64) -> Option<FrameVerdict> {
        if ear >= self.baseline.ear_baseline {
            self.state.eye_closed_since = None;
            return None;
        }

        let since = *self.state.eye_closed_since.get_or_insert(now);
        if now - since <= self.config.eye_closed_secs {
            return None;
        }

        self.state.raise_fatigue(EYES_CLOSED_FATIGUE);
        self.state.eye_closed_since = None;
        self.capture_evidence(EventKind::EyesClosed, now);
        info!(
            ear,
            duration_secs = now - since,
            fatigue = self.state.fatigue_score,
            "Eyes closed"
        );

        Some(
            FrameVerdict::new(Status::EyesClosed, self.state.fatigue_score)
                .with_face(gaze)
                .with_ratios(ear, mar)
                .with_event(EventKind::EyesClosed, true),
        )
    }

    fn check_yawn(&mut self, ear: f64, mar: f64, gaze: Option<f64>, now: f64) -> Option<FrameVerdict> {
        if mar <= self.baseline.mar_baseline {
            self.state.yawn_since = None;
            return None;
        }

        let since = *self.state.yawn_since.get_or_insert(now);
        if now - since <= self.config.yawn_secs {
            return None;
        }

        self.state.raise_fatigue(YAWN_FATIGUE);
        self.state.yawn_since = None;
        info!(mar, fatigue = self.state.fatigue_score, "Yawn detected");

        Some(
            FrameVerdict::new(Status::Yawning, self.state.fatigue_score)
                .with_face(gaze)
                .with_ratios(ear, mar)
                .with_event(EventKind::Yawn, true),
        )
    }

    fn check_fatigue_level(&mut self, ear: f64, mar: f64, gaze: Option<f64>, now: f64) -> FrameVerdict {
        let fatigue = self.state.fatigue_score;

        let (status, event, alert) = if fatigue >= self.config.alert_level {
            self.capture_evidence(EventKind::FatigueAlert, now);
            (Status::Drowsy, EventKind::FatigueAlert, true)
        } else if fatigue >= self.config.warning_level {
            (Status::DrowsyWarning, EventKind::FatigueWarning, false)
        } else {
            (Status::Awake, EventKind::None, false)
        };

        FrameVerdict::new(status, fatigue)
            .with_face(gaze)
            .with_ratios(ear, mar)
            .with_event(event, alert)
    }

    /// Capture evidence if the screenshot cooldown allows it. Failures are
    /// logged and never change the verdict.
    fn capture_evidence(&mut self, event: EventKind, now: f64) {
        if !self.throttler.allow_screenshot(now) {
            debug!(%event, "Screenshot skipped: in cooldown period");
            return;
        }
        if let Err(e) = self.sink.capture(event, now) {
            warn!(%event, "Screenshot failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::evidence::{EvidenceError, EvidenceSink};
    use crate::testing::{face, FaceSpec};
    use crate::*;
    use proptest::prelude::*;

    fn at(frame: u32) -> f64 {
        frame as f64 / 30.0
    }

    /// Records capture calls, optionally failing every one
    #[derive(Debug, Default)]
    struct RecordingSink {
        captures: Vec<(EventKind, f64)>,
        fail: bool,
    }

    impl EvidenceSink for RecordingSink {
        fn capture(&mut self, event: EventKind, timestamp: f64) -> Result<(), EvidenceError> {
            self.captures.push((event, timestamp));
            if self.fail {
                return Err(EvidenceError::NoFrame);
            }
            Ok(())
        }
    }

    fn calibrated_session(fail: bool) -> DmsSession<RecordingSink> {
        let mut session =
            DmsSession::with_evidence_sink(DmsConfig::default(), RecordingSink { fail, ..Default::default() })
                .unwrap();
        let centered = face(FaceSpec::default());
        let mut samples = (0..30)
            .map(|i| LandmarkSample::new(at(i), Some(centered.clone())))
            .peekable();
        session.calibrate_for(&mut samples, 1.0);
        session
    }

    fn looking_away() -> LandmarkFrame {
        face(FaceSpec { gaze_offset: (0.1, 0.0), ..Default::default() })
    }

    #[test]
    fn test_distraction_warning_then_alert() {
        let mut session = calibrated_session(false);
        let away = looking_away();
        let start = 30;

        let first = session.analyze(Some(&away), at(start));
        assert_eq!(first.status, Status::Awake);
        assert!(first.ear > 0.0);

        session.analyze(Some(&away), at(start + 1));
        let warning = session.analyze(Some(&away), at(start + 2));
        assert_eq!(warning.status, Status::PayAttention);
        assert_eq!(warning.event, EventKind::None);
        assert!(!warning.alert_triggered);
        assert_eq!(warning.ear, 0.0);

        let mut alert = None;
        for i in (start + 3)..(start + 130) {
            let verdict = session.analyze(Some(&away), at(i));
            if verdict.alert_triggered {
                alert = Some((at(i), verdict));
                break;
            }
        }

        let (when, verdict) = alert.expect("distraction alert");
        assert_eq!(verdict.event, EventKind::Distraction);
        assert_eq!(verdict.status, Status::LookAtRoad);
        assert_eq!(verdict.fatigue_score, 1);
        assert_eq!(verdict.ear, 0.0);
        assert!(verdict.gaze_ratio.is_some());
        assert!(when - at(start) > 4.0);
        assert_eq!(session.sink().captures, vec![(EventKind::Distraction, when)]);
    }

    #[test]
    fn test_distraction_alert_cooldown() {
        let mut session = calibrated_session(false);
        let away = looking_away();
        let start = 30;

        let mut alerts = Vec::new();
        // 7 seconds off reference
        for i in start..(start + 210) {
            let verdict = session.analyze(Some(&away), at(i));
            if verdict.alert_triggered {
                alerts.push(at(i));
            } else if verdict.event == EventKind::None && i > start + 130 {
                assert_eq!(verdict.status, Status::PayAttention);
            }
        }
        assert_eq!(alerts.len(), 1);
        assert_eq!(session.state().distraction_since(), Some(at(start)));
        assert_eq!(session.state().consecutive_distraction_frames(), 210);

        // Past the cooldown the alert re-fires
        for i in (start + 210)..(start + 300) {
            if session.analyze(Some(&away), at(i)).alert_triggered {
                alerts.push(at(i));
            }
        }
        assert_eq!(alerts.len(), 2);
        assert!(alerts[1] - alerts[0] >= 5.0);
    }

    #[test]
    fn test_return_to_reference_clears_distraction() {
        let mut session = calibrated_session(false);
        let away = looking_away();
        let centered = face(FaceSpec::default());

        for i in 30..40 {
            session.analyze(Some(&away), at(i));
        }
        assert_eq!(session.state().consecutive_distraction_frames(), 10);

        for i in 40..45 {
            session.analyze(Some(&centered), at(i));
        }
        assert_eq!(session.state().consecutive_distraction_frames(), 0);
        assert_eq!(session.state().distraction_since(), None);
    }

    #[test]
    fn test_evidence_failure_keeps_verdict() {
        let mut session = calibrated_session(true);
        let away = looking_away();

        let mut fired = None;
        for i in 30..200 {
            let verdict = session.analyze(Some(&away), at(i));
            if verdict.alert_triggered {
                fired = Some(verdict);
                break;
            }
        }
        let verdict = fired.expect("alert despite failing sink");
        assert_eq!(verdict.event, EventKind::Distraction);
        assert_eq!(session.sink().captures.len(), 1);
    }

    #[test]
    fn test_screenshot_cooldown_spans_event_kinds() {
        let mut session =
            DmsSession::with_evidence_sink(DmsConfig::default(), RecordingSink::default()).unwrap();
        let closed = face(FaceSpec { ear: 0.10, ..Default::default() });
        let open = face(FaceSpec::default());

        // Eye closure fires at ~1.23s and captures
        for i in 0..38 {
            session.analyze(Some(&closed), at(i));
        }
        assert_eq!(session.sink().captures.len(), 1);
        assert_eq!(session.state().fatigue_score(), 3);

        // Push fatigue to the alert level within the screenshot cooldown
        session.state.fatigue_score = 9;
        let verdict = session.analyze(Some(&open), at(40));
        assert_eq!(verdict.event, EventKind::FatigueAlert);
        assert!(verdict.alert_triggered);
        assert_eq!(session.sink().captures.len(), 1);

        // After the cooldown the fatigue alert captures
        session.analyze(Some(&open), at(40 + 150));
        assert_eq!(session.sink().captures.len(), 2);
        assert_eq!(session.sink().captures[1].0, EventKind::FatigueAlert);
    }

    #[test]
    fn test_yawn() {
        let mut session =
            DmsSession::with_evidence_sink(DmsConfig::default(), RecordingSink::default()).unwrap();
        let yawning = face(FaceSpec { mar: 0.6, ..Default::default() });

        let events: Vec<FrameVerdict> = (0..40)
            .map(|i| session.analyze(Some(&yawning), at(i)))
            .filter(|v| v.event == EventKind::Yawn)
            .collect();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].status, Status::Yawning);
        assert!(events[0].alert_triggered);
        assert!((events[0].mar - 0.6).abs() < 1e-9);
        assert_eq!(session.state().fatigue_score(), 2);
        assert!(session.sink().captures.is_empty());
    }

    #[test]
    fn test_one_event_per_frame() {
        let mut session = DmsSession::new(DmsConfig::default()).unwrap();
        let both = face(FaceSpec { ear: 0.10, mar: 0.6, ..Default::default() });

        let mut kinds = Vec::new();
        for i in 0..40 {
            let verdict = session.analyze(Some(&both), at(i));
            if !verdict.event.is_none() {
                kinds.push((i, verdict.event));
            }
        }

        // Yawn crosses its threshold first; closure fires on a later frame
        assert!(kinds.contains(&(31, EventKind::Yawn)) || kinds.contains(&(30, EventKind::Yawn)));
        assert!(kinds.iter().any(|(_, k)| *k == EventKind::EyesClosed));
        for pair in kinds.windows(2) {
            assert_ne!(pair[0].0, pair[1].0);
        }
    }

    #[test]
    fn test_fatigue_levels() {
        let mut session = DmsSession::new(DmsConfig::default()).unwrap();
        let open = face(FaceSpec::default());

        session.state.fatigue_score = 4;
        let verdict = session.analyze(Some(&open), 0.0);
        assert_eq!(verdict.event, EventKind::FatigueWarning);
        assert_eq!(verdict.status, Status::DrowsyWarning);
        assert!(!verdict.alert_triggered);

        session.state.fatigue_score = 8;
        let verdict = session.analyze(Some(&open), 0.1);
        assert_eq!(verdict.event, EventKind::FatigueAlert);
        assert_eq!(verdict.status, Status::Drowsy);
        assert_eq!(verdict.severity, Severity::Critical);
        assert!(verdict.alert_triggered);

        session.state.fatigue_score = 3;
        let verdict = session.analyze(Some(&open), 0.2);
        assert_eq!(verdict.event, EventKind::None);
        assert_eq!(verdict.status, Status::Awake);
    }

    #[test]
    fn test_custom_alert_threshold() {
        let config = DmsConfig::default().with_alert_threshold(5).unwrap();
        let mut session = DmsSession::new(config).unwrap();
        let open = face(FaceSpec::default());

        session.state.fatigue_score = 1;
        assert_eq!(session.analyze(Some(&open), 0.0).event, EventKind::FatigueWarning);
        session.state.fatigue_score = 5;
        assert_eq!(session.analyze(Some(&open), 0.1).event, EventKind::FatigueAlert);
    }

    fn arbitrary_face() -> impl Strategy<Value = Option<FaceSpec>> {
        prop_oneof![
            1 => Just(None),
            6 => (0.0f64..0.5, 0.0f64..0.8, -0.2f64..0.2, -0.2f64..0.2).prop_map(|(ear, mar, dx, dy)| {
                Some(FaceSpec { ear, mar, gaze_offset: (dx, dy) })
            }),
        ]
    }

    proptest! {
        #[test]
        fn fatigue_stays_bounded(
            frames in proptest::collection::vec((arbitrary_face(), 0.0f64..0.5), 1..300),
            calibrate in any::<bool>(),
        ) {
            let mut session = DmsSession::new(DmsConfig::default()).unwrap();
            if calibrate {
                let centered = face(FaceSpec::default());
                let mut samples = std::iter::once(LandmarkSample::new(0.0, Some(centered))).peekable();
                session.calibrate_for(&mut samples, 1.0);
            }

            let mut now = 1.0;
            for (spec, dt) in frames {
                now += dt;
                let landmarks = spec.map(face);
                let verdict = session.analyze(landmarks.as_ref(), now);
                prop_assert!(verdict.fatigue_score <= MAX_FATIGUE);
                prop_assert_eq!(verdict.fatigue_score, session.state().fatigue_score());
            }
        }

        #[test]
        fn uncalibrated_never_distracted(
            offsets in proptest::collection::vec((-0.3f64..0.3, -0.3f64..0.3), 1..400),
        ) {
            let mut session = DmsSession::new(DmsConfig::default()).unwrap();
            for (i, (dx, dy)) in offsets.into_iter().enumerate() {
                let frame = face(FaceSpec { gaze_offset: (dx, dy), ..Default::default() });
                let verdict = session.analyze(Some(&frame), i as f64 / 30.0);
                prop_assert_ne!(verdict.event, EventKind::Distraction);
                prop_assert_ne!(verdict.status, Status::PayAttention);
                prop_assert_ne!(verdict.status, Status::LookAtRoad);
            }
            prop_assert_eq!(session.state().consecutive_distraction_frames(), 0);
        }
    }
}
