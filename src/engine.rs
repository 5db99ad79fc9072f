// src/engine.rs - Training session: one engine instance per exercise session
use crate::classifier::{classify, measure, FormAssessment, FormClass};
use crate::diagnostics::{FrameTiming, PerformanceMetrics};
use crate::error::EngineError;
use crate::geometry::{JointAngle, UndeterminedReason};
use crate::landmarks::{select_pose, DetectedPose};
use crate::profile::ExerciseProfile;
use crate::reps::{RepCounter, RepCounterState, RepEvent};
use crate::throttle::{Clock, FeedbackThrottler, SystemClock, DEFAULT_FEEDBACK_INTERVAL_MS};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

/// A pose needs more than five keypoints to count as a person.
pub const DEFAULT_MIN_KEYPOINTS: usize = 6;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub feedback_interval_ms: u64,
    pub min_keypoints: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            feedback_interval_ms: DEFAULT_FEEDBACK_INTERVAL_MS,
            min_keypoints: DEFAULT_MIN_KEYPOINTS,
        }
    }
}

/// Everything the engine emits for one detector callback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameReport {
    pub frame: u64,
    pub timestamp_ms: u64,
    pub assessment: FormAssessment,
    pub feedback: String,
    pub reps: RepCounterState,
    pub rep_event: Option<RepEvent>,
    pub timing: FrameTiming,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub exercise: String,
    pub started_at: DateTime<Utc>,
    pub frames: u64,
    pub rep_count: u32,
}

/// Owns all per-session state. Switching exercises means building a new
/// session; the profile cannot be swapped in place.
pub struct TrainingSession<C: Clock = SystemClock> {
    id: Uuid,
    started_at: DateTime<Utc>,
    profile: ExerciseProfile,
    config: EngineConfig,
    clock: C,
    throttler: FeedbackThrottler,
    reps: RepCounter,
    metrics: PerformanceMetrics,
    frames: u64,
}

impl TrainingSession<SystemClock> {
    pub fn new(profile: ExerciseProfile, config: EngineConfig) -> Result<Self, EngineError> {
        Self::with_clock(profile, config, SystemClock)
    }
}

impl<C: Clock> TrainingSession<C> {
    pub fn with_clock(
        profile: ExerciseProfile,
        config: EngineConfig,
        clock: C,
    ) -> Result<Self, EngineError> {
        profile.validate()?;
        if config.min_keypoints == 0 {
            return Err(EngineError::InvalidConfig(
                "min_keypoints must be at least 1".to_string(),
            ));
        }

        let id = Uuid::new_v4();
        info!(session_id = %id, exercise = %profile.exercise, "training session started");

        Ok(Self {
            id,
            started_at: Utc::now(),
            throttler: FeedbackThrottler::new(config.feedback_interval_ms),
            reps: RepCounter::new(profile.reps),
            metrics: PerformanceMetrics::new(),
            frames: 0,
            profile,
            config,
            clock,
        })
    }

    /// Process one detector callback. Never fails: missing or malformed
    /// input degrades the assessment instead.
    pub fn on_frame(&mut self, poses: &[DetectedPose]) -> FrameReport {
        let now = self.clock.now_ms();
        self.frames += 1;
        let timing = self.metrics.on_frame(now);

        let Some(frame) = select_pose(poses, self.config.min_keypoints) else {
            return self.report(now, FormAssessment::no_person(now), None, timing);
        };

        let angles = measure(frame, &self.profile);
        let profile = &self.profile;
        let assessment = self
            .throttler
            .throttle(now, || classify(&angles, profile, now));

        let sample = angles
            .get(&self.profile.rep_angle)
            .copied()
            .unwrap_or(JointAngle::Undetermined(UndeterminedReason::MissingLandmark));
        let rep_event = self.reps.update(sample);

        match rep_event {
            Some(RepEvent::Completed { rep_count }) => {
                info!(session_id = %self.id, rep_count, "rep completed");
            }
            Some(RepEvent::Descended) => {
                debug!(session_id = %self.id, angle = %sample, "entered bottom phase");
            }
            None => {}
        }

        self.report(now, assessment, rep_event, timing)
    }

    fn report(
        &self,
        now: u64,
        assessment: FormAssessment,
        rep_event: Option<RepEvent>,
        timing: FrameTiming,
    ) -> FrameReport {
        debug!(
            frame = self.frames,
            class = %assessment.classification,
            reps = self.reps.state().rep_count,
            "frame processed"
        );
        FrameReport {
            frame: self.frames,
            timestamp_ms: now,
            feedback: self.feedback_for(assessment.classification).to_string(),
            assessment,
            reps: self.reps.state(),
            rep_event,
            timing,
        }
    }

    pub fn feedback_for(&self, class: FormClass) -> &str {
        self.profile.feedback.message(class)
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.id,
            exercise: self.profile.exercise.clone(),
            started_at: self.started_at,
            frames: self.frames,
            rep_count: self.reps.state().rep_count,
        }
    }

    pub fn state(&self) -> RepCounterState {
        self.reps.state()
    }

    pub fn profile(&self) -> &ExerciseProfile {
        &self.profile
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn session_id(&self) -> Uuid {
        self.id
    }

    pub fn metrics(&self) -> &PerformanceMetrics {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::LandmarkFrame;
    use crate::profile::RepThresholds;
    use crate::reps::RepPhase;
    use crate::throttle::ManualClock;

    /// Left-side squat pose with the knee bent to `knee` degrees and the hip
    /// at 90 degrees.
    fn squat_pose(knee: f64) -> DetectedPose {
        let (kx, ky) = (0.5, 0.6);
        let (hx, hy) = (0.5, 0.4);
        let rad = knee.to_radians();
        let ankle = (kx + 0.2 * rad.sin(), ky - 0.2 * rad.cos());
        let frame = LandmarkFrame::new()
            .with("nose", 0.3, 0.05)
            .with("leftShoulder", 0.3, 0.4)
            .with("leftHip", hx, hy)
            .with("leftKnee", kx, ky)
            .with("leftAnkle", ankle.0, ankle.1)
            .with("leftFootIndex", ankle.0 + 0.05, ankle.1);
        DetectedPose::new(frame).with_score(0.9)
    }

    fn session(clock: &ManualClock) -> TrainingSession<ManualClock> {
        let profile = ExerciseProfile::builtin("squat").unwrap();
        TrainingSession::with_clock(profile, EngineConfig::default(), clock.clone()).unwrap()
    }

    #[test]
    fn empty_payload_is_no_person_and_keeps_reps() {
        let clock = ManualClock::new(0);
        let mut session = session(&clock);

        session.on_frame(&[squat_pose(60.0)]);
        assert_eq!(session.state().phase, RepPhase::Down);

        clock.advance(33);
        let report = session.on_frame(&[]);
        assert_eq!(report.assessment.classification, FormClass::NoPerson);
        assert_eq!(report.feedback, "No person detected");
        assert_eq!(report.reps.phase, RepPhase::Down);
        assert_eq!(report.rep_event, None);
    }

    #[test]
    fn sparse_pose_counts_as_no_person() {
        let clock = ManualClock::new(0);
        let mut session = session(&clock);
        let sparse = DetectedPose::new(LandmarkFrame::new().with("leftKnee", 0.5, 0.5));
        let report = session.on_frame(&[sparse]);
        assert_eq!(report.assessment.classification, FormClass::NoPerson);
    }

    #[test]
    fn all_nan_pose_is_no_person() {
        let clock = ManualClock::new(0);
        let mut session = session(&clock);
        let mut frame = LandmarkFrame::new();
        for key in ["leftShoulder", "leftHip", "leftKnee", "leftAnkle", "leftFootIndex", "nose"] {
            frame.insert(key, f64::NAN, f64::NAN);
        }
        let report = session.on_frame(&[DetectedPose::new(frame).with_score(0.9)]);
        assert_eq!(report.assessment.classification, FormClass::NoPerson);
        assert_eq!(report.reps, RepCounterState::default());
    }

    #[test]
    fn squat_at_target_is_perfect() {
        let clock = ManualClock::new(0);
        let mut session = session(&clock);
        let report = session.on_frame(&[squat_pose(90.0)]);
        assert_eq!(report.assessment.classification, FormClass::Perfect);
        assert_eq!(report.feedback, "Perfect squat form! Keep it up!");
        let knee = report.assessment.debug_angles["knee"].degrees().unwrap();
        assert!((knee - 90.0).abs() < 1e-6);
    }

    #[test]
    fn missing_foot_is_undetected_but_reps_still_track() {
        let clock = ManualClock::new(0);
        let mut session = session(&clock);
        let mut pose = squat_pose(60.0);
        let mut frame = LandmarkFrame::new();
        for (key, kp) in pose.keypoints.keypoints() {
            if key != "leftFootIndex" {
                frame.insert(key.clone(), kp.x, kp.y);
            }
        }
        frame.insert("rightEar", 0.3, 0.05);
        pose.keypoints = frame;

        let report = session.on_frame(&[pose]);
        assert_eq!(report.assessment.classification, FormClass::Undetected);
        assert_eq!(report.reps.phase, RepPhase::Down);
    }

    #[test]
    fn throttled_feedback_does_not_hold_back_reps() {
        let clock = ManualClock::new(0);
        let mut session = session(&clock);

        let first = session.on_frame(&[squat_pose(90.0)]);
        assert_eq!(first.assessment.classification, FormClass::Perfect);

        clock.advance(100);
        let second = session.on_frame(&[squat_pose(60.0)]);
        assert_eq!(second.assessment, first.assessment);
        assert_eq!(second.rep_event, Some(RepEvent::Descended));

        clock.advance(100);
        let third = session.on_frame(&[squat_pose(170.0)]);
        assert_eq!(third.assessment, first.assessment);
        assert_eq!(third.rep_event, Some(RepEvent::Completed { rep_count: 1 }));

        clock.advance(100);
        let fourth = session.on_frame(&[squat_pose(170.0)]);
        assert_eq!(fourth.assessment.classification, FormClass::Incorrect);
    }

    #[test]
    fn invalid_profile_is_rejected_at_construction() {
        let mut profile = ExerciseProfile::builtin("squat").unwrap();
        profile.reps = RepThresholds {
            down_enter: 120.0,
            up_exit: 100.0,
        };
        let err = TrainingSession::new(profile, EngineConfig::default()).err().unwrap();
        assert!(matches!(err, EngineError::InvalidProfile(_)));
    }

    #[test]
    fn zero_min_keypoints_is_rejected() {
        let profile = ExerciseProfile::builtin("squat").unwrap();
        let config = EngineConfig {
            min_keypoints: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            TrainingSession::new(profile, config),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn summary_reports_reps_and_frames() {
        let clock = ManualClock::new(0);
        let mut session = session(&clock);
        for knee in [170.0, 60.0, 170.0, 60.0, 170.0] {
            session.on_frame(&[squat_pose(knee)]);
            clock.advance(33);
        }
        let summary = session.summary();
        assert_eq!(summary.rep_count, 2);
        assert_eq!(summary.frames, 5);
        assert_eq!(summary.exercise, "Squat");
        assert_eq!(summary.session_id, session.session_id());
    }
}
