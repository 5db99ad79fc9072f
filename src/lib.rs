// src/lib.rs
//! Exercise form analysis from pose landmarks.
//!
//! Each detector callback flows through [`TrainingSession::on_frame`]: joints
//! are resolved with left/right fallback, joint angles are measured, the
//! form tier is classified against the session's [`ExerciseProfile`] (rate
//! limited by the feedback throttler) and the rep counter advances on the
//! profile's tracked angle.

pub mod classifier;
pub mod data;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod landmarks;
pub mod profile;
pub mod replay;
pub mod reps;
pub mod throttle;

pub use classifier::{classify, measure, FormAssessment, FormClass};
pub use engine::{EngineConfig, FrameReport, SessionSummary, TrainingSession};
pub use error::{EngineError, ProfileError};
pub use geometry::{angle_at, JointAngle, UndeterminedReason};
pub use landmarks::{resolve, DetectedPose, Joint, LandmarkFrame, Point2, Side};
pub use profile::{ExerciseProfile, RepThresholds, ToleranceBands};
pub use reps::{RepCounter, RepCounterState, RepEvent, RepPhase};
pub use throttle::{Clock, FeedbackThrottler, ManualClock, SystemClock};
