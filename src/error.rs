// src/error.rs - Configuration-time errors
//
// Per-frame problems (missing joints, zero-length limbs) never surface here;
// they are folded into `JointAngle::Undetermined` and the frame's assessment.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("unknown exercise: {0}")]
    UnknownExercise(String),

    #[error("profile '{exercise}' has no angle named '{angle}'")]
    UnknownAngle { exercise: String, angle: String },

    #[error("profile '{0}' defines no angles")]
    NoAngles(String),

    #[error("profile '{0}' scores no angles")]
    NoScoredAngles(String),

    #[error("profile '{exercise}' defines angle '{angle}' twice")]
    DuplicateAngle { exercise: String, angle: String },

    #[error("profile '{exercise}': {field} must be a finite angle in [0, 180], got {value}")]
    OutOfRange {
        exercise: String,
        field: &'static str,
        value: f64,
    },

    #[error("profile '{exercise}': tight tolerance {tight} must be positive and below wide tolerance {wide}")]
    Tolerances { exercise: String, tight: f64, wide: f64 },

    #[error("profile '{exercise}': down_enter {down_enter} must be below up_exit {up_exit}")]
    Hysteresis {
        exercise: String,
        down_enter: f64,
        up_exit: f64,
    },

    #[error("failed to read profile: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse profile: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid exercise profile: {0}")]
    InvalidProfile(#[from] ProfileError),

    #[error("invalid engine config: {0}")]
    InvalidConfig(String),
}
