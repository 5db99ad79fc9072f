// src/profile.rs - Per-exercise configuration: angle definitions, tolerance bands, rep thresholds
use crate::classifier::FormClass;
use crate::error::ProfileError;
use crate::landmarks::Joint;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

pub const DEFAULT_TARGET_ANGLE: f64 = 90.0;
pub const DEFAULT_TIGHT_TOLERANCE: f64 = 10.0;
pub const DEFAULT_WIDE_TOLERANCE: f64 = 20.0;
pub const DEFAULT_DOWN_ENTER: f64 = 70.0;
pub const DEFAULT_UP_EXIT: f64 = 100.0;

/// A named angle measured at `joints[1]` between `joints[0]` and `joints[2]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AngleSpec {
    pub name: String,
    pub joints: [Joint; 3],
    /// Unscored angles only gate visibility; they never affect the tier.
    #[serde(default = "scored_by_default")]
    pub scored: bool,
    /// Overrides the profile-wide target for this angle.
    #[serde(default)]
    pub target: Option<f64>,
}

fn scored_by_default() -> bool {
    true
}

impl AngleSpec {
    pub fn scored(name: &str, joints: [Joint; 3]) -> Self {
        Self {
            name: name.to_string(),
            joints,
            scored: true,
            target: None,
        }
    }

    pub fn visibility_only(name: &str, joints: [Joint; 3]) -> Self {
        Self {
            scored: false,
            ..Self::scored(name, joints)
        }
    }

    pub fn with_target(mut self, target: f64) -> Self {
        self.target = Some(target);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToleranceBands {
    pub tight: f64,
    pub wide: f64,
}

impl Default for ToleranceBands {
    fn default() -> Self {
        Self {
            tight: DEFAULT_TIGHT_TOLERANCE,
            wide: DEFAULT_WIDE_TOLERANCE,
        }
    }
}

/// Hysteresis thresholds for the rep counter; `down_enter < up_exit`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RepThresholds {
    pub down_enter: f64,
    pub up_exit: f64,
}

impl Default for RepThresholds {
    fn default() -> Self {
        Self {
            down_enter: DEFAULT_DOWN_ENTER,
            up_exit: DEFAULT_UP_EXIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackMessages {
    pub perfect: String,
    pub almost: String,
    pub incorrect: String,
    pub undetected: String,
    pub no_person: String,
}

impl Default for FeedbackMessages {
    fn default() -> Self {
        Self {
            perfect: "Perfect form! Keep it up!".to_string(),
            almost: "Almost there! Just a little adjustment needed".to_string(),
            incorrect: "Adjust your form".to_string(),
            undetected: "Make sure your whole body is visible".to_string(),
            no_person: "No person detected".to_string(),
        }
    }
}

impl FeedbackMessages {
    pub fn message(&self, class: FormClass) -> &str {
        match class {
            FormClass::Perfect => &self.perfect,
            FormClass::Almost => &self.almost,
            FormClass::Incorrect => &self.incorrect,
            FormClass::Undetected => &self.undetected,
            FormClass::NoPerson => &self.no_person,
        }
    }
}

/// Immutable per-session exercise configuration.
///
/// Everything exercise-specific lives here so the classifier and rep
/// counter stay free of per-exercise branches. Build one through
/// [`ExerciseProfile::builtin`] or [`ExerciseProfile::from_file`]; both
/// validate before returning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseProfile {
    pub exercise: String,
    pub angles: Vec<AngleSpec>,
    #[serde(default = "default_target")]
    pub target_angle: f64,
    #[serde(default)]
    pub tolerance: ToleranceBands,
    pub rep_angle: String,
    #[serde(default)]
    pub reps: RepThresholds,
    #[serde(default)]
    pub feedback: FeedbackMessages,
}

fn default_target() -> f64 {
    DEFAULT_TARGET_ANGLE
}

static BUILTIN_PROFILES: Lazy<BTreeMap<&'static str, ExerciseProfile>> = Lazy::new(|| {
    let mut profiles = BTreeMap::new();
    profiles.insert("squat", squat_profile());
    profiles.insert("deadlift", deadlift_profile());
    profiles
});

fn lower_body_angles() -> Vec<AngleSpec> {
    vec![
        AngleSpec::scored("knee", [Joint::Hip, Joint::Knee, Joint::Ankle]),
        AngleSpec::scored("hip", [Joint::Shoulder, Joint::Hip, Joint::Knee]),
        AngleSpec::visibility_only("ankle", [Joint::Knee, Joint::Ankle, Joint::FootIndex]),
    ]
}

fn squat_profile() -> ExerciseProfile {
    ExerciseProfile {
        exercise: "Squat".to_string(),
        angles: lower_body_angles(),
        target_angle: DEFAULT_TARGET_ANGLE,
        tolerance: ToleranceBands::default(),
        rep_angle: "knee".to_string(),
        reps: RepThresholds::default(),
        feedback: FeedbackMessages {
            perfect: "Perfect squat form! Keep it up!".to_string(),
            almost: "Great squat form! Just a little adjustment needed".to_string(),
            ..FeedbackMessages::default()
        },
    }
}

fn deadlift_profile() -> ExerciseProfile {
    let mut angles = lower_body_angles();
    angles[0] = AngleSpec::scored("knee", [Joint::Hip, Joint::Knee, Joint::Ankle]).with_target(125.0);
    ExerciseProfile {
        exercise: "Deadlift".to_string(),
        angles,
        target_angle: 80.0,
        tolerance: ToleranceBands::default(),
        rep_angle: "hip".to_string(),
        reps: RepThresholds {
            down_enter: 100.0,
            up_exit: 160.0,
        },
        feedback: FeedbackMessages {
            perfect: "Perfect deadlift form! Keep it up!".to_string(),
            almost: "Good hinge! Just a little adjustment needed".to_string(),
            incorrect: "Hinge at the hips and keep your back flat".to_string(),
            ..FeedbackMessages::default()
        },
    }
}

impl ExerciseProfile {
    /// Built-in profile by case-insensitive exercise name.
    pub fn builtin(name: &str) -> Result<Self, ProfileError> {
        BUILTIN_PROFILES
            .get(name.to_ascii_lowercase().as_str())
            .cloned()
            .ok_or_else(|| ProfileError::UnknownExercise(name.to_string()))
    }

    pub fn builtin_names() -> impl Iterator<Item = &'static str> {
        BUILTIN_PROFILES.keys().copied()
    }

    pub fn from_json_str(json: &str) -> Result<Self, ProfileError> {
        let profile: Self = serde_json::from_str(json)?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ProfileError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        let exercise = &self.exercise;

        if self.angles.is_empty() {
            return Err(ProfileError::NoAngles(exercise.clone()));
        }
        if !self.angles.iter().any(|a| a.scored) {
            return Err(ProfileError::NoScoredAngles(exercise.clone()));
        }

        let mut seen = HashSet::new();
        for spec in &self.angles {
            if !seen.insert(spec.name.as_str()) {
                return Err(ProfileError::DuplicateAngle {
                    exercise: exercise.clone(),
                    angle: spec.name.clone(),
                });
            }
            if let Some(target) = spec.target {
                check_angle(exercise, "angle target", target)?;
            }
        }

        if self.angle(&self.rep_angle).is_none() {
            return Err(ProfileError::UnknownAngle {
                exercise: exercise.clone(),
                angle: self.rep_angle.clone(),
            });
        }

        check_angle(exercise, "target_angle", self.target_angle)?;

        let ToleranceBands { tight, wide } = self.tolerance;
        if !(tight.is_finite() && wide.is_finite() && tight > 0.0 && tight < wide) {
            return Err(ProfileError::Tolerances {
                exercise: exercise.clone(),
                tight,
                wide,
            });
        }

        let RepThresholds { down_enter, up_exit } = self.reps;
        check_angle(exercise, "down_enter", down_enter)?;
        check_angle(exercise, "up_exit", up_exit)?;
        if down_enter >= up_exit {
            return Err(ProfileError::Hysteresis {
                exercise: exercise.clone(),
                down_enter,
                up_exit,
            });
        }

        Ok(())
    }

    pub fn angle(&self, name: &str) -> Option<&AngleSpec> {
        self.angles.iter().find(|a| a.name == name)
    }

    pub fn target_for(&self, spec: &AngleSpec) -> f64 {
        spec.target.unwrap_or(self.target_angle)
    }
}

fn check_angle(exercise: &str, field: &'static str, value: f64) -> Result<(), ProfileError> {
    if value.is_finite() && (0.0..=180.0).contains(&value) {
        Ok(())
    } else {
        Err(ProfileError::OutOfRange {
            exercise: exercise.to_string(),
            field,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_valid() {
        for name in ExerciseProfile::builtin_names() {
            let profile = ExerciseProfile::builtin(name).unwrap();
            profile.validate().unwrap();
        }
    }

    #[test]
    fn builtin_lookup_ignores_case() {
        let squat = ExerciseProfile::builtin("SQUAT").unwrap();
        assert_eq!(squat.exercise, "Squat");
        assert_eq!(squat.reps.down_enter, 70.0);
        assert_eq!(squat.reps.up_exit, 100.0);
    }

    #[test]
    fn unknown_builtin() {
        let err = ExerciseProfile::builtin("Lunge").unwrap_err();
        assert!(matches!(err, ProfileError::UnknownExercise(name) if name == "Lunge"));
    }

    #[test]
    fn rejects_inverted_hysteresis() {
        let mut profile = ExerciseProfile::builtin("squat").unwrap();
        profile.reps = RepThresholds {
            down_enter: 100.0,
            up_exit: 70.0,
        };
        assert!(matches!(
            profile.validate(),
            Err(ProfileError::Hysteresis { .. })
        ));
    }

    #[test]
    fn rejects_unknown_rep_angle() {
        let mut profile = ExerciseProfile::builtin("squat").unwrap();
        profile.rep_angle = "elbow".to_string();
        assert!(matches!(
            profile.validate(),
            Err(ProfileError::UnknownAngle { .. })
        ));
    }

    #[test]
    fn rejects_wide_band_narrower_than_tight() {
        let mut profile = ExerciseProfile::builtin("squat").unwrap();
        profile.tolerance = ToleranceBands {
            tight: 20.0,
            wide: 10.0,
        };
        assert!(matches!(
            profile.validate(),
            Err(ProfileError::Tolerances { .. })
        ));
    }

    #[test]
    fn parses_minimal_json_with_defaults() {
        let json = r#"{
            "exercise": "Wall sit",
            "angles": [
                {"name": "knee", "joints": ["Hip", "Knee", "Ankle"]}
            ],
            "rep_angle": "knee"
        }"#;
        let profile = ExerciseProfile::from_json_str(json).unwrap();
        assert_eq!(profile.target_angle, DEFAULT_TARGET_ANGLE);
        assert_eq!(profile.tolerance, ToleranceBands::default());
        assert_eq!(profile.reps, RepThresholds::default());
        assert!(profile.angles[0].scored);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = ExerciseProfile::from_json_str("{\"exercise\": 3}").unwrap_err();
        assert!(matches!(err, ProfileError::Parse(_)));
    }
}
