// src/classifier.rs - Form quality tiers from measured joint angles
use crate::geometry::{angle_at, JointAngle, UndeterminedReason};
use crate::landmarks::{resolve, LandmarkFrame, Side};
use crate::profile::ExerciseProfile;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormClass {
    Perfect,
    Almost,
    Incorrect,
    /// Person present but a required joint could not be measured.
    Undetected,
    NoPerson,
}

impl FormClass {
    pub const ALL: [FormClass; 5] = [
        FormClass::Perfect,
        FormClass::Almost,
        FormClass::Incorrect,
        FormClass::Undetected,
        FormClass::NoPerson,
    ];
}

impl fmt::Display for FormClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FormClass::Perfect => "perfect",
            FormClass::Almost => "almost",
            FormClass::Incorrect => "incorrect",
            FormClass::Undetected => "undetected",
            FormClass::NoPerson => "no_person",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormAssessment {
    pub classification: FormClass,
    pub debug_angles: BTreeMap<String, JointAngle>,
    pub timestamp_ms: u64,
}

impl FormAssessment {
    pub fn no_person(timestamp_ms: u64) -> Self {
        Self {
            classification: FormClass::NoPerson,
            debug_angles: BTreeMap::new(),
            timestamp_ms,
        }
    }
}

/// Every angle the profile defines, measured on the frame's tracking side.
pub fn measure(frame: &LandmarkFrame, profile: &ExerciseProfile) -> BTreeMap<String, JointAngle> {
    let side = Side::tracking_side(frame);
    profile
        .angles
        .iter()
        .map(|spec| {
            let [a, b, c] = spec.joints;
            let angle = angle_at(
                resolve(frame, side, a),
                resolve(frame, side, b),
                resolve(frame, side, c),
            );
            (spec.name.clone(), angle)
        })
        .collect()
}

pub fn classify(
    angles: &BTreeMap<String, JointAngle>,
    profile: &ExerciseProfile,
    timestamp_ms: u64,
) -> FormAssessment {
    let mut worst_deviation: f64 = 0.0;

    for spec in &profile.angles {
        let angle = angles
            .get(&spec.name)
            .copied()
            .unwrap_or(JointAngle::Undetermined(UndeterminedReason::MissingLandmark));

        let degrees = match angle {
            JointAngle::Degrees(d) => d,
            JointAngle::Undetermined(reason) => {
                debug!(angle = %spec.name, ?reason, "required angle undetermined");
                return FormAssessment {
                    classification: FormClass::Undetected,
                    debug_angles: angles.clone(),
                    timestamp_ms,
                };
            }
        };

        if spec.scored {
            worst_deviation = worst_deviation.max((degrees - profile.target_for(spec)).abs());
        }
    }

    let classification = if worst_deviation < profile.tolerance.tight {
        FormClass::Perfect
    } else if worst_deviation < profile.tolerance.wide {
        FormClass::Almost
    } else {
        FormClass::Incorrect
    };

    FormAssessment {
        classification,
        debug_angles: angles.clone(),
        timestamp_ms,
    }
}
