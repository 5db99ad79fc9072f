// src/geometry.rs - Joint angle from three 2D points
use crate::landmarks::Point2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Limb vectors shorter than this cannot define an angle.
pub const MIN_LIMB_LENGTH: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UndeterminedReason {
    /// A point needed for the angle is not visible this frame.
    MissingLandmark,
    /// A limb vector has (near) zero length.
    DegenerateGeometry,
}

/// Angle at a joint in degrees, or an explicit "could not measure" value.
///
/// A `Degrees` value is always finite and within [0, 180].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum JointAngle {
    Degrees(f64),
    Undetermined(UndeterminedReason),
}

impl JointAngle {
    pub fn degrees(self) -> Option<f64> {
        match self {
            JointAngle::Degrees(d) => Some(d),
            JointAngle::Undetermined(_) => None,
        }
    }

    pub fn is_determined(self) -> bool {
        matches!(self, JointAngle::Degrees(_))
    }
}

impl fmt::Display for JointAngle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JointAngle::Degrees(d) => write!(f, "{:.1}", d),
            JointAngle::Undetermined(_) => f.write_str("-"),
        }
    }
}

/// Angle at vertex `b` between rays b→a and b→c.
pub fn angle_at(a: Option<Point2>, b: Option<Point2>, c: Option<Point2>) -> JointAngle {
    match (a, b, c) {
        (Some(a), Some(b), Some(c)) => angle_between(&a, &b, &c),
        _ => JointAngle::Undetermined(UndeterminedReason::MissingLandmark),
    }
}

pub fn angle_between(a: &Point2, b: &Point2, c: &Point2) -> JointAngle {
    let v1 = a - b;
    let v2 = c - b;

    let mag1 = v1.norm();
    let mag2 = v2.norm();

    if !(mag1.is_finite() && mag2.is_finite()) {
        return JointAngle::Undetermined(UndeterminedReason::MissingLandmark);
    }
    if mag1 < MIN_LIMB_LENGTH || mag2 < MIN_LIMB_LENGTH {
        return JointAngle::Undetermined(UndeterminedReason::DegenerateGeometry);
    }

    // Clamp absorbs floating-point overshoot past ±1 before acos.
    let cos_angle = (v1.dot(&v2) / (mag1 * mag2)).clamp(-1.0, 1.0);
    JointAngle::Degrees(cos_angle.acos().to_degrees())
}
