// src/landmarks.rs - Landmark frames, joint lookup with side fallback, pose selection
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

pub type Point2 = Vector2<f64>;

/// One 2D keypoint as delivered by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f64,
    pub y: f64,
}

impl Keypoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_point(self) -> Option<Point2> {
        if self.x.is_finite() && self.y.is_finite() {
            Some(Point2::new(self.x, self.y))
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }

    /// Side whose joints feed the angle math for this frame.
    ///
    /// Left when both knees are visible, right otherwise; `resolve` then
    /// falls back to the left leg if the right one is missing.
    pub fn tracking_side(frame: &LandmarkFrame) -> Self {
        if frame.contains(Side::Left, Joint::Knee) && frame.contains(Side::Right, Joint::Knee) {
            Side::Left
        } else {
            Side::Right
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body joints used by two-joint flexion/extension exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Joint {
    Shoulder,
    Elbow,
    Wrist,
    Hip,
    Knee,
    Ankle,
    Heel,
    FootIndex,
}

impl Joint {
    pub fn as_str(self) -> &'static str {
        match self {
            Joint::Shoulder => "Shoulder",
            Joint::Elbow => "Elbow",
            Joint::Wrist => "Wrist",
            Joint::Hip => "Hip",
            Joint::Knee => "Knee",
            Joint::Ankle => "Ankle",
            Joint::Heel => "Heel",
            Joint::FootIndex => "FootIndex",
        }
    }

    /// Detector key for this joint on `side`, e.g. `leftKnee`.
    pub fn key(self, side: Side) -> String {
        format!("{}{}", side.as_str(), self.as_str())
    }
}

impl fmt::Display for Joint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keypoints of a single detected person, keyed by detector joint name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkFrame {
    points: HashMap<String, Keypoint>,
}

impl LandmarkFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, x: f64, y: f64) -> Self {
        self.insert(key, x, y);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, x: f64, y: f64) {
        self.points.insert(key.into(), Keypoint::new(x, y));
    }

    pub fn get(&self, key: &str) -> Option<Point2> {
        self.points.get(key).and_then(|kp| kp.to_point())
    }

    pub fn contains(&self, side: Side, joint: Joint) -> bool {
        self.get(&joint.key(side)).is_some()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of keypoints with finite coordinates.
    pub fn visible_len(&self) -> usize {
        self.points.values().filter(|kp| kp.to_point().is_some()).count()
    }

    pub fn keypoints(&self) -> &HashMap<String, Keypoint> {
        &self.points
    }
}

/// Look up `joint` on `side`, falling back to the opposite side.
///
/// `None` means the joint is not visible in this frame.
pub fn resolve(frame: &LandmarkFrame, side: Side, joint: Joint) -> Option<Point2> {
    frame
        .get(&joint.key(side))
        .or_else(|| frame.get(&joint.key(side.opposite())))
}

/// A candidate pose from one detector callback.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectedPose {
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub keypoints: LandmarkFrame,
}

impl DetectedPose {
    pub fn new(keypoints: LandmarkFrame) -> Self {
        Self {
            score: None,
            keypoints,
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }
}

/// Pick the highest-scoring pose that carries at least `min_keypoints`
/// visible keypoints. Equal scores keep the earliest candidate.
///
/// Returns `None` for an empty or unusable payload, which callers treat as
/// "no person in frame".
pub fn select_pose(poses: &[DetectedPose], min_keypoints: usize) -> Option<&LandmarkFrame> {
    let best = poses
        .iter()
        .filter(|p| p.keypoints.visible_len() >= min_keypoints)
        .rev()
        .max_by(|a, b| {
            let sa = a.score.filter(|s| s.is_finite()).unwrap_or(0.0);
            let sb = b.score.filter(|s| s.is_finite()).unwrap_or(0.0);
            sa.total_cmp(&sb)
        });

    if best.is_none() && !poses.is_empty() {
        debug!(candidates = poses.len(), min_keypoints, "no usable pose in payload");
    }

    best.map(|p| &p.keypoints)
}
