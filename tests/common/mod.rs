use form_tracker::{DetectedPose, ExerciseProfile, LandmarkFrame};
use form_tracker::profile::AngleSpec;
use form_tracker::Joint;

/// Side-view pose on the left leg with the knee bent to `knee_deg`.
pub fn pose_with_knee_angle(knee_deg: f64) -> DetectedPose {
    let (kx, ky) = (0.50, 0.62);
    let (hx, hy) = (0.50, 0.40);
    let rad = knee_deg.to_radians();
    let (ax, ay) = (kx + 0.22 * rad.sin(), ky - 0.22 * rad.cos());

    let frame = LandmarkFrame::new()
        .with("nose", 0.52, 0.08)
        .with("leftShoulder", 0.50, 0.15)
        .with("leftHip", hx, hy)
        .with("leftKnee", kx, ky)
        .with("leftAnkle", ax, ay)
        .with("leftFootIndex", ax + 0.06, ay);
    DetectedPose::new(frame).with_score(0.95)
}

/// Knee-scored profile centred on a near-standing knee, with the default
/// 70/100 rep thresholds.
pub fn standing_knee_profile() -> ExerciseProfile {
    let mut profile = ExerciseProfile::builtin("squat").expect("squat profile");
    profile.exercise = "Knee tracking".to_string();
    profile.angles = vec![
        AngleSpec::scored("knee", [Joint::Hip, Joint::Knee, Joint::Ankle]),
        AngleSpec::visibility_only("hip", [Joint::Shoulder, Joint::Hip, Joint::Knee]),
        AngleSpec::visibility_only("ankle", [Joint::Knee, Joint::Ankle, Joint::FootIndex]),
    ];
    profile.target_angle = 165.0;
    profile.validate().expect("valid profile");
    profile
}
