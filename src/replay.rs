// src/replay.rs - Drive a session from recorded detector callbacks (JSON lines)
use crate::engine::{FrameReport, TrainingSession};
use crate::landmarks::DetectedPose;
use crate::throttle::ManualClock;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use tracing::warn;

/// One recorded detector callback.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectorCallback {
    pub timestamp_ms: u64,
    #[serde(default)]
    pub poses: Vec<DetectedPose>,
}

/// Feed every line of `reader` through `session`, advancing `clock` to each
/// callback's timestamp.
///
/// A line that does not parse is processed as an empty callback at the
/// previous timestamp, the same as a frame with nobody in it.
pub fn replay<R: BufRead>(
    reader: R,
    session: &mut TrainingSession<ManualClock>,
    clock: &ManualClock,
) -> Result<Vec<FrameReport>> {
    let mut reports = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", index + 1))?;
        if line.trim().is_empty() {
            continue;
        }

        let poses = match serde_json::from_str::<DetectorCallback>(&line) {
            Ok(callback) => {
                clock.set(callback.timestamp_ms);
                callback.poses
            }
            Err(e) => {
                warn!(line = index + 1, error = %e, "malformed detector payload, treating as no person");
                Vec::new()
            }
        };

        reports.push(session.on_frame(&poses));
    }

    Ok(reports)
}
