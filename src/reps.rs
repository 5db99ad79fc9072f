// src/reps.rs - Two-state hysteresis rep counter
use crate::geometry::JointAngle;
use crate::profile::RepThresholds;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RepPhase {
    #[default]
    Up,
    Down,
}

impl fmt::Display for RepPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepPhase::Up => f.write_str("up"),
            RepPhase::Down => f.write_str("down"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RepCounterState {
    pub phase: RepPhase,
    pub rep_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepEvent {
    /// Tracked angle dropped below `down_enter`.
    Descended,
    /// Tracked angle rose above `up_exit` after a descent.
    Completed { rep_count: u32 },
}

/// Advance the counter by one angle sample.
///
/// Undetermined samples never change the state, so a brief dropout in the
/// middle of a rep neither loses nor duplicates it.
pub fn transition(
    state: RepCounterState,
    sample: JointAngle,
    thresholds: &RepThresholds,
) -> (RepCounterState, Option<RepEvent>) {
    let Some(angle) = sample.degrees() else {
        return (state, None);
    };

    match state.phase {
        RepPhase::Up if angle < thresholds.down_enter => (
            RepCounterState {
                phase: RepPhase::Down,
                ..state
            },
            Some(RepEvent::Descended),
        ),
        RepPhase::Down if angle > thresholds.up_exit => {
            let rep_count = state.rep_count.saturating_add(1);
            (
                RepCounterState {
                    phase: RepPhase::Up,
                    rep_count,
                },
                Some(RepEvent::Completed { rep_count }),
            )
        }
        _ => (state, None),
    }
}

/// Owns the counter state for one session.
#[derive(Debug, Clone)]
pub struct RepCounter {
    thresholds: RepThresholds,
    state: RepCounterState,
}

impl RepCounter {
    pub fn new(thresholds: RepThresholds) -> Self {
        Self {
            thresholds,
            state: RepCounterState::default(),
        }
    }

    pub fn update(&mut self, sample: JointAngle) -> Option<RepEvent> {
        let (next, event) = transition(self.state, sample, &self.thresholds);
        self.state = next;
        event
    }

    pub fn state(&self) -> RepCounterState {
        self.state
    }

    pub fn thresholds(&self) -> &RepThresholds {
        &self.thresholds
    }
}
