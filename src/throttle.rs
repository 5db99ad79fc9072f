// src/throttle.rs - Clock abstraction and rate-limited feedback emission
use crate::classifier::FormAssessment;
use std::cell::Cell;
use std::rc::Rc;

/// Minimum spacing between freshly computed assessments.
pub const DEFAULT_FEEDBACK_INTERVAL_MS: u64 = 250;

pub trait Clock {
    fn now_ms(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
    }
}

/// Hand-driven clock. Clones share the same time source.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn set(&self, now_ms: u64) {
        self.now.set(now_ms);
    }

    pub fn advance(&self, delta_ms: u64) {
        self.now.set(self.now.get().saturating_add(delta_ms));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

/// Holds the last emitted assessment and re-emits it until `min_interval_ms`
/// has passed, hiding frame-to-frame classification flicker.
#[derive(Debug, Clone)]
pub struct FeedbackThrottler {
    min_interval_ms: u64,
    last_emit_ms: Option<u64>,
    last_assessment: Option<FormAssessment>,
}

impl FeedbackThrottler {
    pub fn new(min_interval_ms: u64) -> Self {
        Self {
            min_interval_ms,
            last_emit_ms: None,
            last_assessment: None,
        }
    }

    pub fn throttle<F>(&mut self, now_ms: u64, recompute: F) -> FormAssessment
    where
        F: FnOnce() -> FormAssessment,
    {
        if let (Some(last_emit), Some(cached)) = (self.last_emit_ms, &self.last_assessment) {
            // A clock stepping backwards counts as "no time elapsed".
            if now_ms.saturating_sub(last_emit) < self.min_interval_ms {
                return cached.clone();
            }
        }

        let fresh = recompute();
        self.last_emit_ms = Some(now_ms);
        self.last_assessment = Some(fresh.clone());
        fresh
    }

    pub fn last_assessment(&self) -> Option<&FormAssessment> {
        self.last_assessment.as_ref()
    }

    pub fn min_interval_ms(&self) -> u64 {
        self.min_interval_ms
    }
}

impl Default for FeedbackThrottler {
    fn default() -> Self {
        Self::new(DEFAULT_FEEDBACK_INTERVAL_MS)
    }
}
