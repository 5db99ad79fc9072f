// src/diagnostics.rs - Inter-frame FPS bookkeeping (observational only)
use serde::Serialize;
use std::collections::VecDeque;

const FPS_WINDOW: usize = 30;
/// Detector cadence the confidence score is normalised against.
pub const NOMINAL_FPS: f64 = 30.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FrameTiming {
    /// Instantaneous rate from the gap to the previous frame.
    pub fps: Option<f64>,
    pub avg_fps: Option<f64>,
    /// `fps / 30`, the score attached to each feedback record.
    pub confidence_score: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct PerformanceMetrics {
    last_frame_ms: Option<u64>,
    frame_rates: VecDeque<f64>,
    frames_seen: u64,
}

impl PerformanceMetrics {
    pub fn new() -> Self {
        Self {
            last_frame_ms: None,
            frame_rates: VecDeque::with_capacity(FPS_WINDOW),
            frames_seen: 0,
        }
    }

    pub fn on_frame(&mut self, now_ms: u64) -> FrameTiming {
        self.frames_seen += 1;
        let previous = self.last_frame_ms.replace(now_ms);

        let fps = previous
            .map(|last| now_ms.saturating_sub(last))
            .filter(|delta| *delta > 0)
            .map(|delta| 1000.0 / delta as f64);

        if let Some(fps) = fps {
            self.frame_rates.push_front(fps);
            if self.frame_rates.len() > FPS_WINDOW {
                self.frame_rates.pop_back();
            }
        }

        FrameTiming {
            fps,
            avg_fps: self.avg_fps(),
            confidence_score: fps.map(|f| f / NOMINAL_FPS),
        }
    }

    pub fn avg_fps(&self) -> Option<f64> {
        if self.frame_rates.is_empty() {
            None
        } else {
            Some(self.frame_rates.iter().sum::<f64>() / self.frame_rates.len() as f64)
        }
    }

    pub fn frames_seen(&self) -> u64 {
        self.frames_seen
    }
}

impl Default for PerformanceMetrics {
    fn default() -> Self {
        Self::new()
    }
}
