//! Adaptive quality from observed frame rate
//!
//! Keeps a rolling window of per-tick FPS samples and moves between quality
//! levels only once the window is full. Every level change clears the
//! window, so the next decision waits for a fresh set of samples.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::settings::{EngineConfig, QualityLevel};

/// Snapshot for HUD/debug overlays
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceStats {
    pub current_fps: f32,
    pub average_fps: f32,
    pub level: QualityLevel,
    pub samples: usize,
}

#[derive(Debug, Clone)]
pub struct PerformanceGovernor {
    samples: VecDeque<f32>,
    sum: f32,
    window: usize,
    level: QualityLevel,
    adaptive: bool,
    low: f32,
    medium: f32,
    high: f32,
}

impl PerformanceGovernor {
    pub fn new(config: &EngineConfig) -> Self {
        let window = config.fps_window.max(1);
        Self {
            samples: VecDeque::with_capacity(window),
            sum: 0.0,
            window,
            level: config.initial_quality,
            adaptive: config.adaptive_quality,
            low: config.fps_low,
            medium: config.fps_medium,
            high: config.fps_high,
        }
    }

    pub fn level(&self) -> QualityLevel {
        self.level
    }

    pub fn update_breadth(&self) -> usize {
        self.level.update_breadth()
    }

    /// Record one tick's duration; returns the new level if it changed
    pub fn sample_frame(&mut self, dt: f32) -> Option<QualityLevel> {
        if !dt.is_finite() || dt <= 0.0 {
            return None;
        }
        self.record_fps(1.0 / dt)
    }

    /// Record an FPS reading; returns the new level if it changed.
    ///
    /// Downgrades may skip straight to Low, but recovery climbs one level per
    /// full window, so Low needs two healthy windows to get back to High.
    pub fn record_fps(&mut self, fps: f32) -> Option<QualityLevel> {
        self.samples.push_back(fps);
        self.sum += fps;
        if self.samples.len() > self.window {
            if let Some(old) = self.samples.pop_front() {
                self.sum -= old;
            }
        }

        if !self.adaptive || self.samples.len() < self.window {
            return None;
        }

        let mean = self.mean_fps()?;
        let next = if mean < self.low {
            QualityLevel::Low
        } else if mean < self.medium && self.level == QualityLevel::High {
            QualityLevel::Medium
        } else if mean > self.high {
            self.level.step_up()
        } else {
            self.level
        };

        if next == self.level {
            return None;
        }
        log::info!(
            "Quality level changed: {} -> {} (avg {:.1} fps)",
            self.level.as_str(),
            next.as_str(),
            mean
        );
        self.level = next;
        self.clear_samples();
        Some(next)
    }

    pub fn mean_fps(&self) -> Option<f32> {
        if self.samples.is_empty() {
            None
        } else {
            Some(self.sum / self.samples.len() as f32)
        }
    }

    pub fn stats(&self) -> PerformanceStats {
        PerformanceStats {
            current_fps: self.samples.back().copied().unwrap_or(0.0),
            average_fps: self.mean_fps().unwrap_or(0.0),
            level: self.level,
            samples: self.samples.len(),
        }
    }

    /// Forget collected samples (keeps the level)
    pub fn reset(&mut self) {
        self.clear_samples();
    }

    fn clear_samples(&mut self) {
        self.samples.clear();
        self.sum = 0.0;
    }
}
