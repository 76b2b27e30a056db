//! Follow camera
//!
//! A smoothed target trails the current block; the eye sits at a fixed
//! offset from that target and always looks at the player.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// What the renderer needs to place the camera
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraView {
    pub eye: Vec3,
    pub look_at: Vec3,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraTracker {
    target: Vec3,
    pub offset: Vec3,
    /// Fraction of the remaining gap closed per second
    pub rate: f32,
}

impl CameraTracker {
    pub fn new(offset: Vec3, rate: f32) -> Self {
        Self {
            target: Vec3::ZERO,
            offset,
            rate,
        }
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Close part of the gap to `goal`; never overshoots
    pub fn update(&mut self, goal: Vec3, dt: f32) {
        let factor = (self.rate * dt).clamp(0.0, 1.0);
        self.target += (goal - self.target) * factor;
    }

    pub fn eye(&self) -> Vec3 {
        self.target + self.offset
    }

    pub fn view(&self, player: Vec3) -> CameraView {
        CameraView {
            eye: self.eye(),
            look_at: player,
        }
    }

    pub fn reset(&mut self) {
        self.target = Vec3::ZERO;
    }
}
