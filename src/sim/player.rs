//! Player controller
//!
//! Trajectories are curves of elapsed time, never integrated: a jump lerps
//! across the ground plane while the height follows `ease::jump_arc`, and a
//! fall sinks along a quartic ease-in. At most one trajectory is in flight.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::ease::{ease_in_quart, jump_arc, lerp};
use crate::consts::PLAYER_REST_Y;

/// A jump in flight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JumpArc {
    pub start_ms: f64,
    pub duration_ms: f64,
    pub start_pos: Vec3,
    pub end_pos: Vec3,
    pub height: f32,
}

impl JumpArc {
    /// Normalized progress at `now_ms` (clamped to [0, 1])
    pub fn progress(&self, now_ms: f64) -> f32 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((now_ms - self.start_ms) / self.duration_ms).clamp(0.0, 1.0) as f32
    }

    /// Position along the arc at progress `t`
    pub fn sample(&self, t: f32) -> Vec3 {
        if t >= 1.0 {
            return self.end_pos;
        }
        Vec3::new(
            lerp(self.start_pos.x, self.end_pos.x, t),
            self.start_pos.y + self.height * jump_arc(t),
            lerp(self.start_pos.z, self.end_pos.z, t),
        )
    }
}

/// A fall off the path
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FallArc {
    pub start_ms: f64,
    pub duration_ms: f64,
    pub start_pos: Vec3,
    pub depth: f32,
}

impl FallArc {
    pub fn progress(&self, now_ms: f64) -> f32 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((now_ms - self.start_ms) / self.duration_ms).clamp(0.0, 1.0) as f32
    }

    pub fn sample(&self, t: f32) -> Vec3 {
        Vec3::new(
            self.start_pos.x,
            self.start_pos.y - ease_in_quart(t) * self.depth,
            self.start_pos.z,
        )
    }
}

/// What the player is doing right now
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Motion {
    #[default]
    Idle,
    /// Charge held since `start_ms` (no physical effect)
    Charging { start_ms: f64 },
    Jumping(JumpArc),
    Falling(FallArc),
}

/// Trajectory completions reported by `Player::update`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionEvent {
    JumpCompleted,
    FallCompleted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub position: Vec3,
    pub motion: Motion,
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl Player {
    pub fn new() -> Self {
        Self {
            position: Vec3::new(0.0, PLAYER_REST_Y, 0.0),
            motion: Motion::Idle,
        }
    }

    pub fn set_position(&mut self, pos: Vec3) {
        self.position = pos;
    }

    pub fn is_charging(&self) -> bool {
        matches!(self.motion, Motion::Charging { .. })
    }

    pub fn is_jumping(&self) -> bool {
        matches!(self.motion, Motion::Jumping(_))
    }

    pub fn is_falling(&self) -> bool {
        matches!(self.motion, Motion::Falling(_))
    }

    pub fn start_charging(&mut self, now_ms: f64) {
        if matches!(self.motion, Motion::Idle) {
            self.motion = Motion::Charging { start_ms: now_ms };
        }
    }

    /// Launch a jump of `distance` toward `direction` on the ground plane.
    ///
    /// Returns `false` if a trajectory is already in flight.
    pub fn jump(
        &mut self,
        now_ms: f64,
        duration_ms: f64,
        direction: Vec2,
        distance: f32,
        height: f32,
    ) -> bool {
        if self.is_jumping() || self.is_falling() {
            return false;
        }
        let dir = direction.normalize_or(Vec2::Y);
        let start_pos = self.position;
        let end_pos = Vec3::new(
            start_pos.x + dir.x * distance,
            start_pos.y,
            start_pos.z + dir.y * distance,
        );
        self.motion = Motion::Jumping(JumpArc {
            start_ms: now_ms,
            duration_ms,
            start_pos,
            end_pos,
            height,
        });
        true
    }

    /// Start falling from the current position
    pub fn fall(&mut self, now_ms: f64, duration_ms: f64, depth: f32) {
        self.motion = Motion::Falling(FallArc {
            start_ms: now_ms,
            duration_ms,
            start_pos: self.position,
            depth,
        });
    }

    /// Move along the active trajectory; reports when it finishes
    pub fn update(&mut self, now_ms: f64) -> Option<MotionEvent> {
        match self.motion {
            Motion::Jumping(arc) => {
                let t = arc.progress(now_ms);
                self.position = arc.sample(t);
                if t >= 1.0 {
                    self.motion = Motion::Idle;
                    return Some(MotionEvent::JumpCompleted);
                }
                None
            }
            Motion::Falling(arc) => {
                let t = arc.progress(now_ms);
                self.position = arc.sample(t);
                if t >= 1.0 {
                    self.motion = Motion::Idle;
                    return Some(MotionEvent::FallCompleted);
                }
                None
            }
            Motion::Idle | Motion::Charging { .. } => None,
        }
    }

    /// Back to the start block, idle
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jump_lands_exactly_on_plane() {
        for height in [1.0, 2.5, 4.0] {
            let mut player = Player::new();
            assert!(player.jump(0.0, 800.0, Vec2::new(0.0, 1.0), 5.0, height));

            assert_eq!(player.update(400.0), None);
            assert!((player.position.y - (PLAYER_REST_Y + height)).abs() < 1e-5);
            assert!((player.position.z - 2.5).abs() < 1e-5);

            assert_eq!(player.update(800.0), Some(MotionEvent::JumpCompleted));
            assert_eq!(player.position, Vec3::new(0.0, PLAYER_REST_Y, 5.0));
            assert_eq!(player.motion, Motion::Idle);
        }
    }

    #[test]
    fn test_overshooting_tick_still_ends_at_target() {
        let mut player = Player::new();
        player.jump(100.0, 800.0, Vec2::new(1.0, 1.0), 2.0, 1.0);
        assert_eq!(player.update(5_000.0), Some(MotionEvent::JumpCompleted));
        let expected = Vec2::new(1.0, 1.0).normalize() * 2.0;
        assert!((player.position.x - expected.x).abs() < 1e-5);
        assert!((player.position.z - expected.y).abs() < 1e-5);
    }

    #[test]
    fn test_height_stays_above_plane_during_jump() {
        let mut player = Player::new();
        player.jump(0.0, 800.0, Vec2::Y, 4.0, 3.0);
        for step in 0..=80 {
            player.update(step as f64 * 10.0);
            assert!(player.position.y >= PLAYER_REST_Y - 1e-5);
        }
    }

    #[test]
    fn test_second_jump_is_rejected_mid_flight() {
        let mut player = Player::new();
        assert!(player.jump(0.0, 800.0, Vec2::Y, 4.0, 2.0));
        let before = player.motion;
        assert!(!player.jump(100.0, 800.0, Vec2::X, 8.0, 4.0));
        assert_eq!(player.motion, before);
    }

    #[test]
    fn test_zero_direction_defaults_forward() {
        let mut player = Player::new();
        player.jump(0.0, 800.0, Vec2::ZERO, 3.0, 1.0);
        player.update(800.0);
        assert!((player.position.z - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_fall_sinks_and_completes() {
        let mut player = Player::new();
        player.set_position(Vec3::new(2.0, PLAYER_REST_Y, 3.0));
        player.fall(1000.0, 2000.0, 10.0);
        assert!(player.is_falling());

        assert_eq!(player.update(2000.0), None);
        // ease-in: a quarter of the way down at most by the midpoint
        assert!(player.position.y > PLAYER_REST_Y - 10.0 * 0.25);

        assert_eq!(player.update(3000.0), Some(MotionEvent::FallCompleted));
        assert!((player.position.y - (PLAYER_REST_Y - 10.0)).abs() < 1e-5);
        assert_eq!(player.position.x, 2.0);
    }

    #[test]
    fn test_charging_does_not_move() {
        let mut player = Player::new();
        player.start_charging(10.0);
        assert!(player.is_charging());
        assert_eq!(player.update(500.0), None);
        assert_eq!(player.position, Vec3::new(0.0, PLAYER_REST_Y, 0.0));
    }
}
