//! Hopscotch - a charge-to-jump platform hopping game core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (player arcs, path, pool, landing, camera)
//! - `governor`: Frame-rate driven quality level
//! - `engine`: Frame scheduler and public control surface
//! - `renderer`: Scene/renderer seam consumed by the engine
//! - `best_score`: Best-score store seam
//! - `settings`: Data-driven tuning and quality levels

pub mod best_score;
pub mod engine;
pub mod governor;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use best_score::{BestScoreStore, JsonFileBestScore, MemoryBestScore};
pub use engine::{FrameControl, GameEngine, RoundSummary};
pub use governor::PerformanceGovernor;
pub use renderer::{FrameView, HeadlessRenderer, Renderer};
pub use settings::{ConfigError, EngineConfig, QualityLevel};

use glam::{Vec2, Vec3};

/// Game configuration constants
pub mod consts {
    /// Longest useful charge (ms); holding longer saturates power at 1.0
    pub const MAX_CHARGE_MS: f64 = 2000.0;
    /// Jump arc duration (ms)
    pub const JUMP_DURATION_MS: f64 = 800.0;
    /// Fall-off-path duration (ms)
    pub const FALL_DURATION_MS: f64 = 2000.0;
    /// How far the player sinks while falling
    pub const FALL_DEPTH: f32 = 10.0;

    /// Jump distance = BASE + power * SPAN
    pub const JUMP_DISTANCE_BASE: f32 = 2.0;
    pub const JUMP_DISTANCE_SPAN: f32 = 6.0;
    /// Jump height = BASE + power * SPAN
    pub const JUMP_HEIGHT_BASE: f32 = 1.0;
    pub const JUMP_HEIGHT_SPAN: f32 = 3.0;

    /// Player rest height above the block plane
    pub const PLAYER_REST_Y: f32 = 1.0;

    /// Landing tiers (planar distance from block center)
    pub const LANDING_THRESHOLD: f32 = 1.5;
    pub const PERFECT_DISTANCE: f32 = 0.3;
    pub const GOOD_DISTANCE: f32 = 0.8;
    pub const PERFECT_POINTS: u32 = 5;
    pub const GOOD_POINTS: u32 = 3;
    pub const ORDINARY_POINTS: u32 = 1;

    /// Landing window: [current - BEHIND, current + AHEAD)
    pub const LANDING_WINDOW_BEHIND: usize = 1;
    pub const LANDING_WINDOW_AHEAD: usize = 3;

    /// Blocks further than this from the player (and lagging) get recycled
    pub const CLEANUP_RADIUS: f32 = 20.0;
    pub const CLEANUP_INDEX_LAG: usize = 2;
    /// Path is extended while fewer blocks than this lie ahead of the current one
    pub const MIN_BLOCKS_AHEAD: usize = 3;
    /// Start block + generated blocks at session start
    pub const INITIAL_BLOCKS: usize = 5;

    /// Pool sizing
    pub const POOL_PREALLOC: usize = 10;
    pub const MAX_POOL_SIZE: usize = 15;

    /// Placement of the next block relative to the last one
    pub const STEP_MIN_DISTANCE: f32 = 3.0;
    pub const STEP_MAX_DISTANCE: f32 = 7.0;
    /// Forward fan half-width as a fraction of π
    pub const STEP_ANGLE_SPREAD: f32 = 0.3;

    /// Camera follow
    pub const CAMERA_RATE: f32 = 2.0;
    pub const CAMERA_OFFSET: [f32; 3] = [0.0, 8.0, 8.0];

    /// Performance governor
    pub const FPS_WINDOW: usize = 60;
    pub const FPS_LOW: f32 = 30.0;
    pub const FPS_MEDIUM: f32 = 45.0;
    pub const FPS_HIGH: f32 = 55.0;

    /// Frame scheduler: skip host frames closer together than this (ms)
    pub const MIN_FRAME_INTERVAL_MS: f64 = 16.0;
    /// Largest dt fed to a single update (s)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Block entrance animation (ms)
    pub const BLOCK_RISE_MS: f32 = 500.0;
    /// Special block spin (rad/s)
    pub const SPECIAL_SPIN_SPEED: f32 = 0.5;
}

/// Project a world position onto the ground plane (x, z)
#[inline]
pub fn planar(pos: Vec3) -> Vec2 {
    Vec2::new(pos.x, pos.z)
}

/// Squared distance between two positions on the ground plane
#[inline]
pub fn planar_distance_squared(a: Vec3, b: Vec3) -> f32 {
    planar(a).distance_squared(planar(b))
}

/// Planar offset for a step of `distance` at `angle` (0 = straight down +Z)
#[inline]
pub fn heading_offset(distance: f32, angle: f32) -> Vec2 {
    Vec2::new(angle.sin() * distance, angle.cos() * distance)
}
