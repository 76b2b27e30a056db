//! Engine tuning and quality levels
//!
//! Every gameplay constant can be overridden from JSON; missing fields fall
//! back to the defaults in `consts`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::landing::LandingRules;
use crate::sim::path::Placement;

/// Quality levels chosen by the performance governor
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum QualityLevel {
    Low,
    Medium,
    #[default]
    High,
}

impl QualityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityLevel::Low => "Low",
            QualityLevel::Medium => "Medium",
            QualityLevel::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityLevel::Low),
            "medium" | "med" => Some(QualityLevel::Medium),
            "high" => Some(QualityLevel::High),
            _ => None,
        }
    }

    /// How many blocks around the player get per-tick animation updates
    pub fn update_breadth(&self) -> usize {
        match self {
            QualityLevel::Low => 5,
            QualityLevel::Medium => 7,
            QualityLevel::High => 10,
        }
    }

    /// One level up (saturating)
    pub fn step_up(&self) -> Self {
        match self {
            QualityLevel::Low => QualityLevel::Medium,
            QualityLevel::Medium | QualityLevel::High => QualityLevel::High,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config field `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === Charge & jump ===
    /// Charge time (ms) that yields full power
    pub max_charge_ms: f64,
    pub jump_duration_ms: f64,
    pub fall_duration_ms: f64,
    pub fall_depth: f32,

    // === Landing ===
    pub landing_threshold: f32,
    pub perfect_distance: f32,
    pub good_distance: f32,
    pub landing_window_behind: usize,
    pub landing_window_ahead: usize,

    // === Path ===
    pub initial_blocks: usize,
    pub min_blocks_ahead: usize,
    pub cleanup_radius: f32,
    pub cleanup_index_lag: usize,
    pub step_min_distance: f32,
    pub step_max_distance: f32,
    /// Forward fan half-width as a fraction of π
    pub step_angle_spread: f32,

    // === Pool ===
    pub pool_prealloc: usize,
    pub max_pool_size: usize,

    // === Camera ===
    pub camera_rate: f32,
    pub camera_offset: [f32; 3],

    // === Performance ===
    pub adaptive_quality: bool,
    pub initial_quality: QualityLevel,
    pub fps_window: usize,
    pub fps_low: f32,
    pub fps_medium: f32,
    pub fps_high: f32,

    // === Scheduler ===
    pub min_frame_interval_ms: f64,
    pub max_frame_dt: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_charge_ms: MAX_CHARGE_MS,
            jump_duration_ms: JUMP_DURATION_MS,
            fall_duration_ms: FALL_DURATION_MS,
            fall_depth: FALL_DEPTH,

            landing_threshold: LANDING_THRESHOLD,
            perfect_distance: PERFECT_DISTANCE,
            good_distance: GOOD_DISTANCE,
            landing_window_behind: LANDING_WINDOW_BEHIND,
            landing_window_ahead: LANDING_WINDOW_AHEAD,

            initial_blocks: INITIAL_BLOCKS,
            min_blocks_ahead: MIN_BLOCKS_AHEAD,
            cleanup_radius: CLEANUP_RADIUS,
            cleanup_index_lag: CLEANUP_INDEX_LAG,
            step_min_distance: STEP_MIN_DISTANCE,
            step_max_distance: STEP_MAX_DISTANCE,
            step_angle_spread: STEP_ANGLE_SPREAD,

            pool_prealloc: POOL_PREALLOC,
            max_pool_size: MAX_POOL_SIZE,

            camera_rate: CAMERA_RATE,
            camera_offset: CAMERA_OFFSET,

            adaptive_quality: true,
            initial_quality: QualityLevel::High,
            fps_window: FPS_WINDOW,
            fps_low: FPS_LOW,
            fps_medium: FPS_MEDIUM,
            fps_high: FPS_HIGH,

            min_frame_interval_ms: MIN_FRAME_INTERVAL_MS,
            max_frame_dt: MAX_FRAME_DT,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON config; absent fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: &'static str) -> Result<(), ConfigError> {
            Err(ConfigError::Invalid { field, reason })
        }
        // NaN fails too
        fn positive<T: PartialOrd + Default>(v: T) -> bool {
            v > T::default()
        }

        if !positive(self.max_charge_ms) {
            return invalid("max_charge_ms", "must be positive");
        }
        if !positive(self.jump_duration_ms) {
            return invalid("jump_duration_ms", "must be positive");
        }
        if !positive(self.fall_duration_ms) {
            return invalid("fall_duration_ms", "must be positive");
        }
        if !positive(self.landing_threshold) {
            return invalid("landing_threshold", "must be positive");
        }
        if !(self.perfect_distance <= self.good_distance && self.good_distance <= self.landing_threshold) {
            return invalid("good_distance", "tiers must satisfy perfect <= good <= threshold");
        }
        if self.initial_blocks < 2 {
            return invalid("initial_blocks", "need a start block and one target");
        }
        if self.landing_window_ahead < 2 {
            return invalid("landing_window_ahead", "must reach at least the next block");
        }
        if !(self.step_min_distance > 0.0 && self.step_min_distance <= self.step_max_distance) {
            return invalid("step_min_distance", "must be positive and <= step_max_distance");
        }
        if !(0.0..0.5).contains(&self.step_angle_spread) {
            return invalid("step_angle_spread", "must lie in [0, 0.5) so the path moves forward");
        }
        if self.cleanup_radius.is_nan() || self.cleanup_radius < 0.0 {
            return invalid("cleanup_radius", "must not be negative");
        }
        if self.camera_rate.is_nan() || self.camera_rate < 0.0 {
            return invalid("camera_rate", "must not be negative");
        }
        if self.fps_window == 0 {
            return invalid("fps_window", "must hold at least one sample");
        }
        if !(self.fps_low <= self.fps_medium && self.fps_medium <= self.fps_high) {
            return invalid("fps_medium", "thresholds must satisfy low <= medium <= high");
        }
        if !positive(self.max_frame_dt) {
            return invalid("max_frame_dt", "must be positive");
        }
        Ok(())
    }

    pub fn placement(&self) -> Placement {
        Placement {
            min_distance: self.step_min_distance,
            max_distance: self.step_max_distance,
            max_angle: self.step_angle_spread * std::f32::consts::PI,
        }
    }

    pub fn landing_rules(&self) -> LandingRules {
        LandingRules {
            threshold: self.landing_threshold,
            perfect: self.perfect_distance,
            good: self.good_distance,
            window_behind: self.landing_window_behind,
            window_ahead: self.landing_window_ahead,
        }
    }
}
