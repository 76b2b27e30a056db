//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only advances through `tick`
//! - Seeded RNG only
//! - Stable iteration order (by absolute path index)
//! - No rendering or platform dependencies

pub mod camera;
pub mod ease;
pub mod landing;
pub mod path;
pub mod player;
pub mod pool;
pub mod state;
pub mod tick;

pub use camera::{CameraTracker, CameraView};
pub use landing::{Landing, LandingRules, LandingTier};
pub use path::{ActivePath, PathGenerator, Placement};
pub use player::{Motion, MotionEvent, Player};
pub use pool::{BlockHandle, BlockPool, PoolStats};
pub use state::{Block, BlockKind, GameEvent, GamePhase, GameSession, GameState};
pub use tick::{charge_power, jump_distance, jump_height, tick};
