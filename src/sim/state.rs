//! Game state and core simulation types
//!
//! Everything a round needs lives on `GameState`; the engine owns exactly
//! one and drives it through `tick`.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::camera::CameraTracker;
use super::ease::ease_out_cubic;
use super::landing::LandingTier;
use super::path::{ActivePath, PathGenerator};
use super::player::Player;
use super::pool::BlockPool;
use crate::consts::*;
use crate::settings::EngineConfig;

/// Current phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Standing on a block, waiting for charge input
    #[default]
    Waiting,
    /// Charge input held
    Charging,
    /// Jump arc in flight
    Jumping,
    /// Missed the landing, falling off the path
    Falling,
    /// Fall finished, round over
    GameOver,
}

/// Platform types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlockKind {
    /// Wide first block of every path
    Start,
    #[default]
    Normal,
    Small,
    Tall,
    /// Bonus block (rendered gold, spins)
    Special,
}

impl BlockKind {
    /// Kinds the path generator draws from
    pub const GENERATED: [BlockKind; 4] = [
        BlockKind::Normal,
        BlockKind::Small,
        BlockKind::Tall,
        BlockKind::Special,
    ];

    pub fn radius(&self) -> f32 {
        match self {
            BlockKind::Start => 1.2,
            BlockKind::Normal => 1.0,
            BlockKind::Small => 0.6,
            BlockKind::Tall => 0.8,
            BlockKind::Special => 1.0,
        }
    }

    pub fn height(&self) -> f32 {
        match self {
            BlockKind::Start => 0.6,
            BlockKind::Normal => 0.5,
            BlockKind::Small => 0.4,
            BlockKind::Tall => 1.5,
            BlockKind::Special => 0.5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Start => "start",
            BlockKind::Normal => "normal",
            BlockKind::Small => "small",
            BlockKind::Tall => "tall",
            BlockKind::Special => "special",
        }
    }
}

/// A landing platform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: u32,
    pub position: Vec3,
    pub kind: BlockKind,
    pub radius: f32,
    pub height: f32,
    pub active: bool,
    /// Entrance animation progress (0 = just spawned, 1 = settled)
    #[serde(skip)]
    pub rise: f32,
    /// Spin angle for special blocks (radians)
    #[serde(skip)]
    pub spin: f32,
}

impl Block {
    pub fn new(id: u32, position: Vec3, kind: BlockKind) -> Self {
        Self {
            id,
            position,
            kind,
            radius: kind.radius(),
            height: kind.height(),
            active: true,
            rise: 0.0,
            spin: 0.0,
        }
    }

    /// Re-initialize a recycled block for a new spot on the path
    pub fn reset(&mut self, id: u32, position: Vec3, kind: BlockKind) {
        *self = Self::new(id, position, kind);
    }

    /// Advance presentation-only animation
    pub fn animate(&mut self, dt: f32) {
        if self.rise < 1.0 {
            self.rise = (self.rise + dt * 1000.0 / BLOCK_RISE_MS).min(1.0);
        }
        if self.kind == BlockKind::Special {
            self.spin = (self.spin + dt * SPECIAL_SPIN_SPEED) % std::f32::consts::TAU;
        }
    }

    /// Eased entrance scale in [0, 1]
    pub fn entrance(&self) -> f32 {
        ease_out_cubic(self.rise)
    }
}

/// Score and progress of the current round
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    pub score: u64,
    /// Absolute path index of the block the player stands on
    pub current_block_index: usize,
    pub phase: GamePhase,
    pub max_charge_ms: f64,
}

impl GameSession {
    pub fn new(max_charge_ms: f64) -> Self {
        Self {
            score: 0,
            current_block_index: 0,
            phase: GamePhase::Waiting,
            max_charge_ms,
        }
    }
}

/// Discrete things that happened during an operation or tick
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    ScoreChanged(u64),
    /// Charge power as a percentage (0..=100)
    PowerChanged(f32),
    Landed {
        block_id: u32,
        index: usize,
        distance: f32,
        tier: LandingTier,
    },
    /// Nearest candidate distance, if the window held any block
    Missed { distance: Option<f32> },
    GameOver { score: u64 },
    BlockSpawned(Block),
    BlockRecycled(u32),
}

/// Complete simulation state for one engine
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub config: EngineConfig,
    pub session: GameSession,
    /// Whether the round accepts input (false before start and after a miss)
    pub in_play: bool,
    /// Simulation clock (ms), advanced only by ticks
    pub clock_ms: f64,
    pub player: Player,
    pub path: ActivePath,
    pub pool: BlockPool,
    pub generator: PathGenerator,
    pub camera: CameraTracker,
    pub(crate) events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new game state with the given seed and a fresh initial path
    pub fn new(config: EngineConfig, seed: u64) -> Self {
        let mut state = Self {
            seed,
            session: GameSession::new(config.max_charge_ms),
            in_play: false,
            clock_ms: 0.0,
            player: Player::new(),
            path: ActivePath::new(),
            pool: BlockPool::new(config.pool_prealloc, config.max_pool_size),
            generator: PathGenerator::new(seed, config.placement()),
            camera: CameraTracker::new(Vec3::from(config.camera_offset), config.camera_rate),
            events: Vec::new(),
            config,
        };

        state.build_initial_path();

        state
    }

    /// Start block at the origin followed by generated blocks
    pub(crate) fn build_initial_path(&mut self) {
        let start = self.pool.acquire(Vec3::ZERO, BlockKind::Start);
        self.path.push(start);
        if let Some(block) = self.pool.get(start) {
            self.events.push(GameEvent::BlockSpawned(*block));
        }

        for _ in 1..self.config.initial_blocks.max(1) {
            self.extend_path();
        }

        self.player.set_position(Vec3::new(0.0, PLAYER_REST_Y, 0.0));
    }

    /// Append one generated block to the path
    pub(crate) fn extend_path(&mut self) {
        let handle = self.generator.extend(&mut self.path, &mut self.pool);
        if let Some(block) = self.pool.get(handle) {
            self.events.push(GameEvent::BlockSpawned(*block));
        }
    }

    /// Block the player currently stands on
    pub fn current_block(&self) -> Option<&Block> {
        self.block_at(self.session.current_block_index)
    }

    /// Block at an absolute path index
    pub fn block_at(&self, index: usize) -> Option<&Block> {
        self.path.get(index).and_then(|h| self.pool.get(h))
    }

    /// Active path blocks in path order
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.path.handles().filter_map(|h| self.pool.get(h))
    }

    /// Take the events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
