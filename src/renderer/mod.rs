//! Rendering seam
//!
//! The simulation never draws. The engine tells a `Renderer` when blocks
//! enter or leave the scene and hands it a read-only `FrameView` once per
//! processed frame.

use glam::Vec3;

use crate::settings::QualityLevel;
use crate::sim::camera::CameraView;
use crate::sim::state::{Block, GamePhase, GameState};

/// Everything needed to draw one frame
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub camera: CameraView,
    pub player: Vec3,
    pub phase: GamePhase,
    pub score: u64,
    pub quality: QualityLevel,
    state: &'a GameState,
}

impl<'a> FrameView<'a> {
    pub fn new(state: &'a GameState, quality: QualityLevel) -> Self {
        Self {
            camera: state.camera.view(state.player.position),
            player: state.player.position,
            phase: state.session.phase,
            score: state.session.score,
            quality,
            state,
        }
    }

    /// Blocks on the path, front to back
    pub fn blocks(&self) -> impl Iterator<Item = &'a Block> + 'a {
        self.state.blocks()
    }
}

/// Scene backend driven by the engine
pub trait Renderer {
    /// A block entered the scene
    fn add(&mut self, block: &Block);
    /// A block left the scene
    fn remove(&mut self, block_id: u32);
    fn render(&mut self, frame: &FrameView<'_>);
}

/// Renderer that draws nothing and keeps count
#[derive(Debug, Clone, Default)]
pub struct HeadlessRenderer {
    pub added: u64,
    pub removed: u64,
    pub frames: u64,
    /// Ids currently in the scene
    pub live: Vec<u32>,
    pub last_score: u64,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Renderer for HeadlessRenderer {
    fn add(&mut self, block: &Block) {
        self.added += 1;
        self.live.push(block.id);
        log::trace!(
            "add block {} ({}) at ({:.2}, {:.2})",
            block.id,
            block.kind.as_str(),
            block.position.x,
            block.position.z
        );
    }

    fn remove(&mut self, block_id: u32) {
        self.removed += 1;
        self.live.retain(|&id| id != block_id);
        log::trace!("remove block {}", block_id);
    }

    fn render(&mut self, frame: &FrameView<'_>) {
        self.frames += 1;
        self.last_score = frame.score;
        log::trace!(
            "frame {}: {} blocks ({} rising), eye ({:.2}, {:.2}, {:.2}), quality {}",
            self.frames,
            frame.blocks().count(),
            frame.blocks().filter(|b| b.entrance() < 1.0).count(),
            frame.camera.eye.x,
            frame.camera.eye.y,
            frame.camera.eye.z,
            frame.quality.as_str()
        );
    }
}
