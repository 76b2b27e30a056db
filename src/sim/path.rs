//! Procedural path of landing blocks
//!
//! `ActivePath` is the ordered run of blocks currently in play. It only grows
//! at the back and shrinks at the front, and indices are absolute: pruning
//! bumps `base` instead of renumbering, so a block keeps its index for as
//! long as it is on the path.

use std::collections::VecDeque;
use std::ops::Range;

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::pool::{BlockHandle, BlockPool};
use super::state::BlockKind;
use crate::heading_offset;

#[derive(Debug, Clone, Default)]
pub struct ActivePath {
    /// Absolute index of the front block
    base: usize,
    blocks: VecDeque<BlockHandle>,
}

impl ActivePath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Absolute index of the first block still on the path
    pub fn start(&self) -> usize {
        self.base
    }

    /// One past the absolute index of the last block
    pub fn end(&self) -> usize {
        self.base + self.blocks.len()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<BlockHandle> {
        index
            .checked_sub(self.base)
            .and_then(|i| self.blocks.get(i).copied())
    }

    pub fn last(&self) -> Option<BlockHandle> {
        self.blocks.back().copied()
    }

    pub fn push(&mut self, handle: BlockHandle) {
        self.blocks.push_back(handle);
    }

    /// Drop the front block, keeping every other index unchanged
    pub fn pop_front(&mut self) -> Option<BlockHandle> {
        let handle = self.blocks.pop_front()?;
        self.base += 1;
        Some(handle)
    }

    /// Clamp an absolute range to the blocks present on the path
    pub fn clamp(&self, range: Range<usize>) -> Range<usize> {
        let start = range.start.max(self.start());
        let end = range.end.min(self.end());
        start..end.max(start)
    }

    /// `(absolute index, handle)` pairs within an absolute range
    pub fn window(&self, range: Range<usize>) -> impl Iterator<Item = (usize, BlockHandle)> + '_ {
        self.clamp(range).filter_map(move |i| self.get(i).map(|h| (i, h)))
    }

    pub fn handles(&self) -> impl Iterator<Item = BlockHandle> + '_ {
        self.blocks.iter().copied()
    }

    /// Empty the path and restart numbering from zero
    pub fn clear(&mut self) -> Vec<BlockHandle> {
        self.base = 0;
        self.blocks.drain(..).collect()
    }
}

/// How far and how wide the next block may land
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub min_distance: f32,
    pub max_distance: f32,
    /// Half-width of the forward fan (radians)
    pub max_angle: f32,
}

/// One sampled step from the previous block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub distance: f32,
    pub angle: f32,
    pub kind: BlockKind,
}

/// Seeded generator for the forward path
#[derive(Debug, Clone)]
pub struct PathGenerator {
    rng: Pcg32,
    placement: Placement,
}

impl PathGenerator {
    pub fn new(seed: u64, placement: Placement) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            placement,
        }
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Draw distance, heading and kind for the next block
    pub fn sample_step(&mut self) -> Step {
        let p = self.placement;
        let distance = self.rng.random_range(p.min_distance..=p.max_distance);
        let angle = self.rng.random_range(-p.max_angle..=p.max_angle);
        let kind = BlockKind::GENERATED[self.rng.random_range(0..BlockKind::GENERATED.len())];
        Step {
            distance,
            angle,
            kind,
        }
    }

    /// Where a block following `last` goes
    pub fn next_position(last: Vec3, step: &Step) -> Vec3 {
        let offset = heading_offset(step.distance, step.angle);
        Vec3::new(last.x + offset.x, 0.0, last.z + offset.y)
    }

    /// Acquire and append the next block, returning its handle
    pub fn extend(&mut self, path: &mut ActivePath, pool: &mut BlockPool) -> BlockHandle {
        let last = path
            .last()
            .and_then(|h| pool.get(h))
            .map(|b| b.position)
            .unwrap_or(Vec3::ZERO);

        let step = self.sample_step();
        let pos = Self::next_position(last, &step);
        let handle = pool.acquire(pos, step.kind);
        path.push(handle);

        log::debug!(
            "Block {} ({}) at ({:.2}, {:.2}), step {:.2} @ {:.2} rad",
            path.end() - 1,
            step.kind.as_str(),
            pos.x,
            pos.z,
            step.distance,
            step.angle
        );
        handle
    }
}
