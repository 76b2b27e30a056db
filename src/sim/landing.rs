//! Landing resolution
//!
//! When a jump completes, only a small index window around the current
//! block is searched. Candidates are compared by squared planar distance;
//! the single square root is taken for the winner.

use std::cmp::Ordering;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::path::ActivePath;
use super::pool::{BlockHandle, BlockPool};
use crate::consts::*;
use crate::planar_distance_squared;

/// How good a landing was
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LandingTier {
    Perfect,
    Good,
    Ordinary,
}

impl LandingTier {
    pub fn points(&self) -> u32 {
        match self {
            LandingTier::Perfect => PERFECT_POINTS,
            LandingTier::Good => GOOD_POINTS,
            LandingTier::Ordinary => ORDINARY_POINTS,
        }
    }
}

/// Distance thresholds and search window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandingRules {
    /// Landings at or beyond this distance miss
    pub threshold: f32,
    pub perfect: f32,
    pub good: f32,
    pub window_behind: usize,
    pub window_ahead: usize,
}

impl Default for LandingRules {
    fn default() -> Self {
        Self {
            threshold: LANDING_THRESHOLD,
            perfect: PERFECT_DISTANCE,
            good: GOOD_DISTANCE,
            window_behind: LANDING_WINDOW_BEHIND,
            window_ahead: LANDING_WINDOW_AHEAD,
        }
    }
}

impl LandingRules {
    /// Tier for a landing `distance` from the block center, `None` on a miss
    pub fn tier(&self, distance: f32) -> Option<LandingTier> {
        if distance.is_nan() || distance >= self.threshold {
            return None;
        }
        Some(if distance < self.perfect {
            LandingTier::Perfect
        } else if distance < self.good {
            LandingTier::Good
        } else {
            LandingTier::Ordinary
        })
    }

    /// Absolute index range searched around `current`
    pub fn window(&self, current: usize) -> std::ops::Range<usize> {
        current.saturating_sub(self.window_behind)..current + self.window_ahead
    }
}

/// Closest block found in the window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub index: usize,
    pub handle: BlockHandle,
    pub distance_sq: f32,
}

impl Candidate {
    /// Total order: nearer first, lower index on ties
    fn cmp_nearest(&self, other: &Self) -> Ordering {
        self.distance_sq
            .partial_cmp(&other.distance_sq)
            .unwrap_or(Ordering::Equal)
            .then(self.index.cmp(&other.index))
    }
}

/// Outcome of a completed jump
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Landing {
    Landed {
        index: usize,
        handle: BlockHandle,
        distance: f32,
        tier: LandingTier,
    },
    Missed {
        /// Distance to the nearest window block, if any
        nearest: Option<f32>,
    },
}

/// Nearest block to `point` among `candidates`
pub fn nearest<I>(candidates: I, pool: &BlockPool, point: Vec3) -> Option<Candidate>
where
    I: IntoIterator<Item = (usize, BlockHandle)>,
{
    candidates
        .into_iter()
        .filter_map(|(index, handle)| {
            pool.get(handle).map(|block| Candidate {
                index,
                handle,
                distance_sq: planar_distance_squared(point, block.position),
            })
        })
        .min_by(Candidate::cmp_nearest)
}

/// Nearest block within the landing window around `current`
pub fn nearest_in_window(
    path: &ActivePath,
    pool: &BlockPool,
    rules: &LandingRules,
    current: usize,
    point: Vec3,
) -> Option<Candidate> {
    nearest(path.window(rules.window(current)), pool, point)
}

/// Decide whether a landing at `point` hits a block and how well
pub fn resolve(
    path: &ActivePath,
    pool: &BlockPool,
    rules: &LandingRules,
    current: usize,
    point: Vec3,
) -> Landing {
    let Some(best) = nearest_in_window(path, pool, rules, current, point) else {
        return Landing::Missed { nearest: None };
    };

    let distance = best.distance_sq.sqrt();
    match rules.tier(distance) {
        Some(tier) => Landing::Landed {
            index: best.index,
            handle: best.handle,
            distance,
            tier,
        },
        None => Landing::Missed {
            nearest: Some(distance),
        },
    }
}

/// Number of front blocks that may be recycled.
///
/// A block qualifies when it is more than `radius` from `player` on the
/// ground plane and its index is below `current - lag`. Counting stops at
/// the first block that does not qualify so the path is only cut at the
/// front. A qualifying block behind a near one stays on the path until the
/// near one qualifies too.
pub fn prunable_front(
    path: &ActivePath,
    pool: &BlockPool,
    current: usize,
    player: Vec3,
    radius: f32,
    lag: usize,
) -> usize {
    let Some(limit) = current.checked_sub(lag) else {
        return 0;
    };
    let radius_sq = radius * radius;

    path.window(path.start()..limit)
        .take_while(|(_, handle)| {
            pool.get(*handle)
                .map(|b| planar_distance_squared(player, b.position) > radius_sq)
                .unwrap_or(true)
        })
        .count()
}
