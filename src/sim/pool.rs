//! Bounded block pool
//!
//! Blocks live in an arena of slots. A slot is either vacant (destroyed),
//! holding an active block (on the path), or holding a recycled block whose
//! index sits on the free list. The free list is bounded by `max_pool_size`;
//! overflowing it destroys the oldest recycled entry.

use std::collections::VecDeque;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::state::{Block, BlockKind};

/// Stable reference to a pooled block.
///
/// The id changes every time a slot is re-acquired, so a handle kept past a
/// release can never alias the slot's next occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockHandle {
    pub slot: u32,
    pub id: u32,
}

/// Lifetime counters for the pool
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Blocks built from scratch
    pub created: u64,
    /// Acquisitions served from the free list
    pub reused: u64,
    /// Recycled blocks dropped because the free list was full
    pub destroyed: u64,
    /// Blocks currently on the path
    pub active: usize,
    /// Blocks currently waiting on the free list
    pub free: usize,
}

#[derive(Debug, Clone)]
pub struct BlockPool {
    slots: Vec<Option<Block>>,
    /// Recycled slot indices, oldest at the front
    free: VecDeque<u32>,
    /// Destroyed slot indices available for fresh construction
    vacant: Vec<u32>,
    max_pool_size: usize,
    next_id: u32,
    active: usize,
    created: u64,
    reused: u64,
    destroyed: u64,
}

impl BlockPool {
    /// Create a pool with `prealloc` idle blocks ready for reuse
    pub fn new(prealloc: usize, max_pool_size: usize) -> Self {
        let prealloc = prealloc.min(max_pool_size);
        let mut pool = Self {
            slots: Vec::with_capacity(max_pool_size.max(prealloc)),
            free: VecDeque::with_capacity(max_pool_size + 1),
            vacant: Vec::new(),
            max_pool_size,
            next_id: 1,
            active: 0,
            created: 0,
            reused: 0,
            destroyed: 0,
        };

        for _ in 0..prealloc {
            let slot = pool.slots.len() as u32;
            let mut block = Block::new(0, Vec3::ZERO, BlockKind::Normal);
            block.active = false;
            pool.slots.push(Some(block));
            pool.free.push_back(slot);
            pool.created += 1;
        }

        pool
    }

    fn next_block_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Take a block for the path, reusing a recycled one when available
    pub fn acquire(&mut self, pos: Vec3, kind: BlockKind) -> BlockHandle {
        let id = self.next_block_id();
        self.active += 1;

        // Most recently recycled first
        if let Some(slot) = self.free.pop_back() {
            if let Some(block) = self.slots[slot as usize].as_mut() {
                block.reset(id, pos, kind);
                self.reused += 1;
                return BlockHandle { slot, id };
            }
            // A free index always points at a filled slot; rebuild if not
            self.slots[slot as usize] = Some(Block::new(id, pos, kind));
            self.created += 1;
            return BlockHandle { slot, id };
        }

        let block = Block::new(id, pos, kind);
        self.created += 1;
        let slot = match self.vacant.pop() {
            Some(slot) => {
                self.slots[slot as usize] = Some(block);
                slot
            }
            None => {
                self.slots.push(Some(block));
                (self.slots.len() - 1) as u32
            }
        };
        BlockHandle { slot, id }
    }

    /// Return a block to the pool.
    ///
    /// Returns `false` (and changes nothing) for stale or already released
    /// handles.
    pub fn release(&mut self, handle: BlockHandle) -> bool {
        let Some(Some(block)) = self.slots.get_mut(handle.slot as usize) else {
            log::warn!("Ignoring release of unknown block {}", handle.id);
            return false;
        };
        if block.id != handle.id || !block.active {
            log::warn!("Ignoring duplicate release of block {}", handle.id);
            return false;
        }

        block.active = false;
        self.active -= 1;
        self.free.push_back(handle.slot);

        while self.free.len() > self.max_pool_size {
            if let Some(oldest) = self.free.pop_front() {
                self.slots[oldest as usize] = None;
                self.vacant.push(oldest);
                self.destroyed += 1;
                log::debug!("Pool full ({}), destroyed oldest recycled block", self.max_pool_size);
            }
        }
        true
    }

    /// Active block behind a handle
    pub fn get(&self, handle: BlockHandle) -> Option<&Block> {
        self.slots
            .get(handle.slot as usize)
            .and_then(Option::as_ref)
            .filter(|b| b.active && b.id == handle.id)
    }

    pub fn get_mut(&mut self, handle: BlockHandle) -> Option<&mut Block> {
        self.slots
            .get_mut(handle.slot as usize)
            .and_then(Option::as_mut)
            .filter(|b| b.active && b.id == handle.id)
    }

    /// Whether the handle refers to a block currently on the path
    pub fn is_active(&self, handle: BlockHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Whether the slot is currently parked on the free list
    pub fn is_free_slot(&self, slot: u32) -> bool {
        self.free.contains(&slot)
    }

    pub fn free_len(&self) -> usize {
        self.free.len()
    }

    pub fn active_len(&self) -> usize {
        self.active
    }

    pub fn max_pool_size(&self) -> usize {
        self.max_pool_size
    }

    /// All active blocks
    pub fn active_blocks(&self) -> impl Iterator<Item = &Block> {
        self.slots.iter().flatten().filter(|b| b.active)
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            created: self.created,
            reused: self.reused,
            destroyed: self.destroyed,
            active: self.active,
            free: self.free.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn acquire_n(pool: &mut BlockPool, n: usize) -> Vec<BlockHandle> {
        (0..n)
            .map(|i| pool.acquire(Vec3::new(i as f32, 0.0, 0.0), BlockKind::Normal))
            .collect()
    }

    #[test]
    fn test_prealloc_is_reused_first() {
        let mut pool = BlockPool::new(3, 5);
        assert_eq!(pool.free_len(), 3);
        assert_eq!(pool.stats().created, 3);

        let h = pool.acquire(Vec3::new(1.0, 0.0, 2.0), BlockKind::Tall);
        assert_eq!(pool.free_len(), 2);
        assert_eq!(pool.stats().reused, 1);
        assert_eq!(pool.stats().created, 3);

        let block = pool.get(h).unwrap();
        assert_eq!(block.kind, BlockKind::Tall);
        assert_eq!(block.radius, 0.8);
        assert_eq!(block.height, 1.5);
        assert!(block.active);
    }

    #[test]
    fn test_prealloc_capped_by_max() {
        let pool = BlockPool::new(10, 4);
        assert_eq!(pool.free_len(), 4);
    }

    #[test]
    fn test_duplicate_release_is_ignored() {
        let mut pool = BlockPool::new(0, 4);
        let h = pool.acquire(Vec3::ZERO, BlockKind::Normal);
        assert!(pool.release(h));
        assert!(!pool.release(h));
        assert_eq!(pool.free_len(), 1);
        assert_eq!(pool.active_len(), 0);
    }

    #[test]
    fn test_stale_handle_cannot_touch_new_occupant() {
        let mut pool = BlockPool::new(0, 4);
        let old = pool.acquire(Vec3::ZERO, BlockKind::Normal);
        pool.release(old);
        let new = pool.acquire(Vec3::ONE, BlockKind::Small);
        assert_eq!(old.slot, new.slot);
        assert_ne!(old.id, new.id);

        assert!(pool.get(old).is_none());
        assert!(!pool.release(old));
        assert!(pool.is_active(new));
    }

    #[test]
    fn test_overflow_destroys_oldest() {
        let mut pool = BlockPool::new(0, 2);
        let handles = acquire_n(&mut pool, 3);
        for h in &handles {
            pool.release(*h);
        }
        assert_eq!(pool.free_len(), 2);
        assert_eq!(pool.stats().destroyed, 1);
        // The first returned slot went away
        assert!(!pool.is_free_slot(handles[0].slot));
        assert!(pool.is_free_slot(handles[1].slot));
        assert!(pool.is_free_slot(handles[2].slot));

        // Destroyed slots come back only through fresh construction
        let _ = acquire_n(&mut pool, 3);
        assert_eq!(pool.stats().created, 4);
        assert_eq!(pool.stats().reused, 2);
    }

    #[test]
    fn test_zero_capacity_pool_never_retains() {
        let mut pool = BlockPool::new(5, 0);
        let h = pool.acquire(Vec3::ZERO, BlockKind::Normal);
        assert!(pool.release(h));
        assert_eq!(pool.free_len(), 0);
        assert_eq!(pool.stats().destroyed, 1);
    }

    proptest! {
        #[test]
        fn prop_pool_partition_holds(
            max in 0usize..8,
            ops in prop::collection::vec((any::<bool>(), 0usize..16), 1..200),
        ) {
            let mut pool = BlockPool::new(4, max);
            let mut live: Vec<BlockHandle> = Vec::new();
            let mut dead: Vec<BlockHandle> = Vec::new();

            for (acquire, pick) in ops {
                if acquire || live.is_empty() {
                    live.push(pool.acquire(Vec3::ZERO, BlockKind::Small));
                } else {
                    let h = live.swap_remove(pick % live.len());
                    prop_assert!(pool.release(h));
                    dead.push(h);
                }
                // Replaying the latest stale release must be rejected
                if let Some(h) = dead.last() {
                    prop_assert!(!pool.release(*h));
                }

                prop_assert!(pool.free_len() <= max);
                prop_assert_eq!(pool.active_len(), live.len());
                for h in &live {
                    prop_assert!(pool.is_active(*h));
                    prop_assert!(!pool.is_free_slot(h.slot));
                }
            }
        }
    }
}
