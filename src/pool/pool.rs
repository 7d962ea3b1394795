//! Pool orchestration and queue operations
//!
//! Integration layer tying the backing buffer, the slot table, placement
//! and compaction together behind the public queue API. All operations
//! run to completion on a single logical owner; the pool carries no
//! internal synchronization.

use super::compact as compactor;
use super::placement;
use super::slot::QueueId;
use super::table::SlotTable;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Construction-time pool parameters.
///
/// The defaults mirror the classic layout: 2048 pool bytes, 64 queue
/// slots and a 32-byte growth increment, so a full table of default-size
/// queues exactly fills the pool. None of these are tunable after
/// construction; all capacity math derives from them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Backing buffer size in bytes
    pub pool_size: usize,
    /// Maximum number of simultaneously active queues
    pub max_queues: usize,
    /// Capacity step for queue growth and shrink
    pub growth_increment: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            pool_size: 2048,
            max_queues: 64,
            growth_increment: 32,
        }
    }
}

/// Point-in-time snapshot of pool occupancy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolStats {
    /// Queues currently active
    pub active_queues: usize,
    /// Bytes of live queue content
    pub live_bytes: usize,
    /// Bytes reserved by active regions
    pub reserved_bytes: usize,
    /// Bytes not reserved by any region
    pub free_bytes: usize,
    /// Free gaps between or around regions; compaction leaves at most one
    pub gap_count: usize,
}

/// Fixed-capacity memory pool hosting growable FIFO byte queues.
///
/// One contiguous buffer is the only byte storage. Queues are created
/// with one increment of reserved capacity, grow and shrink in whole
/// increments, and are relocated by first-fit placement backed by a
/// single compaction retry when no direct gap exists.
pub struct BytePool {
    buf: Box<[u8]>,
    slots: SlotTable,
    config: PoolConfig,
}

impl BytePool {
    /// Create a pool with the default configuration (2048 / 64 / 32)
    pub fn new() -> Self {
        let config = PoolConfig::default();
        Self {
            buf: vec![0u8; config.pool_size].into_boxed_slice(),
            slots: SlotTable::new(config.max_queues),
            config,
        }
    }

    /// Create a pool with custom bounds
    pub fn with_config(config: PoolConfig) -> Result<Self> {
        if config.growth_increment == 0 {
            return Err(Error::InvalidConfig(
                "growth_increment must be nonzero".to_string(),
            ));
        }
        if config.pool_size < config.growth_increment {
            return Err(Error::InvalidConfig(format!(
                "pool_size {} cannot hold a single {}-byte increment",
                config.pool_size, config.growth_increment
            )));
        }
        if config.max_queues == 0 || config.max_queues > u16::MAX as usize {
            return Err(Error::InvalidConfig(format!(
                "max_queues {} out of range [1, {}]",
                config.max_queues,
                u16::MAX
            )));
        }

        info!(
            pool_size = config.pool_size,
            max_queues = config.max_queues,
            growth_increment = config.growth_increment,
            "initialized byte pool"
        );

        Ok(Self {
            buf: vec![0u8; config.pool_size].into_boxed_slice(),
            slots: SlotTable::new(config.max_queues),
            config,
        })
    }

    /// Effective pool configuration
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Create a queue with one increment of reserved capacity.
    ///
    /// Slot availability is checked before placement, so a full table
    /// reports `CapacityExhausted` rather than `OutOfMemory`. When no
    /// region can be found even after compaction, the claimed slot is
    /// released again before the error surfaces.
    pub fn create_queue(&mut self) -> Result<QueueId> {
        let id = self.slots.allocate()?;
        let increment = self.config.growth_increment;

        match self.place_new(increment) {
            Ok(offset) => {
                let desc = self.slots.get_mut(id)?;
                desc.region_start = offset;
                desc.capacity = increment;
                debug!(queue = %id, offset, capacity = increment, "created queue");
                Ok(id)
            }
            Err(err) => {
                self.slots.free(id);
                Err(err)
            }
        }
    }

    /// Destroy a queue, optionally wiping its region bytes.
    ///
    /// The freed region is not compacted eagerly; it is reclaimed when a
    /// later placement needs the space.
    pub fn destroy_queue(&mut self, id: QueueId, wipe: bool) -> Result<()> {
        let desc = *self.slots.get(id)?;
        if wipe {
            self.buf[desc.region_start..desc.region_end()].fill(0);
        }
        self.slots.free(id);
        debug!(queue = %id, wiped = wipe, "destroyed queue");
        Ok(())
    }

    /// Append a byte at the tail of a queue, growing its reservation by
    /// one increment when full.
    pub fn enqueue(&mut self, id: QueueId, byte: u8) -> Result<()> {
        let desc = *self.slots.get(id)?;
        if desc.len + 1 > desc.capacity {
            self.grow(id)?;
        }

        let desc = *self.slots.get(id)?;
        self.buf[desc.region_start + desc.len] = byte;
        self.slots.get_mut(id)?.len += 1;
        Ok(())
    }

    /// Remove and return the byte at the head of a queue.
    ///
    /// Remaining bytes shift left by one; the vacated last byte is
    /// zeroed. Capacity shrinks by at most one increment per call when a
    /// whole increment of slack exists, and never below one increment.
    pub fn dequeue(&mut self, id: QueueId) -> Result<u8> {
        let desc = *self.slots.get(id)?;
        if desc.len == 0 {
            return Err(Error::EmptyQueue(id));
        }

        let start = desc.region_start;
        let byte = self.buf[start];
        self.buf.copy_within(start + 1..start + desc.len, start);
        self.buf[start + desc.len - 1] = 0;

        let increment = self.config.growth_increment;
        let desc = self.slots.get_mut(id)?;
        desc.len -= 1;
        if desc.capacity > increment && desc.len <= desc.capacity - increment {
            desc.capacity -= increment;
        }
        Ok(byte)
    }

    /// Live byte count of a queue
    pub fn len(&self, id: QueueId) -> Result<usize> {
        Ok(self.slots.get(id)?.len)
    }

    /// Whether a queue holds no bytes
    pub fn is_empty(&self, id: QueueId) -> Result<bool> {
        Ok(self.slots.get(id)?.len == 0)
    }

    /// Reserved capacity of a queue in bytes
    pub fn capacity(&self, id: QueueId) -> Result<usize> {
        Ok(self.slots.get(id)?.capacity)
    }

    /// Slide all active regions toward offset 0, removing inter-region
    /// gaps. Returns `true` if any region moved.
    pub fn compact(&mut self) -> bool {
        compactor::compact(&mut self.buf, &mut self.slots)
    }

    /// Snapshot of current occupancy
    pub fn stats(&self) -> PoolStats {
        let ordered = self.slots.ordered_active();
        let live_bytes: usize = ordered.iter().map(|(_, d)| d.len).sum();
        let reserved_bytes: usize = ordered.iter().map(|(_, d)| d.capacity).sum();

        let mut gap_count = 0;
        let mut prev_end = 0;
        for (_, desc) in &ordered {
            if desc.region_start > prev_end {
                gap_count += 1;
            }
            prev_end = desc.region_end();
        }
        if prev_end < self.config.pool_size {
            gap_count += 1;
        }

        PoolStats {
            active_queues: self.slots.active_count(),
            live_bytes,
            reserved_bytes,
            free_bytes: self.config.pool_size - reserved_bytes,
            gap_count,
        }
    }

    /// Grow a queue's reservation by one increment, relocating when the
    /// current region cannot extend in place.
    fn grow(&mut self, id: QueueId) -> Result<()> {
        let desc = *self.slots.get(id)?;
        let new_capacity = desc.capacity + self.config.growth_increment;
        let offset = self.place_for_growth(id, new_capacity)?;

        // Re-read: compaction during placement may have moved the region
        let desc = *self.slots.get(id)?;
        if offset != desc.region_start {
            // Placement gaps exclude active regions, so source and
            // destination are disjoint here
            self.buf
                .copy_within(desc.region_start..desc.region_start + desc.len, offset);
            self.buf[desc.region_start..desc.region_end()].fill(0);
            debug!(
                queue = %id,
                from = desc.region_start,
                to = offset,
                capacity = new_capacity,
                "relocated queue for growth"
            );
        }

        let slot = self.slots.get_mut(id)?;
        slot.region_start = offset;
        slot.capacity = new_capacity;
        Ok(())
    }

    /// Pick a region for a new queue: first-fit, one compaction retry
    fn place_new(&mut self, size: usize) -> Result<usize> {
        if let Some(offset) = placement::first_fit(&self.regions(), self.config.pool_size, size) {
            return Ok(offset);
        }
        self.compact();
        placement::first_fit(&self.regions(), self.config.pool_size, size)
            .ok_or(Error::OutOfMemory { requested: size })
    }

    /// Pick a region for a growing queue.
    ///
    /// Prefers extending in place to avoid a relocation, then general
    /// first-fit, then one compaction pass followed by the same two
    /// checks. The in-place check is repeated after compaction because
    /// the queue may end up last with enough trailing room that the gap
    /// scan alone would miss.
    fn place_for_growth(&mut self, id: QueueId, new_size: usize) -> Result<usize> {
        let pool_size = self.config.pool_size;

        let start = self.slots.get(id)?.region_start;
        let regions = self.regions();
        if placement::fits_in_place(&regions, pool_size, start, new_size) {
            return Ok(start);
        }
        if let Some(offset) = placement::first_fit(&regions, pool_size, new_size) {
            return Ok(offset);
        }

        self.compact();

        let start = self.slots.get(id)?.region_start;
        let regions = self.regions();
        if placement::fits_in_place(&regions, pool_size, start, new_size) {
            return Ok(start);
        }
        placement::first_fit(&regions, pool_size, new_size)
            .ok_or(Error::OutOfMemory { requested: new_size })
    }

    /// Address-ordered `(start, capacity)` pairs of placed regions
    fn regions(&self) -> Vec<(usize, usize)> {
        self.slots
            .ordered_active()
            .iter()
            .map(|(_, d)| (d.region_start, d.capacity))
            .collect()
    }
}

impl Default for BytePool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl BytePool {
    /// Region offset of an active queue (test introspection)
    pub(crate) fn region_start(&self, id: QueueId) -> Result<usize> {
        Ok(self.slots.get(id)?.region_start)
    }

    /// Panics if any descriptor invariant is violated
    pub(crate) fn assert_invariants(&self) {
        let mut prev_end = 0;
        for (id, desc) in self.slots.ordered_active() {
            assert!(
                desc.len <= desc.capacity,
                "{id}: len {} exceeds capacity {}",
                desc.len,
                desc.capacity
            );
            assert!(
                desc.capacity % self.config.growth_increment == 0,
                "{id}: capacity {} is not a multiple of the increment",
                desc.capacity
            );
            assert!(
                desc.region_start >= prev_end,
                "{id}: region at {} overlaps predecessor ending at {}",
                desc.region_start,
                prev_end
            );
            assert!(desc.region_end() <= self.config.pool_size);
            prev_end = desc.region_end();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut pool = BytePool::new();
        let q = pool.create_queue().unwrap();

        for byte in [10u8, 20, 30] {
            pool.enqueue(q, byte).unwrap();
        }
        assert_eq!(pool.len(q).unwrap(), 3);
        assert_eq!(pool.dequeue(q).unwrap(), 10);
        assert_eq!(pool.dequeue(q).unwrap(), 20);
        assert_eq!(pool.dequeue(q).unwrap(), 30);
        assert!(pool.is_empty(q).unwrap());
    }

    #[test]
    fn test_dequeue_empty_queue() {
        let mut pool = BytePool::new();
        let q = pool.create_queue().unwrap();
        assert!(matches!(pool.dequeue(q), Err(Error::EmptyQueue(_))));
    }

    #[test]
    fn test_operations_on_destroyed_queue() {
        let mut pool = BytePool::new();
        let q = pool.create_queue().unwrap();
        pool.destroy_queue(q, false).unwrap();

        assert!(matches!(pool.enqueue(q, 1), Err(Error::InactiveQueue(_))));
        assert!(matches!(pool.dequeue(q), Err(Error::InactiveQueue(_))));
        assert!(matches!(pool.len(q), Err(Error::InactiveQueue(_))));
        assert!(matches!(
            pool.destroy_queue(q, false),
            Err(Error::InactiveQueue(_))
        ));
    }

    #[test]
    fn test_growth_step_is_one_increment() {
        let mut pool = BytePool::new();
        let q = pool.create_queue().unwrap();
        assert_eq!(pool.capacity(q).unwrap(), 32);

        for i in 0..32 {
            pool.enqueue(q, i).unwrap();
        }
        assert_eq!(pool.capacity(q).unwrap(), 32);

        // 33rd byte crosses the threshold: exactly one increment added
        pool.enqueue(q, 32).unwrap();
        assert_eq!(pool.capacity(q).unwrap(), 64);
        pool.assert_invariants();
    }

    #[test]
    fn test_shrink_one_increment_per_pop() {
        let mut pool = BytePool::new();
        let q = pool.create_queue().unwrap();
        for i in 0..96 {
            pool.enqueue(q, i).unwrap();
        }
        assert_eq!(pool.capacity(q).unwrap(), 96);

        // Draining from 96 to 64 live bytes crosses one threshold only
        for _ in 0..32 {
            pool.dequeue(q).unwrap();
        }
        assert_eq!(pool.capacity(q).unwrap(), 64);

        // Each further threshold crossing shrinks by exactly one increment
        for _ in 0..32 {
            pool.dequeue(q).unwrap();
        }
        assert_eq!(pool.capacity(q).unwrap(), 32);
        pool.assert_invariants();
    }

    #[test]
    fn test_capacity_never_shrinks_below_increment() {
        let mut pool = BytePool::new();
        let q = pool.create_queue().unwrap();
        pool.enqueue(q, 1).unwrap();
        pool.dequeue(q).unwrap();

        // Empty again, but the reservation keeps its one increment
        assert_eq!(pool.capacity(q).unwrap(), 32);
        pool.assert_invariants();
    }

    #[test]
    fn test_growth_relocates_past_neighbour() {
        let mut pool = BytePool::new();
        let a = pool.create_queue().unwrap();
        let b = pool.create_queue().unwrap();
        assert_eq!(pool.region_start(a).unwrap(), 0);
        assert_eq!(pool.region_start(b).unwrap(), 32);

        // Queue a is blocked by b and must move; content survives
        for i in 0..40 {
            pool.enqueue(a, i).unwrap();
        }
        assert_eq!(pool.capacity(a).unwrap(), 64);
        assert_eq!(pool.region_start(a).unwrap(), 64);
        assert_eq!(pool.region_start(b).unwrap(), 32);

        for i in 0..40 {
            assert_eq!(pool.dequeue(a).unwrap(), i);
        }
        pool.assert_invariants();
    }

    #[test]
    fn test_create_out_of_memory_releases_slot() {
        let mut pool = BytePool::with_config(PoolConfig {
            pool_size: 64,
            max_queues: 8,
            growth_increment: 32,
        })
        .unwrap();

        pool.create_queue().unwrap();
        pool.create_queue().unwrap();

        // Slots remain, bytes do not
        let err = pool.create_queue();
        assert!(matches!(err, Err(Error::OutOfMemory { requested: 32 })));
        assert_eq!(pool.stats().active_queues, 2);
        pool.assert_invariants();
    }

    #[test]
    fn test_stats_snapshot() {
        let mut pool = BytePool::new();
        let a = pool.create_queue().unwrap();
        let b = pool.create_queue().unwrap();
        pool.enqueue(a, 1).unwrap();
        pool.enqueue(a, 2).unwrap();
        pool.enqueue(b, 3).unwrap();

        let stats = pool.stats();
        assert_eq!(stats.active_queues, 2);
        assert_eq!(stats.live_bytes, 3);
        assert_eq!(stats.reserved_bytes, 64);
        assert_eq!(stats.free_bytes, 2048 - 64);
        assert_eq!(stats.gap_count, 1);

        // Destroying the first queue opens a second gap
        pool.destroy_queue(a, false).unwrap();
        assert_eq!(pool.stats().gap_count, 2);
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(matches!(
            BytePool::with_config(PoolConfig {
                pool_size: 2048,
                max_queues: 64,
                growth_increment: 0,
            }),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            BytePool::with_config(PoolConfig {
                pool_size: 16,
                max_queues: 64,
                growth_increment: 32,
            }),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            BytePool::with_config(PoolConfig {
                pool_size: 2048,
                max_queues: 0,
                growth_increment: 32,
            }),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_destroy_with_wipe_zeroes_region() {
        let mut pool = BytePool::new();
        let q = pool.create_queue().unwrap();
        for i in 1..=8 {
            pool.enqueue(q, i).unwrap();
        }
        pool.destroy_queue(q, true).unwrap();

        // The freed region is observable through a fresh queue placed over it
        let fresh = pool.create_queue().unwrap();
        assert_eq!(pool.region_start(fresh).unwrap(), 0);
        assert!(pool.is_empty(fresh).unwrap());
    }
}
