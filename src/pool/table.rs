//! Fixed-size descriptor table

use super::slot::{Descriptor, QueueId};
use crate::error::{Error, Result};

/// Fixed array of queue descriptors.
///
/// The table is the single authoritative record of which slot owns which
/// region. Address-ordered views are recomputed on demand: regions move
/// between calls, so a cached ordering would go stale.
#[derive(Debug)]
pub struct SlotTable {
    slots: Vec<Descriptor>,
}

impl SlotTable {
    /// Create a table with `max_queues` inactive slots
    pub fn new(max_queues: usize) -> Self {
        Self {
            slots: vec![Descriptor::default(); max_queues],
        }
    }

    /// Number of descriptor slots
    pub fn max_queues(&self) -> usize {
        self.slots.len()
    }

    /// Number of currently active queues
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|d| d.active).count()
    }

    /// Claim the first inactive slot, activated with zero length and
    /// capacity. The caller assigns a region before the slot is visible
    /// to address-ordered scans.
    pub fn allocate(&mut self) -> Result<QueueId> {
        let index = self
            .slots
            .iter()
            .position(|d| !d.active)
            .ok_or(Error::CapacityExhausted(self.slots.len()))?;
        self.slots[index] = Descriptor {
            active: true,
            ..Descriptor::default()
        };
        Ok(QueueId(index as u16))
    }

    /// Release a slot. Region bytes are the caller's responsibility; the
    /// table only resets the descriptor.
    pub fn free(&mut self, id: QueueId) {
        self.slots[id.index()] = Descriptor::default();
    }

    /// Descriptor for an active queue
    pub fn get(&self, id: QueueId) -> Result<&Descriptor> {
        self.slots
            .get(id.index())
            .filter(|d| d.active)
            .ok_or(Error::InactiveQueue(id))
    }

    /// Mutable descriptor for an active queue
    pub fn get_mut(&mut self, id: QueueId) -> Result<&mut Descriptor> {
        self.slots
            .get_mut(id.index())
            .filter(|d| d.active)
            .ok_or(Error::InactiveQueue(id))
    }

    /// Update the region offset of a slot known to be active
    pub(crate) fn set_region_start(&mut self, id: QueueId, region_start: usize) {
        self.slots[id.index()].region_start = region_start;
    }

    /// Active descriptors that own a region, ordered by ascending
    /// `region_start`. Recomputed on every call. Slots activated but not
    /// yet placed (capacity 0) are excluded.
    pub fn ordered_active(&self) -> Vec<(QueueId, Descriptor)> {
        let mut active: Vec<_> = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, d)| d.active && d.capacity > 0)
            .map(|(index, d)| (QueueId(index as u16), *d))
            .collect();
        active.sort_by_key(|(_, d)| d.region_start);
        active
    }
}
