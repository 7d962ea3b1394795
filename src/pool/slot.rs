//! Queue handles and slot descriptors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier for a queue slot.
///
/// A `QueueId` is an index into the slot table, not an address: regions
/// move during growth and compaction, the slot index does not. Only
/// destruction invalidates a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QueueId(pub(crate) u16);

impl QueueId {
    /// Slot table index for this handle
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for QueueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Queue({})", self.0)
    }
}

/// Per-slot bookkeeping for one queue.
///
/// An inactive descriptor holds all-zero fields. An active descriptor
/// that owns a region keeps `capacity` a positive multiple of the growth
/// increment and `len <= capacity` at all times.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Descriptor {
    /// Offset of the region within the pool buffer
    pub region_start: usize,
    /// Bytes reserved for this queue
    pub capacity: usize,
    /// Live bytes currently stored
    pub len: usize,
    /// Whether the slot is in use
    pub active: bool,
}

impl Descriptor {
    /// One past the last byte reserved by this region
    pub fn region_end(&self) -> usize {
        self.region_start + self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_id_index() {
        let id = QueueId(5);
        assert_eq!(id.index(), 5);
        assert_eq!(id.to_string(), "Queue(5)");
    }

    #[test]
    fn test_descriptor_region_end() {
        let desc = Descriptor {
            region_start: 64,
            capacity: 32,
            len: 10,
            active: true,
        };
        assert_eq!(desc.region_end(), 96);
    }

    #[test]
    fn test_inactive_descriptor_is_zeroed() {
        let desc = Descriptor::default();
        assert!(!desc.active);
        assert_eq!(desc.region_start, 0);
        assert_eq!(desc.capacity, 0);
        assert_eq!(desc.len, 0);
    }
}
