//! In-place pool compaction
//!
//! Slides every active region toward offset 0, eliminating inter-region
//! gaps. Address order is preserved: compaction never reorders queues,
//! only removes the slack between them.

use super::table::SlotTable;
use tracing::debug;

/// Compact the pool buffer. Returns `true` if any region moved.
///
/// Walks active regions in address order, moving the first to offset 0
/// and each subsequent region to its predecessor's end. Moves are always
/// toward lower offsets, so `copy_within` (memmove semantics) is safe
/// even when a region shifts left by less than its own length. Vacated
/// source bytes are zeroed so freed gaps never leak stale queue content.
pub(crate) fn compact(buf: &mut [u8], table: &mut SlotTable) -> bool {
    let mut moved = false;
    let mut target = 0usize;

    for (id, desc) in table.ordered_active() {
        let old_start = desc.region_start;
        if old_start != target {
            buf.copy_within(old_start..old_start + desc.capacity, target);

            // Zero the tail of the source the copy did not overwrite
            let stale_from = old_start.max(target + desc.capacity);
            buf[stale_from..old_start + desc.capacity].fill(0);

            table.set_region_start(id, target);
            debug!(
                queue = %id,
                from = old_start,
                to = target,
                capacity = desc.capacity,
                "relocated region"
            );
            moved = true;
        }
        target += desc.capacity;
    }

    moved
}
