//! Compacting byte-queue pool
//!
//! A fixed-size backing buffer hosts up to `max_queues` independently
//! growable FIFO byte queues. Regions are placed first-fit in address
//! order; when no gap is large enough the pool is compacted in place,
//! sliding every active region toward offset 0 without reordering.
//!
//! # Architecture
//!
//! ```text
//! BytePool
//!   ├─→ buffer:    [q0 data][q1 data][gap....][q2 data][free......]
//!   ├─→ SlotTable  → Descriptor { region_start, capacity, len, active }
//!   ├─→ placement: first-fit over address-ordered regions
//!   └─→ compact:   [q0 data][q1 data][q2 data][free................]
//! ```
//!
//! Capacity moves in whole increments of `growth_increment`. Queue
//! handles are stable slot indices that survive relocation; only
//! destruction invalidates them.

pub mod compact;
pub mod placement;
pub mod pool;
pub mod slot;
pub mod table;

pub use pool::{BytePool, PoolConfig, PoolStats};
pub use slot::{Descriptor, QueueId};
pub use table::SlotTable;
