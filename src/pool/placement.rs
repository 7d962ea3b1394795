//! First-fit region placement
//!
//! Pure gap search over address-ordered regions. The compact-and-retry
//! policy lives in the pool layer; these functions never mutate anything.

/// Find the lowest offset with `size` contiguous free bytes.
///
/// `regions` are `(start, capacity)` pairs, sorted by start and pairwise
/// non-overlapping. Scans the leading gap, every inter-region gap, then
/// the trailing gap up to `pool_size`.
pub(crate) fn first_fit(
    regions: &[(usize, usize)],
    pool_size: usize,
    size: usize,
) -> Option<usize> {
    let Some(&(first_start, first_capacity)) = regions.first() else {
        return (size <= pool_size).then_some(0);
    };

    // Gap before the first region
    if size <= first_start {
        return Some(0);
    }

    // Gaps between consecutive regions
    let mut prev_end = first_start + first_capacity;
    for &(start, capacity) in &regions[1..] {
        if start - prev_end >= size {
            return Some(prev_end);
        }
        prev_end = start + capacity;
    }

    // Gap after the last region
    (prev_end + size <= pool_size).then_some(prev_end)
}

/// Whether a region starting at `start` can hold `new_size` bytes without
/// moving.
///
/// The footprint may extend into the gap up to the next region's start,
/// or to the end of the pool when the region is last. The region's own
/// current capacity counts toward its footprint, so this can succeed
/// where a plain gap scan would not.
pub(crate) fn fits_in_place(
    regions: &[(usize, usize)],
    pool_size: usize,
    start: usize,
    new_size: usize,
) -> bool {
    let limit = regions
        .iter()
        .map(|&(region_start, _)| region_start)
        .filter(|&region_start| region_start > start)
        .min()
        .unwrap_or(pool_size);
    start + new_size <= limit
}
