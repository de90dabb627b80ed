//! Floor searches over candidate pools.
//!
//! A floor search returns the index of the smallest value that is `>=`
//! the target within a half-open range. When nothing reaches the target
//! it saturates to the largest value instead of failing, so callers on a
//! non-empty range always get the closest available candidate.
//!
//! Both variants resolve duplicates to the leftmost index.

use std::borrow::Borrow;
use std::ops::Range;

use spotgrid_core::Instance;

use crate::aggregates::Metric;
use crate::error::{EngineError, EngineResult};
use crate::sort::sort_range;

fn check_range(len: usize, range: &Range<usize>) -> EngineResult<()> {
    if range.end > len {
        return Err(EngineError::InvalidRange {
            start: range.start,
            end: range.end,
            len,
        });
    }
    if range.end <= range.start {
        return Err(EngineError::EmptyRange {
            start: range.start,
            end: range.end,
        });
    }
    Ok(())
}

/// Linear floor search. O(n), no ordering precondition.
///
/// The running best is replaced only by a strictly better candidate:
/// a larger value while the best is still short of `target`, or a
/// smaller value that still reaches it.
pub fn find_floor_linear<T: Borrow<Instance>>(
    pool: &[T],
    metric: Metric,
    target: f64,
    range: Range<usize>,
) -> EngineResult<usize> {
    check_range(pool.len(), &range)?;

    let value = |i: usize| metric.of(pool[i].borrow());
    let mut best = range.start;
    for i in range.start + 1..range.end {
        let current = value(best);
        let candidate = value(i);
        let climbs = current < target && candidate > current;
        let tightens = candidate >= target && candidate < current;
        if climbs || tightens {
            best = i;
        }
    }
    Ok(best)
}

/// Binary floor search. O(log n).
///
/// `pool[range]` must be sorted ascending by `metric`. An unsorted range
/// is detected when its endpoints are inverted or its midpoint falls
/// outside them, and reported as [`EngineError::NotSorted`].
pub fn find_floor_binary<T: Borrow<Instance>>(
    pool: &[T],
    metric: Metric,
    target: f64,
    range: Range<usize>,
) -> EngineResult<usize> {
    check_range(pool.len(), &range)?;

    let slice = &pool[range.clone()];
    let value = |i: usize| metric.of(slice[i].borrow());
    let first = value(0);
    let last = value(slice.len() - 1);
    let mid = value(slice.len() / 2);
    if first > last || mid < first || mid > last {
        return Err(EngineError::NotSorted {
            metric,
            start: range.start,
            end: range.end,
        });
    }

    let mut idx = slice.partition_point(|i| metric.of(i.borrow()) < target);
    if idx == slice.len() {
        // Nothing reaches the target: saturate to the first maximum.
        idx = slice.partition_point(|i| metric.of(i.borrow()) < last);
    }
    Ok(range.start + idx)
}

/// Sort `pool[range]` ascending by `metric`, then binary-search it.
///
/// The reordering of `pool[range]` is part of the contract: callers rely
/// on the range being sorted afterwards.
pub fn sort_then_find<T: Borrow<Instance>>(
    pool: &mut [T],
    metric: Metric,
    target: f64,
    range: Range<usize>,
) -> EngineResult<usize> {
    check_range(pool.len(), &range)?;
    sort_range(pool, range.clone(), &metric.into())?;
    find_floor_binary(pool, metric, target, range)
}
