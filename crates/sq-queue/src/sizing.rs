//! One-time sizing and delay classification.
//!
//! Given the delay table's bounds and the largest fan-out, decide the grid
//! shape and whether the homogeneous fast path is safe:
//!
//! ```text
//! rows_needed = max_delay + 1
//! homogeneous = rows_needed > grid_rows && min_delay == max_delay
//! ```
//!
//! The fast path is only trusted when sizing itself had to grow the grid to
//! fit the data.  If the grid was already tall enough, the caller configured
//! headroom for delays it expects to change, and a cached "every delay is d"
//! assumption would be unsafe.

use crate::{DelayOrigin, QueueError, QueueResult};

/// Result of classifying a delay table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DelayClass {
    /// Every delay equals `delay` and rows were sized exactly for it.
    Homogeneous { delay: u32 },
    Heterogeneous,
}

impl DelayClass {
    pub fn is_homogeneous(self) -> bool {
        matches!(self, DelayClass::Homogeneous { .. })
    }
}

/// Grid shape and classification decided by [`plan`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SizingPlan {
    pub rows:  usize,
    pub cols:  usize,
    pub class: DelayClass,
    /// `true` if the grid must be reallocated to `rows × cols`.
    pub reallocate: bool,
}

/// Current grid shape plus the placeholder width a fresh queue starts with.
#[derive(Clone, Copy, Debug)]
pub struct GridShape {
    pub rows:        usize,
    pub cols:        usize,
    pub placeholder: usize,
}

/// Decide the sizing for `bounds = (min_delay, max_delay)`.
///
/// An empty delay table (`None`) needs a single row and is heterogeneous.
/// Rows never shrink; a width equal to the placeholder is replaced by the
/// largest fan-out.
pub fn plan(
    grid:        GridShape,
    bounds:      Option<(i32, i32)>,
    max_fan_out: usize,
) -> QueueResult<SizingPlan> {
    let (min, max) = match bounds {
        Some((min, _)) if min < 0 => {
            return Err(QueueError::InvalidDelay { origin: DelayOrigin::Table, delay: min });
        }
        Some((min, max)) => (min as u32, max as u32),
        None => (0, 0),
    };
    let rows_needed = max as usize + 1;

    let class = if rows_needed > grid.rows && min == max {
        DelayClass::Homogeneous { delay: max }
    } else {
        DelayClass::Heterogeneous
    };

    let cols_wanted = if grid.cols == grid.placeholder {
        grid.placeholder.max(max_fan_out)
    } else {
        grid.cols
    };

    let reallocate = rows_needed > grid.rows || cols_wanted > grid.cols;
    Ok(SizingPlan {
        rows: rows_needed.max(grid.rows),
        cols: cols_wanted.max(grid.cols),
        class,
        reallocate,
    })
}
