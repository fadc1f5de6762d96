//! `EventBuffer`: the circular bucket grid behind a spike queue.
//!
//! # Layout
//!
//! A `rows × cols` grid of `SynapseId`s flattened row-major into one `Vec`.
//! Each row is a stack of events due at one step; `counts[row]` says how
//! many leading slots of that row are live.  Rows are circular: the row for
//! an event `delay` steps ahead is
//!
//! ```text
//! row = (current + delay) % rows
//! ```
//!
//! Columns grow on demand (next power of two, full copy into a new arena).
//! Rows only change in [`EventBuffer::reallocate`], which runs at sizing time
//! before any event has been written.
//!
//! # Invariants
//!
//! - `counts.len() == rows` and `slots.len() == rows * cols`.
//! - `counts[row] <= cols` for every row.
//! - `current < rows`.

use sq_core::SynapseId;
use tracing::debug;

pub struct EventBuffer {
    slots:   Vec<SynapseId>,
    counts:  Vec<usize>,
    rows:    usize,
    cols:    usize,
    current: usize,
    resizes: u64,
}

impl EventBuffer {
    /// Allocate an empty `rows × cols` grid.  Both dimensions are clamped to
    /// at least 1.
    pub fn new(rows: usize, cols: usize) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        Self {
            slots:   vec![SynapseId::default(); rows * cols],
            counts:  vec![0; rows],
            rows,
            cols,
            current: 0,
            resizes: 0,
        }
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    /// Number of buckets (representable delays are `0..rows`).
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Current per-bucket slot capacity.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Row index of "now".
    #[inline]
    pub fn current(&self) -> usize {
        self.current
    }

    /// Number of reactive column growths since construction.
    pub fn resize_count(&self) -> u64 {
        self.resizes
    }

    #[inline]
    pub fn count(&self, row: usize) -> usize {
        self.counts[row]
    }

    /// Total live events across all rows.
    pub fn len(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }

    /// Destination row for an event `delay` steps ahead.  The caller must
    /// ensure `delay < rows`.
    #[inline]
    pub fn row_for(&self, delay: u32) -> usize {
        (self.current + delay as usize) % self.rows
    }

    // ── Reading ───────────────────────────────────────────────────────────

    /// Live events of `row`, in write order.
    #[inline]
    pub fn row(&self, row: usize) -> &[SynapseId] {
        let start = row * self.cols;
        &self.slots[start..start + self.counts[row]]
    }

    /// Events due now.
    #[inline]
    pub fn peek(&self) -> &[SynapseId] {
        self.row(self.current)
    }

    /// Every bucket in delivery order, starting with the current one.
    ///
    /// Yields `(steps_ahead, events)`; empty buckets are included.
    pub fn pending(&self) -> impl Iterator<Item = (usize, &[SynapseId])> + '_ {
        (0..self.rows).map(move |ahead| (ahead, self.row((self.current + ahead) % self.rows)))
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    /// Drop the current bucket and move the cursor one step forward.
    #[inline]
    pub fn advance(&mut self) {
        self.counts[self.current] = 0;
        self.current = (self.current + 1) % self.rows;
    }

    /// Grow every row to hold at least `required` slots.
    ///
    /// The new width is `required.next_power_of_two()`.  Existing columns are
    /// copied unchanged and fill counts are untouched; a request that does
    /// not exceed the current width is a no-op.
    pub fn resize(&mut self, required: usize) {
        let new_cols = required.next_power_of_two();
        if new_cols <= self.cols {
            return;
        }
        let old_cols = self.cols;
        let mut grown = vec![SynapseId::default(); self.rows * new_cols];
        for (dst, src) in grown
            .chunks_exact_mut(new_cols)
            .zip(self.slots.chunks_exact(old_cols))
        {
            dst[..old_cols].copy_from_slice(src);
        }
        self.slots = grown;
        self.cols = new_cols;
        self.resizes += 1;
        debug!(rows = self.rows, old_cols, new_cols, "spike queue grew");
    }

    /// Replace the grid with an empty `rows × cols` one, discarding every
    /// pending event.  Only valid before the queue starts operating.
    ///
    /// The cursor is kept when it is still in range.
    pub fn reallocate(&mut self, rows: usize, cols: usize) {
        let rows = rows.max(1);
        let cols = cols.max(1);
        self.slots = vec![SynapseId::default(); rows * cols];
        self.counts = vec![0; rows];
        self.rows = rows;
        self.cols = cols;
        if self.current >= rows {
            self.current = 0;
        }
    }

    // ── Raw access for the insertion engine ───────────────────────────────

    #[inline]
    pub(crate) fn set_count(&mut self, row: usize, count: usize) {
        debug_assert!(count <= self.cols);
        self.counts[row] = count;
    }

    #[inline]
    pub(crate) fn write(&mut self, row: usize, slot: usize, target: SynapseId) {
        debug_assert!(slot < self.cols);
        self.slots[row * self.cols + slot] = target;
    }

    /// Contiguous copy of `targets` into `row` starting at `slot`.
    #[inline]
    pub(crate) fn write_run(&mut self, row: usize, slot: usize, targets: &[SynapseId]) {
        let start = row * self.cols + slot;
        self.slots[start..start + targets.len()].copy_from_slice(targets);
    }
}
