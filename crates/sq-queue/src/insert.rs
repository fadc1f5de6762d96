//! Insertion strategies that write event batches into an [`EventBuffer`].
//!
//! All strategies target row `(current + delay) % rows` and grow the buffer
//! before writing whenever the projected fill of a touched row, plus one,
//! reaches the current width.
//!
//! # The count-update trick
//!
//! Offsets are zero-based ranks within a delay group, so within one batch
//! the events bound for a row carry offsets `0..k`.  Every event therefore
//! knows the row's new fill directly as `old + offset + 1`; the largest of
//! these is `old + k`.  No separate per-row histogram is needed.

use sq_core::SynapseId;

use crate::offsets::is_ranking;
use crate::{EventBuffer, OffsetResolver, QueueError, QueueResult};

/// Which write path a propagation call takes.  Chosen once per call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertStrategy {
    /// Heterogeneous delays; offsets computed over the whole step's batch.
    OnTheFly,
    /// Heterogeneous delays; offsets read from the per-source table, one
    /// sub-batch per active source.
    Precomputed,
    /// Every delay equals `delay`; events are appended in one run.
    Homogeneous { delay: u32 },
}

/// Scratch state for the write paths.  Kept between calls so the per-step
/// path does not allocate once warmed up.
#[derive(Default)]
pub struct InsertionEngine {
    resolver: OffsetResolver,
    offsets:  Vec<u32>,
    rows:     Vec<usize>,
    old:      Vec<usize>,
}

impl InsertionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Vectorised insert with offsets computed from `delays`.
    pub fn insert(
        &mut self,
        buffer:  &mut EventBuffer,
        delays:  &[u32],
        targets: &[SynapseId],
    ) -> QueueResult<()> {
        check_len(delays.len(), targets.len(), "delay")?;
        let mut offsets = std::mem::take(&mut self.offsets);
        self.resolver.resolve_into(delays, &mut offsets);
        let result = self.insert_with_offsets(buffer, delays, targets, &offsets);
        self.offsets = offsets;
        result
    }

    /// Vectorised insert with caller-supplied offsets.
    ///
    /// `offsets` must rank each delay group of `delays` as `0..k`, as
    /// [`OffsetResolver`] does.  Anything else is a caller bug with two
    /// failure modes: duplicate ranks overwrite events, and gapped ranks
    /// raise the row count past unwritten slots, which `peek` then returns
    /// as phantom events.  Debug builds assert the ranking.
    pub fn insert_with_offsets(
        &mut self,
        buffer:  &mut EventBuffer,
        delays:  &[u32],
        targets: &[SynapseId],
        offsets: &[u32],
    ) -> QueueResult<()> {
        check_len(delays.len(), targets.len(), "delay")?;
        check_len(offsets.len(), targets.len(), "offset")?;
        debug_assert!(
            is_ranking(delays, offsets),
            "offsets must rank each delay group as 0..k"
        );
        if targets.is_empty() {
            return Ok(());
        }

        // Destination rows and pre-insert counts, plus the largest projected
        // fill across touched rows.
        self.rows.clear();
        self.old.clear();
        let mut projected_max = 0usize;
        for (&d, &off) in delays.iter().zip(offsets) {
            check_range(d, buffer.rows())?;
            let row = buffer.row_for(d);
            let old = buffer.count(row);
            projected_max = projected_max.max(old + off as usize + 1);
            self.rows.push(row);
            self.old.push(old);
        }

        let needed = projected_max + 1;
        if needed >= buffer.cols() {
            buffer.resize(needed + 1);
        }

        for i in 0..targets.len() {
            buffer.write(self.rows[i], self.old[i] + offsets[i] as usize, targets[i]);
        }
        for i in 0..targets.len() {
            let row = self.rows[i];
            let projected = self.old[i] + offsets[i] as usize + 1;
            if projected > buffer.count(row) {
                buffer.set_count(row, projected);
            }
        }
        Ok(())
    }

    /// Append `targets`, all due `delay` steps ahead, as one contiguous run.
    pub fn insert_homogeneous(
        &mut self,
        buffer:  &mut EventBuffer,
        delay:   u32,
        targets: &[SynapseId],
    ) -> QueueResult<()> {
        if targets.is_empty() {
            return Ok(());
        }
        check_range(delay, buffer.rows())?;
        let row = buffer.row_for(delay);
        let old = buffer.count(row);

        let needed = old + targets.len() + 1;
        if needed >= buffer.cols() {
            buffer.resize(needed + 1);
        }

        buffer.write_run(row, old, targets);
        buffer.set_count(row, old + targets.len());
        Ok(())
    }
}

#[inline]
fn check_len(got: usize, expected: usize, what: &'static str) -> QueueResult<()> {
    if got != expected {
        return Err(QueueError::InvalidBatch { expected, got, what });
    }
    Ok(())
}

#[inline]
fn check_range(delay: u32, rows: usize) -> QueueResult<()> {
    if delay as usize >= rows {
        return Err(QueueError::DelayOutOfRange { delay, rows });
    }
    Ok(())
}
