//! Read-only collaborator contracts: who a source projects to, and how long
//! each synapse delays its spikes.
//!
//! The queue never owns these tables; they are passed into `compress` and
//! `propagate` by the driver.  Plain `Vec`s implement both traits so tests
//! and small programs need no extra wrapper.

use sq_core::{SourceId, SynapseId};

/// Maps a source index to its ordered list of target synapses.
pub trait SynapseMap {
    /// Number of valid source indices (`0..source_count()`).
    fn source_count(&self) -> usize;

    /// Target synapses of `source`.
    ///
    /// # Panics
    /// May panic if `source.index() >= self.source_count()`.  The queue
    /// checks bounds before calling.
    fn targets_of(&self, source: SourceId) -> &[SynapseId];

    /// Largest number of targets owned by a single source.
    fn max_fan_out(&self) -> usize {
        (0..self.source_count())
            .map(|i| self.targets_of(SourceId(i as u32)).len())
            .max()
            .unwrap_or(0)
    }
}

/// Maps a synapse to its delay in steps.
///
/// Delays are signed so that tables built from user input can carry bad
/// values; the queue rejects negatives with `QueueError::InvalidDelay`.
pub trait DelayMap {
    fn delay_of(&self, synapse: SynapseId) -> i32;

    /// `(min, max)` over every delay in the table, or `None` if empty.
    fn delay_bounds(&self) -> Option<(i32, i32)>;
}

impl SynapseMap for [Vec<SynapseId>] {
    fn source_count(&self) -> usize {
        self.len()
    }

    #[inline]
    fn targets_of(&self, source: SourceId) -> &[SynapseId] {
        &self[source.index()]
    }
}

impl SynapseMap for Vec<Vec<SynapseId>> {
    fn source_count(&self) -> usize {
        self.len()
    }

    #[inline]
    fn targets_of(&self, source: SourceId) -> &[SynapseId] {
        &self[source.index()]
    }
}

impl DelayMap for [i32] {
    #[inline]
    fn delay_of(&self, synapse: SynapseId) -> i32 {
        self[synapse.index()]
    }

    fn delay_bounds(&self) -> Option<(i32, i32)> {
        bounds(self.iter().copied())
    }
}

impl DelayMap for Vec<i32> {
    #[inline]
    fn delay_of(&self, synapse: SynapseId) -> i32 {
        self[synapse.index()]
    }

    fn delay_bounds(&self) -> Option<(i32, i32)> {
        bounds(self.iter().copied())
    }
}

/// Single-pass `(min, max)` of an iterator.
pub fn bounds(values: impl Iterator<Item = i32>) -> Option<(i32, i32)> {
    values.fold(None, |acc, d| match acc {
        None             => Some((d, d)),
        Some((lo, hi))   => Some((lo.min(d), hi.max(d))),
    })
}
