//! Offset resolution: rank each event among the events of the same batch
//! that share its delay.
//!
//! # Why offsets
//!
//! A batch may hold many events bound for the same bucket.  Writing them all
//! at `count[row]` would make them overwrite each other, so each event gets a
//! zero-based rank within its delay group and is written at
//! `count[row] + rank`.  Ranks follow original order inside a group:
//!
//! ```text
//! delays  [7, 5, 7, 3, 7, 5]
//! offsets [0, 0, 1, 0, 2, 1]
//! ```
//!
//! # Algorithm
//!
//! A single left-to-right walk with one counter per distinct delay produces
//! exactly the ranks a stable sort by delay would: the k-th occurrence of a
//! value is handed `k`.  Counters live in a dense `Vec` when the delay domain
//! is small relative to the batch (the common case: delays are bounded by the
//! queue's bucket count), and in an `FxHashMap` otherwise.  Both are O(N + D)
//! or O(N); [`offsets_sorted`] is the O(N log N) stable-sort reference.

use rustc_hash::FxHashMap;

use crate::{DelayOrigin, QueueError, QueueResult};

/// Dense counters are used whenever `max_delay < DENSE_FLOOR` or the domain
/// is at most `DENSE_FACTOR` times the batch length.
const DENSE_FLOOR: usize = 4_096;
const DENSE_FACTOR: usize = 4;

/// Reusable offset calculator.  Holds counter scratch space between calls so
/// the per-step path does not allocate; results depend only on the input.
#[derive(Default)]
pub struct OffsetResolver {
    dense:  Vec<u32>,
    sparse: FxHashMap<u32, u32>,
}

impl OffsetResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the offsets for `delays` into `out` (cleared first).
    pub fn resolve_into(&mut self, delays: &[u32], out: &mut Vec<u32>) {
        out.clear();
        out.reserve(delays.len());
        let Some(&max) = delays.iter().max() else {
            return;
        };
        let domain = max as usize + 1;

        if domain <= DENSE_FLOOR || domain <= delays.len().saturating_mul(DENSE_FACTOR) {
            self.dense.clear();
            self.dense.resize(domain, 0);
            for &d in delays {
                let counter = &mut self.dense[d as usize];
                out.push(*counter);
                *counter += 1;
            }
        } else {
            self.sparse.clear();
            for &d in delays {
                let counter = self.sparse.entry(d).or_insert(0);
                out.push(*counter);
                *counter += 1;
            }
        }
    }

    /// Convenience wrapper returning a fresh `Vec`.
    pub fn resolve(&mut self, delays: &[u32]) -> Vec<u32> {
        let mut out = Vec::with_capacity(delays.len());
        self.resolve_into(delays, &mut out);
        out
    }
}

/// Offsets for a signed delay sequence.
///
/// Fails with [`QueueError::InvalidDelay`] at the first negative value.
pub fn offsets(delays: &[i32]) -> QueueResult<Vec<u32>> {
    let checked = checked_delays(delays)?;
    Ok(OffsetResolver::new().resolve(&checked))
}

/// Validate and narrow a signed delay slice.
pub fn checked_delays(delays: &[i32]) -> QueueResult<Vec<u32>> {
    delays
        .iter()
        .enumerate()
        .map(|(i, &d)| {
            u32::try_from(d).map_err(|_| QueueError::InvalidDelay {
                origin: DelayOrigin::Position(i),
                delay:  d,
            })
        })
        .collect()
}

/// Reference implementation via stable sort of indices by delay.
///
/// Walks the sorted order, restarting the rank at 0 whenever the delay
/// changes, and scatters the ranks back to the original positions.
pub fn offsets_sorted(delays: &[u32]) -> Vec<u32> {
    let mut order: Vec<usize> = (0..delays.len()).collect();
    // `sort_by_key` is stable: equal delays keep their original order.
    order.sort_by_key(|&i| delays[i]);

    let mut out = vec![0u32; delays.len()];
    let mut rank = 0u32;
    for (k, &i) in order.iter().enumerate() {
        rank = if k > 0 && delays[order[k - 1]] == delays[i] { rank + 1 } else { 0 };
        out[i] = rank;
    }
    out
}

/// `true` if `offsets` ranks every delay group of `delays` as a permutation
/// of `0..k`, where `k` is the size of the group.  Any such ranking writes
/// each event to its own slot and leaves no gaps below the new row count.
pub fn is_ranking(delays: &[u32], offsets: &[u32]) -> bool {
    if delays.len() != offsets.len() {
        return false;
    }
    let mut pairs: Vec<(u32, u32)> = delays.iter().copied().zip(offsets.iter().copied()).collect();
    pairs.sort_unstable();

    let mut group = None;
    let mut next = 0u32;
    for (d, off) in pairs {
        if group != Some(d) {
            group = Some(d);
            next = 0;
        }
        if off != next {
            return false;
        }
        next += 1;
    }
    true
}
