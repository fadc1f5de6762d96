//! Synaptic projection (source population → synapses) and its builder.
//!
//! # Data layout
//!
//! Synapses are stored in **Compressed Sparse Row (CSR)** order, grouped by
//! source.  The synapses of source `s` are
//!
//! ```text
//! synapses[ source_start[s] .. source_start[s+1] ]
//! ```
//!
//! and `SynapseId(i)` is simply position `i`, so per-synapse arrays
//! (`post`, `delays`) are indexed directly by the id the queue delivers.

use std::ops::RangeInclusive;

use sq_core::{SimRng, SourceId, StepClock, SynapseId};
use sq_queue::{DelayMap, SynapseMap};

use crate::SimResult;

// ── Projection ────────────────────────────────────────────────────────────────

/// Directed synapses from one source population, in CSR form.
///
/// Do not construct directly; use [`ProjectionBuilder`].
pub struct Projection {
    /// CSR row pointer.  Length = `source_count + 1`.
    pub source_start: Vec<u32>,

    /// `synapses[i] == SynapseId(i)`; kept as a slice so `targets_of` can
    /// hand out contiguous ranges without allocation.
    pub synapses: Vec<SynapseId>,

    /// Postsynaptic neuron of each synapse.
    pub post: Vec<u32>,

    /// Delay of each synapse, in steps.
    pub delays: Vec<i32>,

    max_fan_out: usize,
}

impl Projection {
    pub fn source_count(&self) -> usize {
        self.source_start.len() - 1
    }

    pub fn synapse_count(&self) -> usize {
        self.synapses.len()
    }

    #[inline]
    pub fn post_of(&self, synapse: SynapseId) -> u32 {
        self.post[synapse.index()]
    }

    /// Change one synapse's delay.  Queues sized against this projection
    /// must be re-sized (and offsets recomputed) before the next step.
    pub fn set_delay(&mut self, synapse: SynapseId, delay_steps: i32) {
        self.delays[synapse.index()] = delay_steps;
    }
}

impl SynapseMap for Projection {
    fn source_count(&self) -> usize {
        Projection::source_count(self)
    }

    #[inline]
    fn targets_of(&self, source: SourceId) -> &[SynapseId] {
        let start = self.source_start[source.index()] as usize;
        let end   = self.source_start[source.index() + 1] as usize;
        &self.synapses[start..end]
    }

    fn max_fan_out(&self) -> usize {
        self.max_fan_out
    }
}

impl DelayMap for Projection {
    #[inline]
    fn delay_of(&self, synapse: SynapseId) -> i32 {
        self.delays[synapse.index()]
    }

    fn delay_bounds(&self) -> Option<(i32, i32)> {
        self.delays.delay_bounds()
    }
}

// ── ProjectionBuilder ─────────────────────────────────────────────────────────

/// Construct a [`Projection`] incrementally, then call [`build`](Self::build).
///
/// Synapses may be added in any source order; `build()` groups them by
/// source while keeping each source's synapses in insertion order.
///
/// # Example
///
/// ```
/// use sq_core::SourceId;
/// use sq_sim::ProjectionBuilder;
///
/// let mut b = ProjectionBuilder::new(2);
/// b.connect(SourceId(1), 0, 3);
/// b.connect(SourceId(0), 4, 1);
/// let p = b.build();
/// assert_eq!(p.source_count(), 2);
/// assert_eq!(p.delays, vec![1, 3]);
/// ```
pub struct ProjectionBuilder {
    source_count: usize,
    raw:          Vec<RawSynapse>,
}

struct RawSynapse {
    source: SourceId,
    post:   u32,
    delay:  i32,
}

impl ProjectionBuilder {
    /// Start a projection from `source_count` sources.  Connecting a larger
    /// source index grows the population.
    pub fn new(source_count: usize) -> Self {
        Self { source_count, raw: Vec::new() }
    }

    /// Add a synapse from `source` to postsynaptic neuron `post`.
    pub fn connect(&mut self, source: SourceId, post: u32, delay_steps: i32) {
        self.source_count = self.source_count.max(source.index() + 1);
        self.raw.push(RawSynapse { source, post, delay: delay_steps });
    }

    /// Add a synapse whose delay is given in seconds.
    pub fn connect_secs(
        &mut self,
        source:     SourceId,
        post:       u32,
        delay_secs: f64,
        clock:      &StepClock,
    ) -> SimResult<()> {
        let steps = clock.steps_for_secs(delay_secs)?;
        self.connect(source, post, steps);
        Ok(())
    }

    /// Random projection: every source gets `fan_out` synapses onto
    /// uniformly chosen targets in `0..target_count`, with delays drawn
    /// uniformly from `delays`.
    pub fn random(
        source_count: usize,
        target_count: u32,
        fan_out:      usize,
        delays:       RangeInclusive<i32>,
        rng:          &mut SimRng,
    ) -> Self {
        let mut b = Self::new(source_count);
        b.raw.reserve(source_count * fan_out);
        for s in 0..source_count as u32 {
            for _ in 0..fan_out {
                let post = rng.pick(target_count);
                let delay = rng.delay_in(&delays);
                b.connect(SourceId(s), post, delay);
            }
        }
        b
    }

    pub fn synapse_count(&self) -> usize {
        self.raw.len()
    }

    /// Consume the builder and produce a [`Projection`].
    pub fn build(self) -> Projection {
        let source_count = self.source_count;

        // Stable sort keeps per-source insertion order.
        let mut raw = self.raw;
        raw.sort_by_key(|s| s.source.0);

        let synapses: Vec<SynapseId> = (0..raw.len() as u32).map(SynapseId).collect();
        let post:     Vec<u32>       = raw.iter().map(|s| s.post).collect();
        let delays:   Vec<i32>       = raw.iter().map(|s| s.delay).collect();

        let mut source_start = vec![0u32; source_count + 1];
        for s in &raw {
            source_start[s.source.index() + 1] += 1;
        }
        let mut max_fan_out = 0;
        for i in 1..=source_count {
            max_fan_out = max_fan_out.max(source_start[i] as usize);
            source_start[i] += source_start[i - 1];
        }
        debug_assert_eq!(source_start[source_count] as usize, raw.len());

        Projection { source_start, synapses, post, delays, max_fan_out }
    }
}
