//! `SpikeQueue`: per-population delayed spike delivery.
//!
//! One queue serves one presynaptic population.  Each step the driver calls
//! [`SpikeQueue::propagate`] with the sources that fired, reads the events
//! due now with [`SpikeQueue::peek`], then moves on with
//! [`SpikeQueue::advance`].  An event inserted with delay `d` at step `s`
//! is returned by `peek` at step `s + d` and at no other step.
//!
//! [`SpikeQueue::compress`] must run once before the first propagation (and
//! again whenever delays change).  `propagate` runs it automatically on
//! first use.

use sq_core::{QueueConfig, SourceId, SynapseId};
use tracing::{debug, trace};

use crate::insert::{InsertStrategy, InsertionEngine};
use crate::sizing::{plan, DelayClass, GridShape};
use crate::{
    DelayMap, DelayOrigin, EventBuffer, OffsetResolver, QueueError, QueueResult, SynapseMap,
};

// ── OffsetTable ───────────────────────────────────────────────────────────────

/// Cached offsets for every source, stored CSR-style: the offsets of
/// source `s` are `offsets[start[s] .. start[s + 1]]`.
pub struct OffsetTable {
    start:   Vec<usize>,
    offsets: Vec<u32>,
}

impl OffsetTable {
    /// Offsets of every source's targets under the current delay table.
    pub fn build<S, D>(synapses: &S, delays: &D) -> QueueResult<Self>
    where
        S: SynapseMap + ?Sized,
        D: DelayMap + ?Sized,
    {
        let n = synapses.source_count();
        let mut resolver = OffsetResolver::new();
        let mut start = Vec::with_capacity(n + 1);
        let mut offsets = Vec::new();
        let mut source_delays = Vec::new();
        let mut scratch = Vec::new();

        start.push(0);
        for i in 0..n {
            let targets = synapses.targets_of(SourceId(i as u32));
            source_delays.clear();
            for &t in targets {
                source_delays.push(checked_delay(delays.delay_of(t), t)?);
            }
            resolver.resolve_into(&source_delays, &mut scratch);
            offsets.extend_from_slice(&scratch);
            start.push(offsets.len());
        }
        Ok(Self { start, offsets })
    }

    pub fn source_count(&self) -> usize {
        self.start.len() - 1
    }

    /// Offsets for `source`, or `None` if the table has no such source.
    #[inline]
    pub fn get(&self, source: SourceId) -> Option<&[u32]> {
        let i = source.index();
        if i + 1 >= self.start.len() {
            return None;
        }
        Some(&self.offsets[self.start[i]..self.start[i + 1]])
    }

    /// Memory held by the cached offsets, in bytes.
    pub fn heap_bytes(&self) -> usize {
        self.offsets.len() * size_of::<u32>() + self.start.len() * size_of::<usize>()
    }
}

// ── SpikeQueue ────────────────────────────────────────────────────────────────

/// Expanded events of one propagation call.
#[derive(Default)]
struct Expansion {
    targets: Vec<SynapseId>,
    delays:  Vec<u32>,
}

pub struct SpikeQueue {
    config:     QueueConfig,
    buffer:     EventBuffer,
    engine:     InsertionEngine,
    class:      DelayClass,
    offsets:    Option<OffsetTable>,
    compressed: bool,
    scratch:    Expansion,
}

impl SpikeQueue {
    /// Allocate a queue with `config.max_delay_steps + 1` buckets of
    /// `config.initial_slot_capacity` slots.
    pub fn new(config: QueueConfig) -> QueueResult<Self> {
        config.validate()?;
        let buffer = EventBuffer::new(config.initial_rows(), config.initial_slot_capacity);
        Ok(Self {
            config,
            buffer,
            engine:     InsertionEngine::new(),
            class:      DelayClass::Heterogeneous,
            offsets:    None,
            compressed: false,
            scratch:    Expansion::default(),
        })
    }

    // ── Sizing ────────────────────────────────────────────────────────────

    /// Size the grid for the delay table and classify delays.
    ///
    /// Grows rows to `max_delay + 1` and, while the width is still the
    /// initial placeholder, widens it to the largest fan-out.  Any growth
    /// here discards pending events, so call this before the queue is used.
    /// The offset table is rebuilt from the current delays whenever offsets
    /// are enabled or a table is already cached, so re-running this after a
    /// delay change never leaves stale ranks behind.
    pub fn compress<S, D>(&mut self, synapses: &S, delays: &D) -> QueueResult<()>
    where
        S: SynapseMap + ?Sized,
        D: DelayMap + ?Sized,
    {
        let grid = GridShape {
            rows:        self.buffer.rows(),
            cols:        self.buffer.cols(),
            placeholder: sq_core::INITIAL_SLOT_CAPACITY,
        };
        let sizing = plan(grid, delays.delay_bounds(), synapses.max_fan_out())?;
        if sizing.reallocate {
            self.buffer.reallocate(sizing.rows, sizing.cols);
        }
        self.class = sizing.class;
        self.compressed = true;
        debug!(
            rows = self.buffer.rows(),
            cols = self.buffer.cols(),
            class = ?self.class,
            reallocated = sizing.reallocate,
            "spike queue sized"
        );

        if self.config.precompute_offsets || self.offsets.is_some() {
            self.precompute_offsets(synapses, delays)?;
        }
        Ok(())
    }

    /// Recompute the per-source offset table from the current delays.
    pub fn precompute_offsets<S, D>(&mut self, synapses: &S, delays: &D) -> QueueResult<()>
    where
        S: SynapseMap + ?Sized,
        D: DelayMap + ?Sized,
    {
        let table = OffsetTable::build(synapses, delays)?;
        debug!(sources = table.source_count(), bytes = table.heap_bytes(), "offsets precomputed");
        self.offsets = Some(table);
        Ok(())
    }

    /// Drop cached offsets; later propagations compute them per step.
    pub fn clear_offsets(&mut self) {
        self.offsets = None;
    }

    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    pub fn delay_class(&self) -> DelayClass {
        self.class
    }

    pub fn has_precomputed_offsets(&self) -> bool {
        self.offsets.is_some()
    }

    /// The write path the next propagation will take.
    pub fn strategy(&self) -> InsertStrategy {
        match (self.class, &self.offsets) {
            (DelayClass::Homogeneous { delay }, _) => InsertStrategy::Homogeneous { delay },
            (DelayClass::Heterogeneous, None)      => InsertStrategy::OnTheFly,
            (DelayClass::Heterogeneous, Some(_))   => InsertStrategy::Precomputed,
        }
    }

    // ── Per-step API ──────────────────────────────────────────────────────

    /// Events due at the current step, in write order.
    #[inline]
    pub fn peek(&self) -> &[SynapseId] {
        self.buffer.peek()
    }

    /// Clear the current bucket and move to the next step.
    #[inline]
    pub fn advance(&mut self) {
        self.buffer.advance();
    }

    /// Copy out the events due now, then advance.
    pub fn deliver(&mut self) -> Vec<SynapseId> {
        let due = self.buffer.peek().to_vec();
        self.buffer.advance();
        due
    }

    /// Expand `active` sources to their target synapses and insert them.
    ///
    /// Fails with `UnknownSource` for an out-of-range source, `InvalidDelay`
    /// for a negative delay, `DelayOutOfRange` for a delay beyond the last
    /// bucket, and `StaleClassification` if the homogeneous fast path sees a
    /// delay other than the one it was sized for.  On error nothing from this
    /// call is written.
    pub fn propagate<S, D>(
        &mut self,
        active:   &[SourceId],
        synapses: &S,
        delays:   &D,
    ) -> QueueResult<()>
    where
        S: SynapseMap + ?Sized,
        D: DelayMap + ?Sized,
    {
        if active.is_empty() {
            return Ok(());
        }
        if !self.compressed {
            self.compress(synapses, delays)?;
        }
        for &s in active {
            if s.index() >= synapses.source_count() {
                return Err(QueueError::UnknownSource(s));
            }
        }

        let strategy = self.strategy();
        match (self.class, self.offsets.as_ref()) {
            (DelayClass::Homogeneous { delay }, _) => {
                let ev = &mut self.scratch;
                ev.targets.clear();
                for &s in active {
                    ev.targets.extend_from_slice(synapses.targets_of(s));
                }
                for &t in &ev.targets {
                    let got = checked_delay(delays.delay_of(t), t)?;
                    if got != delay {
                        return Err(QueueError::StaleClassification { expected: delay, got });
                    }
                }
                trace!(?strategy, events = ev.targets.len(), "propagate");
                self.engine.insert_homogeneous(&mut self.buffer, delay, &ev.targets)
            }

            (DelayClass::Heterogeneous, None) => {
                let ev = &mut self.scratch;
                ev.targets.clear();
                ev.delays.clear();
                for &s in active {
                    for &t in synapses.targets_of(s) {
                        ev.targets.push(t);
                        ev.delays.push(checked_delay(delays.delay_of(t), t)?);
                    }
                }
                trace!(?strategy, events = ev.targets.len(), "propagate");
                self.engine.insert(&mut self.buffer, &ev.delays, &ev.targets)
            }

            (DelayClass::Heterogeneous, Some(table)) => {
                // Validate every sub-batch before writing any of them.
                let ev = &mut self.scratch;
                ev.delays.clear();
                for &s in active {
                    let targets = synapses.targets_of(s);
                    let offsets = table.get(s).ok_or(QueueError::UnknownSource(s))?;
                    if offsets.len() != targets.len() {
                        return Err(QueueError::InvalidBatch {
                            expected: targets.len(),
                            got:      offsets.len(),
                            what:     "precomputed offset",
                        });
                    }
                    for &t in targets {
                        let d = checked_delay(delays.delay_of(t), t)?;
                        if d as usize >= self.buffer.rows() {
                            return Err(QueueError::DelayOutOfRange {
                                delay: d,
                                rows:  self.buffer.rows(),
                            });
                        }
                        ev.delays.push(d);
                    }
                }
                trace!(?strategy, events = ev.delays.len(), "propagate");

                let mut at = 0;
                for &s in active {
                    let targets = synapses.targets_of(s);
                    let end = at + targets.len();
                    if !targets.is_empty() {
                        let offsets = table.get(s).unwrap_or_default();
                        self.engine.insert_with_offsets(
                            &mut self.buffer,
                            &ev.delays[at..end],
                            targets,
                            offsets,
                        )?;
                    }
                    at = end;
                }
                Ok(())
            }
        }
    }

    /// Vectorised insert of explicit `(delay, target)` pairs.
    ///
    /// With `offsets = None` they are computed from `delays`.  Supplied
    /// offsets must rank each delay group as `0..k`; see
    /// [`InsertionEngine::insert_with_offsets`] for what happens otherwise.
    pub fn insert(
        &mut self,
        delays:  &[u32],
        targets: &[SynapseId],
        offsets: Option<&[u32]>,
    ) -> QueueResult<()> {
        match offsets {
            None      => self.engine.insert(&mut self.buffer, delays, targets),
            Some(off) => self.engine.insert_with_offsets(&mut self.buffer, delays, targets, off),
        }
    }

    /// Append `targets`, all due `delay` steps from now.
    pub fn insert_homogeneous(&mut self, delay: u32, targets: &[SynapseId]) -> QueueResult<()> {
        self.engine.insert_homogeneous(&mut self.buffer, delay, targets)
    }

    // ── Inspection ────────────────────────────────────────────────────────

    /// Every bucket in delivery order as `(steps_ahead, events)`.
    pub fn pending(&self) -> impl Iterator<Item = (usize, &[SynapseId])> + '_ {
        self.buffer.pending()
    }

    /// Total events waiting for delivery.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn rows(&self) -> usize {
        self.buffer.rows()
    }

    pub fn slot_capacity(&self) -> usize {
        self.buffer.cols()
    }

    pub fn current_bucket(&self) -> usize {
        self.buffer.current()
    }

    pub fn resize_count(&self) -> u64 {
        self.buffer.resize_count()
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    pub fn buffer(&self) -> &EventBuffer {
        &self.buffer
    }
}

#[inline]
fn checked_delay(delay: i32, synapse: SynapseId) -> QueueResult<u32> {
    u32::try_from(delay).map_err(|_| QueueError::InvalidDelay {
        origin: DelayOrigin::Synapse(synapse),
        delay,
    })
}
