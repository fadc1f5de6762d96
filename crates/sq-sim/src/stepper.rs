//! The `Stepper` struct and its tick loop.

use sq_core::{SourceId, StepClock, SynapseId, Tick};
use sq_queue::SpikeQueue;
use tracing::{debug, warn};

use crate::{Projection, SimError, SimResult, SpikeSource, StepObserver};

// ── Pathway ───────────────────────────────────────────────────────────────────

/// One projection and the queue carrying its spikes.
pub struct Pathway {
    pub name:       String,
    pub projection: Projection,
    pub queue:      SpikeQueue,
}

impl Pathway {
    /// Insert this tick's spikes and return the events due now.  The caller
    /// advances the queue once it is done with them.
    fn step(&mut self, pathway: usize, active: &[SourceId]) -> SimResult<&[SynapseId]> {
        self.queue
            .propagate(active, &self.projection, &self.projection)
            .map_err(|source| SimError::Queue { pathway, source })?;
        Ok(self.queue.peek())
    }
}

// ── Stepper ───────────────────────────────────────────────────────────────────

/// Drives a set of independent pathways one tick at a time.
///
/// Each tick, for every pathway in order:
///
/// 1. **Fire**: ask the [`SpikeSource`] which sources are active.
/// 2. **Propagate**: expand them through the projection into the queue.
/// 3. **Deliver**: report the events due now to the observer.
/// 4. **Advance**: clear the current bucket and move the cursor.
///
/// Propagating before delivering means an event with delay 0 arrives in the
/// tick it was produced.  With the `parallel` feature, steps 2–4 run on
/// Rayon's pool with one task per pathway; observer calls stay sequential in
/// pathway order.
///
/// A tick that fails part-way leaves earlier pathways advanced and later
/// ones not, so the stepper halts: every later call returns
/// [`SimError::Halted`] naming the failed tick.
///
/// Create via [`StepperBuilder`][crate::StepperBuilder].
pub struct Stepper<S: SpikeSource> {
    pub clock:       StepClock,
    pub total_ticks: u64,
    pub pathways:    Vec<Pathway>,
    pub source:      S,

    /// Per-pathway active-source scratch, reused every tick.
    active: Vec<Vec<SourceId>>,

    /// Tick whose processing failed, if any.
    halted: Option<Tick>,
}

impl<S: SpikeSource> Stepper<S> {
    pub(crate) fn new(clock: StepClock, total_ticks: u64, pathways: Vec<Pathway>, source: S) -> Self {
        let active = vec![Vec::new(); pathways.len()];
        Self { clock, total_ticks, pathways, source, active, halted: None }
    }

    pub fn end_tick(&self) -> Tick {
        Tick(self.total_ticks)
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Run from the current tick to `end_tick()`.
    pub fn run<O: StepObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        while self.clock.current_tick < self.end_tick() {
            self.tick(observer)?;
        }
        observer.on_run_end(self.clock.current_tick);
        debug!(tick = %self.clock.current_tick, "run finished");
        Ok(())
    }

    /// Run exactly `n` ticks from the current position (ignores `end_tick`).
    pub fn run_ticks<O: StepObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.tick(observer)?;
        }
        Ok(())
    }

    /// Total events pending across all pathways.
    pub fn pending(&self) -> usize {
        self.pathways.iter().map(|p| p.queue.len()).sum()
    }

    /// The tick at which processing failed, if the stepper has halted.
    pub fn halted_at(&self) -> Option<Tick> {
        self.halted
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn tick<O: StepObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        if let Some(tick) = self.halted {
            return Err(SimError::Halted { tick });
        }
        let now = self.clock.current_tick;
        observer.on_tick_start(now);

        let mut fired = 0;
        for (p, out) in self.active.iter_mut().enumerate() {
            out.clear();
            self.source.fill(now, p, out);
            fired += out.len();
        }

        let delivered = match self.deliver(now, observer) {
            Ok(n) => n,
            Err(e) => {
                warn!(tick = %now, error = %e, "tick failed; stepper halted");
                self.halted = Some(now);
                return Err(e);
            }
        };
        observer.on_tick_end(now, fired, delivered);
        self.clock.advance();
        Ok(())
    }

    #[cfg(not(feature = "parallel"))]
    fn deliver<O: StepObserver>(&mut self, now: Tick, observer: &mut O) -> SimResult<usize> {
        let mut delivered = 0;
        for (p, (pathway, active)) in self.pathways.iter_mut().zip(&self.active).enumerate() {
            let due = pathway.step(p, active)?;
            delivered += due.len();
            observer.on_delivered(now, p, due);
            pathway.queue.advance();
        }
        Ok(delivered)
    }

    #[cfg(feature = "parallel")]
    fn deliver<O: StepObserver>(&mut self, now: Tick, observer: &mut O) -> SimResult<usize> {
        use rayon::prelude::*;

        let due: Vec<Vec<SynapseId>> = self
            .pathways
            .par_iter_mut()
            .zip(self.active.par_iter())
            .enumerate()
            .map(|(p, (pathway, active))| -> SimResult<Vec<SynapseId>> {
                let due = pathway.step(p, active)?.to_vec();
                pathway.queue.advance();
                Ok(due)
            })
            .collect::<SimResult<_>>()?;

        let mut delivered = 0;
        for (p, events) in due.iter().enumerate() {
            delivered += events.len();
            observer.on_delivered(now, p, events);
        }
        Ok(delivered)
    }
}
