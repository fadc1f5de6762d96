//! Fluent builder for constructing a [`Stepper`].

use sq_core::{QueueConfig, StepClock};
use sq_queue::SpikeQueue;
use tracing::debug;

use crate::{Pathway, Projection, SimError, SimResult, SpikeSource, Stepper};

/// Fluent builder for [`Stepper<S>`].
///
/// Every pathway's queue is sized against its projection in
/// [`build`](Self::build), so the returned stepper is ready to run.
///
/// # Example
///
/// ```rust,ignore
/// let clock = StepClock::new(1e-4)?;
/// let mut stepper = StepperBuilder::new(clock, 10_000, source)
///     .pathway("exc", projection, QueueConfig::default())
///     .build()?;
/// stepper.run(&mut NoopObserver)?;
/// ```
pub struct StepperBuilder<S: SpikeSource> {
    clock:       StepClock,
    total_ticks: u64,
    source:      S,
    pathways:    Vec<(String, Projection, QueueConfig)>,
}

impl<S: SpikeSource> StepperBuilder<S> {
    pub fn new(clock: StepClock, total_ticks: u64, source: S) -> Self {
        Self { clock, total_ticks, source, pathways: Vec::new() }
    }

    /// Add a pathway.  Pathways are indexed in the order they are added.
    pub fn pathway(mut self, name: impl Into<String>, projection: Projection, config: QueueConfig) -> Self {
        self.pathways.push((name.into(), projection, config));
        self
    }

    /// Validate inputs, size each queue, and return a ready-to-run
    /// [`Stepper`].
    pub fn build(self) -> SimResult<Stepper<S>> {
        if self.pathways.is_empty() {
            return Err(SimError::Config("at least one pathway is required".into()));
        }

        let mut pathways = Vec::with_capacity(self.pathways.len());
        for (i, (name, projection, config)) in self.pathways.into_iter().enumerate() {
            let wrap = |source| SimError::Queue { pathway: i, source };
            let mut queue = SpikeQueue::new(config).map_err(wrap)?;
            queue.compress(&projection, &projection).map_err(wrap)?;
            debug!(
                pathway = %name,
                sources = projection.source_count(),
                synapses = projection.synapse_count(),
                rows = queue.rows(),
                strategy = ?queue.strategy(),
                "pathway ready"
            );
            pathways.push(Pathway { name, projection, queue });
        }

        Ok(Stepper::new(self.clock, self.total_ticks, pathways, self.source))
    }
}
