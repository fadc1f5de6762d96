//! Step observer trait for progress reporting and consuming delivered spikes.

use sq_core::{SynapseId, Tick};

/// Callbacks invoked by [`Stepper::run`][crate::Stepper::run] at key points
/// in the tick loop.
///
/// Every hook defaults to a no-op.
///
/// # Example: synaptic current accumulator
///
/// ```rust,ignore
/// struct Currents { weights: Vec<f32>, input: Vec<f32>, post: Vec<u32> }
///
/// impl StepObserver for Currents {
///     fn on_delivered(&mut self, _tick: Tick, _pathway: usize, due: &[SynapseId]) {
///         for s in due {
///             self.input[self.post[s.index()] as usize] += self.weights[s.index()];
///         }
///     }
/// }
/// ```
pub trait StepObserver {
    /// Before the spike source is polled.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called once per pathway per tick with the synapses whose spikes
    /// arrive now, in queue order.  Called in ascending pathway order.
    fn on_delivered(&mut self, _tick: Tick, _pathway: usize, _due: &[SynapseId]) {}

    /// After every pathway has advanced.
    ///
    /// `fired` is the number of active sources across all pathways;
    /// `delivered` the number of synaptic events handed out.
    fn on_tick_end(&mut self, _tick: Tick, _fired: usize, _delivered: usize) {}

    /// Once, when [`Stepper::run`][crate::Stepper::run] reaches its end tick.
    fn on_run_end(&mut self, _final_tick: Tick) {}
}

/// A [`StepObserver`] that does nothing.
pub struct NoopObserver;

impl StepObserver for NoopObserver {}
