//! `sq-sim`: step driver for spike queues.
//!
//! # Tick loop
//!
//! ```text
//! for tick in 0..total_ticks:
//!   ① Fire       SpikeSource fills the active sources of every pathway.
//!   ② Propagate  each pathway's queue expands them via its Projection.
//!   ③ Deliver    StepObserver::on_delivered gets the events due now.
//!   ④ Advance    each queue clears its bucket and moves on.
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                  |
//! |------------|---------------------------------------------------------|
//! | `parallel` | Runs ②–④ on Rayon's thread pool, one task per pathway.  |

pub mod builder;
pub mod error;
pub mod observer;
pub mod projection;
pub mod source;
pub mod stepper;

#[cfg(test)]
mod tests;

pub use builder::StepperBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, StepObserver};
pub use projection::{Projection, ProjectionBuilder};
pub use source::{BernoulliSource, ScriptedSource, Silent, SpikeSource};
pub use stepper::{Pathway, Stepper};
