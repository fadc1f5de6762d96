//! `sq-queue`: circular delayed-spike queue.
//!
//! # Crate layout
//!
//! | Module           | Contents                                                   |
//! |------------------|------------------------------------------------------------|
//! | [`offsets`]      | `OffsetResolver`, `offsets`, `offsets_sorted`              |
//! | [`buffer`]       | `EventBuffer` (circular `rows × cols` grid + fill counts)  |
//! | [`sizing`]       | `plan`, `DelayClass`, `SizingPlan`                         |
//! | [`insert`]       | `InsertionEngine`, `InsertStrategy`                        |
//! | [`queue`]        | `SpikeQueue`, `OffsetTable`                                |
//! | [`connectivity`] | `SynapseMap`, `DelayMap` collaborator traits               |
//! | [`error`]        | `QueueError`, `QueueResult<T>`                             |
//!
//! # Step model (summary)
//!
//! ```text
//! each step:
//!   queue.propagate(&fired, &synapses, &delays)?;  // insert new events
//!   consume(queue.peek());                          // events due now
//!   queue.advance();                                // clear bucket, move cursor
//! ```
//!
//! An event with delay `d` propagated at step `s` is peeked at step `s + d`.

pub mod buffer;
pub mod connectivity;
pub mod error;
pub mod insert;
pub mod offsets;
pub mod queue;
pub mod sizing;


pub use buffer::EventBuffer;
pub use connectivity::{DelayMap, SynapseMap};
pub use error::{DelayOrigin, QueueError, QueueResult};
pub use insert::{InsertStrategy, InsertionEngine};
pub use offsets::{is_ranking, offsets, offsets_sorted, OffsetResolver};
pub use queue::{OffsetTable, SpikeQueue};
pub use sizing::{DelayClass, SizingPlan};
