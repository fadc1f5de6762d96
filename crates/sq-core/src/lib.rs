//! `sq-core`: foundational types for the spike-queue workspace.
//!
//! This crate has no `sq-*` dependencies and minimal external ones (only
//! `rand` and `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module     | Contents                                              |
//! |------------|-------------------------------------------------------|
//! | [`ids`]    | `SourceId`, `SynapseId`                               |
//! | [`time`]   | `Tick`, `StepClock`                                   |
//! | [`config`] | `QueueConfig`, `INITIAL_SLOT_CAPACITY`                |
//! | [`rng`]    | `SimRng` (seeded, child-splittable)                   |
//! | [`error`]  | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to IDs, `Tick`, and config. |

pub mod config;
pub mod error;
pub mod ids;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{QueueConfig, INITIAL_SLOT_CAPACITY};
pub use error::{CoreError, CoreResult};
pub use ids::{SourceId, SynapseId};
pub use rng::SimRng;
pub use time::{StepClock, Tick};
