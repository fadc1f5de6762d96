//! Queue configuration surface exposed to the owning simulation.

use crate::time::check_dt;
use crate::{CoreError, CoreResult};

/// Per-step capacity a freshly constructed queue starts with.
///
/// Sizing treats a capacity equal to this value as a placeholder and
/// replaces it with the largest fan-out in the connectivity.
pub const INITIAL_SLOT_CAPACITY: usize = 1;

/// Construction-time settings for a spike queue.
///
/// Typically built by the application and handed to `SpikeQueue::new`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QueueConfig {
    /// Upper bound on representable delay, in steps.  `0` means "derive
    /// from the delay table at sizing time".  Only set this when delays may
    /// grow during the run; doing so also disables the homogeneous fast path.
    pub max_delay_steps: u32,

    /// Starting number of slots per bucket.  The buffer grows on demand, so
    /// this is rarely worth tuning.
    pub initial_slot_capacity: usize,

    /// Cache per-source offsets at sizing time.  Trades memory (one `u32`
    /// per synapse) for less work per step.  Leave off if delays change
    /// during the run.
    pub precompute_offsets: bool,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_delay_steps:       0,
            initial_slot_capacity: INITIAL_SLOT_CAPACITY,
            precompute_offsets:    true,
        }
    }
}

impl QueueConfig {
    /// Build a config from a maximum delay in seconds and a step length.
    ///
    /// The step bound is `floor(max_delay_secs / dt_secs)`.
    pub fn from_secs(max_delay_secs: f64, dt_secs: f64) -> CoreResult<Self> {
        check_dt(dt_secs)?;
        if !max_delay_secs.is_finite() || max_delay_secs < 0.0 {
            return Err(CoreError::Config(format!(
                "maximum delay must be a non-negative duration, got {max_delay_secs}"
            )));
        }
        let steps = (max_delay_secs / dt_secs).floor();
        if steps > u32::MAX as f64 {
            return Err(CoreError::Config(format!(
                "maximum delay of {steps} steps is not representable"
            )));
        }
        Ok(Self { max_delay_steps: steps as u32, ..Self::default() })
    }

    pub fn with_slot_capacity(mut self, slots: usize) -> Self {
        self.initial_slot_capacity = slots;
        self
    }

    pub fn with_precomputed_offsets(mut self, enabled: bool) -> Self {
        self.precompute_offsets = enabled;
        self
    }

    /// Number of buckets the queue allocates before sizing.
    #[inline]
    pub fn initial_rows(&self) -> usize {
        self.max_delay_steps as usize + 1
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.initial_slot_capacity == 0 {
            return Err(CoreError::Config("initial slot capacity must be at least 1".into()));
        }
        Ok(())
    }
}
