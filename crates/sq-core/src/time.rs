//! Discrete step-time model.
//!
//! # Design
//!
//! The queue only ever sees integer steps.  Delays expressed in seconds are
//! converted once, up front, through a `StepClock`:
//!
//!   steps = round(delay_secs / dt_secs)
//!
//! Nothing downstream of the conversion touches floating point.

use std::fmt;

use crate::{CoreError, CoreResult};

// ── Tick ──────────────────────────────────────────────────────────────────────

/// Index of one simulation step since the run began.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// The step at which an event produced now with `delay_steps` arrives.
    #[inline]
    pub fn after(self, delay_steps: u32) -> Tick {
        Tick(self.0 + u64::from(delay_steps))
    }

    /// Steps elapsed since `earlier`, or `None` if `earlier` is in the future.
    #[inline]
    pub fn since(self, earlier: Tick) -> Option<u64> {
        self.0.checked_sub(earlier.0)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── StepClock ─────────────────────────────────────────────────────────────────

/// Tracks the current step and converts durations in seconds to step counts.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StepClock {
    /// Simulated seconds per step (e.g. `1e-4` for a 0.1 ms integration step).
    pub dt_secs: f64,
    /// The current tick, advanced by `StepClock::advance()` each iteration.
    pub current_tick: Tick,
}

impl StepClock {
    /// Create a clock at tick 0.  `dt_secs` must be finite and positive.
    pub fn new(dt_secs: f64) -> CoreResult<Self> {
        check_dt(dt_secs)?;
        Ok(Self { dt_secs, current_tick: Tick::ZERO })
    }

    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = self.current_tick.after(1);
    }

    /// Elapsed simulated seconds since tick 0.
    #[inline]
    pub fn elapsed_secs(&self) -> f64 {
        self.current_tick.0 as f64 * self.dt_secs
    }

    /// Nearest whole number of steps spanning `secs`.
    ///
    /// Negative results are returned as-is so that delay tables can carry
    /// them and the queue rejects them at expansion time.
    pub fn steps_for_secs(&self, secs: f64) -> CoreResult<i32> {
        if !secs.is_finite() {
            return Err(CoreError::Config(format!("delay {secs} s is not finite")));
        }
        let steps = (secs / self.dt_secs).round();
        if steps > i32::MAX as f64 || steps < i32::MIN as f64 {
            return Err(CoreError::Config(format!(
                "delay {secs} s does not fit in a step counter at dt = {} s",
                self.dt_secs
            )));
        }
        Ok(steps as i32)
    }
}

impl fmt::Display for StepClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.6} s)", self.current_tick, self.elapsed_secs())
    }
}

pub(crate) fn check_dt(dt_secs: f64) -> CoreResult<()> {
    if !dt_secs.is_finite() || dt_secs <= 0.0 {
        return Err(CoreError::Config(format!("step duration must be positive, got {dt_secs}")));
    }
    Ok(())
}
