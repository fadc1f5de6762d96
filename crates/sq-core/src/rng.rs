//! Deterministic RNG for building synthetic networks and spike trains.
//!
//! Streams are derived, never shared: a pathway gets `root.child(index)`,
//! whose seed is
//!
//!   seed = parent_draw XOR (index * GOLDEN_GAMMA)
//!
//! so neighbouring indices start far apart in seed space.

use std::ops::RangeInclusive;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// 2^64 / φ, the usual odd increment for seed splitting.
const GOLDEN_GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;

/// Seeded, reproducible RNG.  Not `Sync`; derive one per thread.
pub struct SimRng {
    inner: SmallRng,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self { inner: SmallRng::seed_from_u64(seed) }
    }

    /// Independent stream number `index`, advancing `self` by one draw.
    pub fn child(&mut self, index: u64) -> SimRng {
        let draw: u64 = self.inner.r#gen();
        SimRng::new(draw ^ index.wrapping_mul(GOLDEN_GAMMA))
    }

    /// One Bernoulli trial: does a source with per-step firing
    /// probability `p` fire this step?  `p` is clamped to `[0, 1]`.
    #[inline]
    pub fn fires(&mut self, p: f64) -> bool {
        self.inner.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Uniform index in `0..n`.  `n == 0` is treated as `1`.
    #[inline]
    pub fn pick(&mut self, n: u32) -> u32 {
        self.inner.gen_range(0..n.max(1))
    }

    /// Uniform delay, in steps, from an inclusive range.  An empty range
    /// yields its start.
    #[inline]
    pub fn delay_in(&mut self, range: &RangeInclusive<i32>) -> i32 {
        if range.is_empty() {
            return *range.start();
        }
        self.inner.gen_range(range.clone())
    }
}
