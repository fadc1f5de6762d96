//! Spike sources: who fires on each tick, per pathway.

use std::collections::BTreeMap;

use sq_core::{SimRng, SourceId, Tick};

/// Supplies the active source indices of one pathway for one tick.
pub trait SpikeSource {
    /// Append the sources of `pathway` that fire at `tick` to `out`.
    /// `out` is cleared by the caller.
    fn fill(&mut self, tick: Tick, pathway: usize, out: &mut Vec<SourceId>);
}

/// A [`SpikeSource`] that never fires.
pub struct Silent;

impl SpikeSource for Silent {
    fn fill(&mut self, _tick: Tick, _pathway: usize, _out: &mut Vec<SourceId>) {}
}

/// Replays a fixed spike script.
#[derive(Default)]
pub struct ScriptedSource {
    script: BTreeMap<(Tick, usize), Vec<SourceId>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `sources` of `pathway` fire at `tick` (appends to any earlier
    /// entry for the same tick).
    pub fn at(mut self, tick: Tick, pathway: usize, sources: &[SourceId]) -> Self {
        self.script.entry((tick, pathway)).or_default().extend_from_slice(sources);
        self
    }
}

impl SpikeSource for ScriptedSource {
    fn fill(&mut self, tick: Tick, pathway: usize, out: &mut Vec<SourceId>) {
        if let Some(fired) = self.script.get(&(tick, pathway)) {
            out.extend_from_slice(fired);
        }
    }
}

/// Independent Bernoulli firing: each source of pathway `p` fires with
/// probability `rates[p].1` every tick.
pub struct BernoulliSource {
    rates: Vec<(usize, f64)>,
    rng:   SimRng,
}

impl BernoulliSource {
    /// `rates[p] = (source_count, probability_per_tick)`.
    pub fn new(rates: Vec<(usize, f64)>, rng: SimRng) -> Self {
        Self { rates, rng }
    }
}

impl SpikeSource for BernoulliSource {
    fn fill(&mut self, _tick: Tick, pathway: usize, out: &mut Vec<SourceId>) {
        let Some(&(count, p)) = self.rates.get(pathway) else {
            return;
        };
        for i in 0..count as u32 {
            if self.rng.fires(p) {
                out.push(SourceId(i));
            }
        }
    }
}
