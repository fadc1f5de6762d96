//! Unit tests for sq-sim.

use sq_core::{QueueConfig, SimRng, SourceId, StepClock, SynapseId, Tick};
use sq_queue::{DelayMap, InsertStrategy, QueueError, SynapseMap};

use crate::{
    BernoulliSource, NoopObserver, Projection, ProjectionBuilder, ScriptedSource, SimError,
    Silent, SpikeSource, StepObserver, StepperBuilder,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn clock() -> StepClock {
    StepClock::new(1e-3).unwrap()
}

/// Source 0 → posts 10, 11 (delays 1, 2); source 1 → post 12 (delay 0).
fn tiny_projection() -> Projection {
    let mut b = ProjectionBuilder::new(2);
    b.connect(SourceId(0), 10, 1);
    b.connect(SourceId(1), 12, 0);
    b.connect(SourceId(0), 11, 2);
    b.build()
}

/// Every synapse has the same delay.
fn uniform_projection(sources: u32, delay: i32) -> Projection {
    let mut b = ProjectionBuilder::new(sources as usize);
    for s in 0..sources {
        b.connect(SourceId(s), s, delay);
    }
    b.build()
}

/// Records every delivery as `(tick, pathway, synapse)`.
#[derive(Default)]
struct Recorder {
    delivered: Vec<(u64, usize, SynapseId)>,
    ticks:     Vec<(u64, usize, usize)>,
    run_end:   Option<Tick>,
}

impl StepObserver for Recorder {
    fn on_delivered(&mut self, tick: Tick, pathway: usize, due: &[SynapseId]) {
        self.delivered.extend(due.iter().map(|&s| (tick.0, pathway, s)));
    }

    fn on_tick_end(&mut self, tick: Tick, fired: usize, delivered: usize) {
        self.ticks.push((tick.0, fired, delivered));
    }

    fn on_run_end(&mut self, final_tick: Tick) {
        self.run_end = Some(final_tick);
    }
}

// ── Projection ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod projection_tests {
    use super::*;

    #[test]
    fn groups_by_source_in_insertion_order() {
        let p = tiny_projection();
        assert_eq!(p.source_start, vec![0, 2, 3]);
        assert_eq!(p.post, vec![10, 11, 12]);
        assert_eq!(p.delays, vec![1, 2, 0]);
        assert_eq!(p.targets_of(SourceId(0)), &[SynapseId(0), SynapseId(1)]);
        assert_eq!(p.targets_of(SourceId(1)), &[SynapseId(2)]);
        assert_eq!(p.post_of(SynapseId(2)), 12);
    }

    #[test]
    fn fan_out_and_bounds() {
        let p = tiny_projection();
        assert_eq!(p.max_fan_out(), 2);
        assert_eq!(p.delay_bounds(), Some((0, 2)));
        assert_eq!(p.delay_of(SynapseId(1)), 2);
    }

    #[test]
    fn connect_grows_population() {
        let mut b = ProjectionBuilder::new(1);
        b.connect(SourceId(4), 0, 1);
        let p = b.build();
        assert_eq!(p.source_count(), 5);
        assert!(p.targets_of(SourceId(2)).is_empty());
        assert_eq!(p.targets_of(SourceId(4)).len(), 1);
    }

    #[test]
    fn empty_projection() {
        let p = ProjectionBuilder::new(3).build();
        assert_eq!(p.synapse_count(), 0);
        assert_eq!(p.max_fan_out(), 0);
        assert_eq!(p.delay_bounds(), None);
    }

    #[test]
    fn connect_secs_rounds_to_steps() {
        let c = clock();
        let mut b = ProjectionBuilder::new(1);
        b.connect_secs(SourceId(0), 0, 0.0024, &c).unwrap();
        b.connect_secs(SourceId(0), 1, 0.0026, &c).unwrap();
        assert_eq!(b.build().delays, vec![2, 3]);
    }

    #[test]
    fn connect_secs_rejects_non_finite() {
        let mut b = ProjectionBuilder::new(1);
        let err = b.connect_secs(SourceId(0), 0, f64::NAN, &clock()).unwrap_err();
        assert!(matches!(err, SimError::Core(_)));
        assert_eq!(b.synapse_count(), 0);
    }

    #[test]
    fn random_respects_shape() {
        let mut rng = SimRng::new(7);
        let p = ProjectionBuilder::random(50, 20, 8, 2..=6, &mut rng).build();
        assert_eq!(p.source_count(), 50);
        assert_eq!(p.synapse_count(), 400);
        assert_eq!(p.max_fan_out(), 8);
        let (lo, hi) = p.delay_bounds().unwrap();
        assert!(lo >= 2 && hi <= 6);
        assert!(p.post.iter().all(|&t| t < 20));
    }
}

// ── Sources ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod source_tests {
    use super::*;

    #[test]
    fn scripted_replays_per_pathway() {
        let mut s = ScriptedSource::new()
            .at(Tick(2), 0, &[SourceId(1)])
            .at(Tick(2), 0, &[SourceId(3)])
            .at(Tick(2), 1, &[SourceId(0)]);

        let mut out = Vec::new();
        s.fill(Tick(2), 0, &mut out);
        assert_eq!(out, vec![SourceId(1), SourceId(3)]);

        out.clear();
        s.fill(Tick(1), 0, &mut out);
        assert!(out.is_empty());

        s.fill(Tick(2), 1, &mut out);
        assert_eq!(out, vec![SourceId(0)]);
    }

    #[test]
    fn silent_never_fires() {
        let mut out = Vec::new();
        Silent.fill(Tick(0), 0, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn bernoulli_extremes() {
        let mut s = BernoulliSource::new(vec![(5, 1.0), (5, 0.0)], SimRng::new(1));
        let mut out = Vec::new();
        s.fill(Tick(0), 0, &mut out);
        assert_eq!(out.len(), 5);

        out.clear();
        s.fill(Tick(0), 1, &mut out);
        assert!(out.is_empty());

        // No rate configured for this pathway.
        s.fill(Tick(0), 9, &mut out);
        assert!(out.is_empty());
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;

    #[test]
    fn requires_a_pathway() {
        let result = StepperBuilder::new(clock(), 10, Silent).build();
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn sizes_each_queue() {
        let stepper = StepperBuilder::new(clock(), 10, Silent)
            .pathway("mixed", tiny_projection(), QueueConfig::default())
            .pathway("uniform", uniform_projection(4, 5), QueueConfig::default())
            .build()
            .unwrap();

        let mixed = &stepper.pathways[0];
        assert_eq!(mixed.name, "mixed");
        assert!(mixed.queue.is_compressed());
        assert_eq!(mixed.queue.rows(), 3);
        assert_eq!(mixed.queue.strategy(), InsertStrategy::Precomputed);

        let uniform = &stepper.pathways[1];
        assert_eq!(uniform.queue.rows(), 6);
        assert_eq!(uniform.queue.strategy(), InsertStrategy::Homogeneous { delay: 5 });
    }

    #[test]
    fn bad_queue_config_names_pathway() {
        let bad = QueueConfig::default().with_slot_capacity(0);
        let result = StepperBuilder::new(clock(), 10, Silent)
            .pathway("ok", tiny_projection(), QueueConfig::default())
            .pathway("bad", tiny_projection(), bad)
            .build();
        assert!(matches!(
            result,
            Err(SimError::Queue { pathway: 1, source: QueueError::Core(_) })
        ));
    }

    #[test]
    fn negative_delay_in_projection_fails_build() {
        let mut b = ProjectionBuilder::new(1);
        b.connect(SourceId(0), 0, -2);
        let result = StepperBuilder::new(clock(), 10, Silent)
            .pathway("neg", b.build(), QueueConfig::default())
            .build();
        assert!(matches!(
            result,
            Err(SimError::Queue { pathway: 0, source: QueueError::InvalidDelay { delay: -2, .. } })
        ));
    }
}

// ── Stepper ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod stepper_tests {
    use super::*;

    #[test]
    fn delivers_at_spike_tick_plus_delay() {
        let source = ScriptedSource::new()
            .at(Tick(3), 0, &[SourceId(0), SourceId(1)]);
        let mut stepper = StepperBuilder::new(clock(), 8, source)
            .pathway("p", tiny_projection(), QueueConfig::default())
            .build()
            .unwrap();

        let mut rec = Recorder::default();
        stepper.run(&mut rec).unwrap();

        // Synapse 2 has delay 0 and arrives in the firing tick.
        assert_eq!(
            rec.delivered,
            vec![(3, 0, SynapseId(2)), (4, 0, SynapseId(0)), (5, 0, SynapseId(1))]
        );
        assert_eq!(rec.run_end, Some(Tick(8)));
        assert_eq!(stepper.clock.current_tick, Tick(8));
        assert_eq!(stepper.pending(), 0);
    }

    #[test]
    fn tick_end_counts() {
        let source = ScriptedSource::new().at(Tick(0), 0, &[SourceId(0)]);
        let mut stepper = StepperBuilder::new(clock(), 3, source)
            .pathway("p", tiny_projection(), QueueConfig::default())
            .build()
            .unwrap();

        let mut rec = Recorder::default();
        stepper.run(&mut rec).unwrap();
        assert_eq!(rec.ticks, vec![(0, 1, 0), (1, 0, 1), (2, 0, 1)]);
    }

    #[test]
    fn pathways_are_independent() {
        let source = ScriptedSource::new()
            .at(Tick(0), 0, &[SourceId(1)])
            .at(Tick(0), 1, &[SourceId(1)]);
        let mut stepper = StepperBuilder::new(clock(), 5, source)
            .pathway("mixed", tiny_projection(), QueueConfig::default())
            .pathway("uniform", uniform_projection(2, 4), QueueConfig::default())
            .build()
            .unwrap();

        let mut rec = Recorder::default();
        stepper.run(&mut rec).unwrap();
        assert_eq!(rec.delivered, vec![(0, 0, SynapseId(2)), (4, 1, SynapseId(1))]);
    }

    #[test]
    fn run_ticks_then_pending() {
        let source = ScriptedSource::new().at(Tick(0), 0, &[SourceId(0)]);
        let mut stepper = StepperBuilder::new(clock(), 100, source)
            .pathway("p", tiny_projection(), QueueConfig::default())
            .build()
            .unwrap();

        stepper.run_ticks(1, &mut NoopObserver).unwrap();
        assert_eq!(stepper.pending(), 2);
        stepper.run_ticks(2, &mut NoopObserver).unwrap();
        assert_eq!(stepper.pending(), 0);
        assert_eq!(stepper.clock.current_tick, Tick(3));
    }

    #[test]
    fn changed_uniform_delay_is_reported() {
        let source = ScriptedSource::new().at(Tick(1), 0, &[SourceId(0)]);
        let mut stepper = StepperBuilder::new(clock(), 5, source)
            .pathway("uniform", uniform_projection(2, 3), QueueConfig::default())
            .build()
            .unwrap();

        stepper.pathways[0].projection.set_delay(SynapseId(0), 1);
        let err = stepper.run(&mut NoopObserver).unwrap_err();
        assert!(matches!(
            err,
            SimError::Queue {
                pathway: 0,
                source:  QueueError::StaleClassification { expected: 3, got: 1 },
            }
        ));
    }

    #[test]
    fn grown_delay_is_out_of_range() {
        let source = ScriptedSource::new().at(Tick(0), 0, &[SourceId(0)]);
        let mut stepper = StepperBuilder::new(clock(), 5, source)
            .pathway("p", tiny_projection(), QueueConfig::default())
            .build()
            .unwrap();

        stepper.pathways[0].projection.set_delay(SynapseId(1), 7);
        let err = stepper.run(&mut NoopObserver).unwrap_err();
        assert!(matches!(
            err,
            SimError::Queue { source: QueueError::DelayOutOfRange { delay: 7, rows: 3 }, .. }
        ));
    }

    #[test]
    fn unknown_source_is_reported() {
        let source = ScriptedSource::new().at(Tick(0), 0, &[SourceId(9)]);
        let mut stepper = StepperBuilder::new(clock(), 2, source)
            .pathway("p", tiny_projection(), QueueConfig::default())
            .build()
            .unwrap();

        let err = stepper.run(&mut NoopObserver).unwrap_err();
        assert!(matches!(
            err,
            SimError::Queue { source: QueueError::UnknownSource(SourceId(9)), .. }
        ));
    }

    #[test]
    fn failed_tick_halts_the_stepper() {
        let source = ScriptedSource::new()
            .at(Tick(0), 0, &[SourceId(0)])
            .at(Tick(0), 1, &[SourceId(9)]);
        let mut stepper = StepperBuilder::new(clock(), 5, source)
            .pathway("ok", tiny_projection(), QueueConfig::default())
            .pathway("bad", tiny_projection(), QueueConfig::default())
            .build()
            .unwrap();

        let err = stepper.run(&mut NoopObserver).unwrap_err();
        assert!(matches!(err, SimError::Queue { pathway: 1, .. }));
        assert_eq!(stepper.halted_at(), Some(Tick(0)));
        assert_eq!(stepper.clock.current_tick, Tick(0));

        // Pathway 0 may already have moved on; the stepper must not run on.
        let mut rec = Recorder::default();
        let err = stepper.run(&mut rec).unwrap_err();
        assert!(matches!(err, SimError::Halted { tick: Tick(0) }));
        let err = stepper.run_ticks(1, &mut rec).unwrap_err();
        assert!(matches!(err, SimError::Halted { tick: Tick(0) }));
        assert!(rec.delivered.is_empty());
        assert_eq!(rec.run_end, None);
        assert_eq!(stepper.clock.current_tick, Tick(0));
    }
}
