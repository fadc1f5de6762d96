//! Unit tests for sq-core primitives.

#[cfg(test)]
mod ids {
    use crate::{SourceId, SynapseId};

    #[test]
    fn index_roundtrip() {
        let id = SynapseId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(SynapseId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn ordering() {
        assert!(SourceId(0) < SourceId(1));
        assert!(SynapseId(100) > SynapseId(99));
    }

    #[test]
    fn display() {
        assert_eq!(SourceId(7).to_string(), "SourceId(7)");
    }
}

#[cfg(test)]
mod time {
    use crate::{StepClock, Tick};

    #[test]
    fn arrival_and_elapsed() {
        let t = Tick(10);
        assert_eq!(t.after(0), t);
        assert_eq!(t.after(5), Tick(15));
        assert_eq!(Tick(15).since(t), Some(5));
        assert_eq!(t.since(Tick(15)), None);
        assert_eq!(Tick(3).to_string(), "T3");
    }

    #[test]
    fn clock_advances() {
        let mut clock = StepClock::new(0.5).unwrap();
        clock.advance();
        clock.advance();
        assert_eq!(clock.current_tick, Tick(2));
        assert_eq!(clock.elapsed_secs(), 1.0);
    }

    #[test]
    fn rejects_bad_dt() {
        assert!(StepClock::new(0.0).is_err());
        assert!(StepClock::new(-1.0).is_err());
        assert!(StepClock::new(f64::NAN).is_err());
    }

    #[test]
    fn steps_round_to_nearest() {
        let clock = StepClock::new(1e-4).unwrap();
        assert_eq!(clock.steps_for_secs(1.5e-3).unwrap(), 15);
        assert_eq!(clock.steps_for_secs(0.0).unwrap(), 0);
        // Negative delays pass through; the queue rejects them.
        assert_eq!(clock.steps_for_secs(-2e-4).unwrap(), -2);
        assert!(clock.steps_for_secs(f64::INFINITY).is_err());
    }
}

#[cfg(test)]
mod config {
    use crate::{QueueConfig, INITIAL_SLOT_CAPACITY};

    #[test]
    fn default_derives_rows_from_data() {
        let cfg = QueueConfig::default();
        assert_eq!(cfg.max_delay_steps, 0);
        assert_eq!(cfg.initial_rows(), 1);
        assert_eq!(cfg.initial_slot_capacity, INITIAL_SLOT_CAPACITY);
        assert!(cfg.precompute_offsets);
    }

    #[test]
    fn from_secs_floors() {
        let cfg = QueueConfig::from_secs(5.5e-3, 1e-3).unwrap();
        assert_eq!(cfg.max_delay_steps, 5);
        assert_eq!(cfg.initial_rows(), 6);
    }

    #[test]
    fn from_secs_rejects_negative() {
        assert!(QueueConfig::from_secs(-1.0, 1e-3).is_err());
        assert!(QueueConfig::from_secs(1.0, 0.0).is_err());
    }

    #[test]
    fn zero_capacity_is_invalid() {
        let cfg = QueueConfig::default().with_slot_capacity(0);
        assert!(cfg.validate().is_err());
        assert!(QueueConfig::default().validate().is_ok());
    }
}

#[cfg(test)]
mod rng {
    use crate::SimRng;

    #[test]
    fn same_seed_same_stream() {
        let mut a = SimRng::new(7);
        let mut b = SimRng::new(7);
        for _ in 0..16 {
            assert_eq!(a.pick(1000), b.pick(1000));
        }
    }

    #[test]
    fn children_diverge() {
        let mut root = SimRng::new(7);
        let mut c0 = root.child(0);
        let mut c1 = root.child(1);
        let xs: Vec<u32> = (0..8).map(|_| c0.pick(u32::MAX)).collect();
        let ys: Vec<u32> = (0..8).map(|_| c1.pick(u32::MAX)).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn firing_extremes() {
        let mut rng = SimRng::new(3);
        assert!((0..100).all(|_| rng.fires(1.0)));
        assert!((0..100).all(|_| !rng.fires(0.0)));
        // Out-of-range probabilities are clamped rather than panicking.
        assert!(rng.fires(2.5));
        assert!(!rng.fires(-1.0));
    }

    #[test]
    fn draws_stay_in_range() {
        let mut rng = SimRng::new(11);
        for _ in 0..200 {
            assert!(rng.pick(5) < 5);
            let d = rng.delay_in(&(3..=6));
            assert!((3..=6).contains(&d));
        }
        assert_eq!(rng.pick(0), 0);
        assert_eq!(rng.delay_in(&(4..=4)), 4);
        #[allow(clippy::reversed_empty_ranges)]
        let empty = 5..=2;
        assert_eq!(rng.delay_in(&empty), 5);
    }
}
