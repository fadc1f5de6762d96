//! ring: two spike pathways driven for one simulated second.
//!
//! `ring` wires each neuron to its next few neighbours with a delay that
//! grows with distance, so its queue takes the heterogeneous path.
//! `relay` is a random projection with one fixed delay and takes the
//! homogeneous fast path.  Set `RUST_LOG=debug` to see queue sizing.

use std::time::Instant;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sq_core::{QueueConfig, SimRng, SourceId, StepClock, SynapseId, Tick};
use sq_sim::{BernoulliSource, Projection, ProjectionBuilder, StepObserver, StepperBuilder};

// ── Constants ─────────────────────────────────────────────────────────────────

const NEURONS:        u32   = 1_000;
const RING_REACH:     u32   = 8;
const RING_STEP_SECS: f64   = 0.5e-3; // extra delay per neighbour hop
const RELAY_FAN_OUT:  usize = 20;
const RELAY_DELAY:    i32   = 15;
const FIRING_PROB:    f64   = 0.002;  // per tick, i.e. 20 Hz at dt = 0.1 ms
const DT_SECS:        f64   = 1e-4;
const SIM_SECS:       f64   = 1.0;
const SEED:           u64   = 42;

// ── Projections ───────────────────────────────────────────────────────────────

fn ring(clock: &StepClock) -> Result<Projection> {
    let mut b = ProjectionBuilder::new(NEURONS as usize);
    for pre in 0..NEURONS {
        for hop in 1..=RING_REACH {
            let post = (pre + hop) % NEURONS;
            b.connect_secs(SourceId(pre), post, hop as f64 * RING_STEP_SECS, clock)?;
        }
    }
    Ok(b.build())
}

// ── Observer ──────────────────────────────────────────────────────────────────

/// Sums unit input per postsynaptic neuron and counts events per pathway.
struct InputCounter<'a> {
    posts:     [&'a [u32]; 2],
    input:     [Vec<u32>; 2],
    delivered: [u64; 2],
    fired:     u64,
    peak:      (Tick, usize),
}

impl<'a> InputCounter<'a> {
    fn new(posts: [&'a [u32]; 2]) -> Self {
        Self {
            posts,
            input: [vec![0; NEURONS as usize], vec![0; NEURONS as usize]],
            delivered: [0; 2],
            fired: 0,
            peak: (Tick::ZERO, 0),
        }
    }
}

impl StepObserver for InputCounter<'_> {
    fn on_delivered(&mut self, _tick: Tick, pathway: usize, due: &[SynapseId]) {
        self.delivered[pathway] += due.len() as u64;
        for s in due {
            self.input[pathway][self.posts[pathway][s.index()] as usize] += 1;
        }
    }

    fn on_tick_end(&mut self, tick: Tick, fired: usize, delivered: usize) {
        self.fired += fired as u64;
        if delivered > self.peak.1 {
            self.peak = (tick, delivered);
        }
    }

    fn on_run_end(&mut self, final_tick: Tick) {
        info!(%final_tick, fired = self.fired, "run complete");
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== ring: spike queue demo ===");
    println!("Neurons: {NEURONS}  |  dt: {DT_SECS} s  |  Duration: {SIM_SECS} s  |  Seed: {SEED}");
    println!();

    let clock = StepClock::new(DT_SECS)?;
    let total_ticks = (SIM_SECS / DT_SECS).round() as u64;
    let mut rng = SimRng::new(SEED);

    // 1. Projections.
    let ring = ring(&clock)?;
    let relay = ProjectionBuilder::random(
        NEURONS as usize,
        NEURONS,
        RELAY_FAN_OUT,
        RELAY_DELAY..=RELAY_DELAY,
        &mut rng,
    )
    .build();
    println!("ring : {} synapses", ring.synapse_count());
    println!("relay: {} synapses", relay.synapse_count());

    // 2. Stepper.
    let source = BernoulliSource::new(
        vec![(NEURONS as usize, FIRING_PROB), (NEURONS as usize, FIRING_PROB)],
        rng.child(1),
    );
    let mut stepper = StepperBuilder::new(clock, total_ticks, source)
        .pathway("ring", ring, QueueConfig::default())
        .pathway("relay", relay, QueueConfig::default())
        .build()?;

    for p in &stepper.pathways {
        println!(
            "{:<6} rows={:<4} slots={:<4} strategy={:?}",
            p.name,
            p.queue.rows(),
            p.queue.slot_capacity(),
            p.queue.strategy()
        );
    }
    println!();

    // 3. Run.  The stepper is borrowed mutably, so the observer gets its
    // own copy of the post arrays.
    let posts = [
        stepper.pathways[0].projection.post.clone(),
        stepper.pathways[1].projection.post.clone(),
    ];
    let mut obs = InputCounter::new([&posts[0], &posts[1]]);

    let t0 = Instant::now();
    stepper.run(&mut obs)?;
    let elapsed = t0.elapsed();

    // 4. Summary.
    println!("Simulation complete in {:.3} s", elapsed.as_secs_f64());
    println!("  spikes fired      : {}", obs.fired);
    println!("  peak tick         : {} ({} events)", obs.peak.0, obs.peak.1);
    for (i, p) in stepper.pathways.iter().enumerate() {
        let busiest = obs.input[i].iter().copied().max().unwrap_or(0);
        println!(
            "  {:<6} delivered : {:<8} pending={:<6} resizes={} busiest-input={}",
            p.name,
            obs.delivered[i],
            p.queue.len(),
            p.queue.resize_count(),
            busiest
        );
    }

    Ok(())
}
