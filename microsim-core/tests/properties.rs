//! Invariants that hold for every configuration and seed

use microsim_core::{
    Dist, GeneratorSpec, ResourceSpec, Simulation, SimulationConfig, StepSpec, TrajectorySpec,
};
use proptest::prelude::*;

fn model(
    seed: u64,
    capacity: u32,
    queue_size: Option<u32>,
    amount: u32,
    arrival_mean: f64,
    service_mean: f64,
) -> SimulationConfig {
    SimulationConfig::new(seed)
        .resource(ResourceSpec::new("app", capacity, queue_size))
        .resource(ResourceSpec::new("database", 1, queue_size))
        .trajectory(TrajectorySpec::new(
            "request",
            vec![
                StepSpec::seize_n("app", amount.min(capacity)),
                StepSpec::timeout(Dist::normal(service_mean, service_mean / 4.0)),
                StepSpec::seize("database"),
                StepSpec::timeout(Dist::exponential(1.0 / service_mean)),
                StepSpec::release("database"),
                StepSpec::release_n("app", amount.min(capacity)),
            ],
        ))
        .generator(GeneratorSpec::new(
            "request",
            "request",
            Dist::normal(arrival_mean, arrival_mean / 2.0),
        ))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn logs_respect_bounds(
        seed in any::<u64>(),
        capacity in 1u32..4,
        queue_size in prop::option::of(0u32..6),
        amount in 1u32..3,
        arrival_mean in 0.5f64..8.0,
        service_mean in 0.5f64..8.0,
        until in 0.0f64..400.0,
    ) {
        let config = model(seed, capacity, queue_size, amount, arrival_mean, service_mean);
        let mut sim = Simulation::new(config).unwrap();
        sim.run(until).unwrap();
        let monitor = sim.finish();

        for arrival in monitor.arrivals() {
            prop_assert!(arrival.end_time >= arrival.start_time);
            prop_assert!(arrival.waiting_time() >= 0.0);
            prop_assert!(arrival.end_time < until);
        }
        for sample in monitor.occupancy() {
            prop_assert!(sample.server <= sample.capacity);
            if let Some(limit) = sample.queue_size {
                prop_assert!(sample.queue <= limit);
            }
        }
        for usage in monitor.usage() {
            if let Some(granted) = usage.granted_at {
                prop_assert!(granted >= usage.requested_at);
            }
            if let (Some(granted), Some(released)) = (usage.granted_at, usage.released_at) {
                prop_assert!(released >= granted);
            }
        }
        let times: Vec<f64> = monitor.occupancy().iter().map(|s| s.time).collect();
        prop_assert!(times.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn identical_inputs_identical_logs(seed in any::<u64>(), until in 0.0f64..300.0) {
        let run = || {
            let mut sim = Simulation::new(model(seed, 2, Some(3), 1, 2.0, 3.0)).unwrap();
            sim.run(until).unwrap();
            sim.finish()
        };
        prop_assert_eq!(run(), run());
    }
}
