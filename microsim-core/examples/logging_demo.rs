//! Demonstration of logging in microsim-core
//!
//! Runs a short overloaded app server with detailed logging so that every
//! rejection and state transition shows up in the terminal.
//!
//! Usage examples:
//! - Default (debug level): cargo run --example logging_demo
//! - Everything: RUST_LOG=trace cargo run --example logging_demo
//! - Engine only: RUST_LOG=microsim_core=debug cargo run --example logging_demo

use microsim_core::{
    init_simulation_logging_with_level, simulation_span, Dist, Executor, GeneratorSpec,
    ResourceSpec, SimTime, Simulation, SimulationConfig, StepSpec, TrajectorySpec,
};
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG overrides this level when set
    init_simulation_logging_with_level("debug");

    let config = SimulationConfig::new(42)
        .resource(ResourceSpec::new("app", 1, Some(3)))
        .trajectory(TrajectorySpec::new(
            "request",
            vec![
                StepSpec::seize("app"),
                StepSpec::timeout(Dist::normal(10.0, 1.0)),
                StepSpec::release("app"),
            ],
        ))
        .generator(GeneratorSpec::new("request", "request", Dist::normal(5.0, 1.0)).with_limit(20));

    let span = simulation_span("logging_demo", 42);
    let _guard = span.enter();

    let mut sim = Simulation::new(config)?;
    let mut peak_queue = 0;
    let processed = sim.execute(Executor::timed(SimTime::from_secs(200)).side_effect(|sim| {
        if let Some(app) = sim.resource("app") {
            peak_queue = peak_queue.max(app.queue_len());
        }
    }))?;

    let monitor = sim.monitor();
    info!(
        processed,
        completed = monitor.completed().count(),
        rejected = monitor.rejected().count(),
        peak_queue,
        "Demo finished"
    );
    Ok(())
}
