//! # microsim
//!
//! Discrete-event simulation of a toy microservice: API requests flowing
//! through an app server and, optionally, a database, each a finite-capacity
//! resource with a bounded FIFO queue.
//!
//! This crate ties together the engine ([`core`]) and the analysis layer
//! ([`metrics`]) and adds scenario files, the microservice presets and
//! parallel parameter sweeps.
//!
//! ```rust
//! use microsim::prelude::*;
//!
//! let report = MicroserviceParams::app_only().until(500.0).to_scenario().run().unwrap();
//! let app = report.summary.resource("app").unwrap();
//! assert!(app.utilization > 0.5);
//! ```

pub use microsim_core as core;
pub use microsim_metrics as metrics;

pub mod error;
pub mod microservice;
pub mod scenario;
pub mod sweep;

pub use error::ScenarioError;
pub use microservice::{DatabaseParams, MicroserviceParams};
pub use scenario::Scenario;
pub use sweep::{arrival_means, run_scenarios, sweep, SweepPoint};

// Convenience re-exports of commonly used items
pub mod prelude {
    //! Commonly used types and traits

    pub use microsim_core::{
        Dist, Execute, Executor, GeneratorSpec, Monitor, ResourceSpec, SimTime, Simulation,
        SimulationConfig, StepSpec, TrajectorySpec,
    };

    pub use microsim_metrics::{
        with_simulation_metrics_recorder, OccupancySeries, RunReport, RunSummary,
        SimulationMetrics,
    };

    pub use crate::{MicroserviceParams, Scenario, ScenarioError};
}
