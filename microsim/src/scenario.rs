//! Scenario files: a configuration plus the horizon to run it to
//!
//! ```json
//! {
//!   "name": "app-only",
//!   "until": 4000.0,
//!   "config": {
//!     "seed": 1,
//!     "resources": [{ "name": "app", "capacity": 1, "queue_size": 20 }],
//!     "trajectories": [{ "name": "request", "steps": [
//!       { "step": "seize", "resource": "app" },
//!       { "step": "timeout", "duration": { "type": "normal", "mean": 10.0, "sd": 1.0 } },
//!       { "step": "release", "resource": "app" }
//!     ]}],
//!     "generators": [{ "name": "request", "trajectory": "request",
//!                      "interarrival": { "type": "normal", "mean": 10.0, "sd": 2.0 } }]
//!   }
//! }
//! ```

use microsim_core::{Simulation, SimulationConfig};
use microsim_metrics::{with_simulation_metrics_recorder, RunReport, SimulationMetrics};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::info;

use crate::error::ScenarioError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default = "default_name")]
    pub name: String,
    pub config: SimulationConfig,
    /// Horizon in time units; events at or after it are not executed
    pub until: f64,
}

fn default_name() -> String {
    "scenario".to_string()
}

impl Scenario {
    pub fn new(name: impl Into<String>, config: SimulationConfig, until: f64) -> Self {
        Self {
            name: name.into(),
            config,
            until,
        }
    }

    /// Parse and validate a scenario
    pub fn from_json_str(json: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = serde_json::from_str(json)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String, ScenarioError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<(), ScenarioError> {
        if !(self.until.is_finite() && self.until >= 0.0) {
            return Err(ScenarioError::InvalidHorizon(self.until));
        }
        self.config.validate()?;
        Ok(())
    }

    /// Build a simulation and run it to the horizon, capturing the engine's
    /// metrics alongside the monitor logs
    pub fn run(&self) -> Result<RunReport, ScenarioError> {
        self.validate()?;
        let span = microsim_core::simulation_span(&self.name, self.config.seed);
        let _guard = span.enter();

        let metrics = Arc::new(Mutex::new(SimulationMetrics::new()));
        let monitor = with_simulation_metrics_recorder(&metrics, || {
            let mut sim = Simulation::new(self.config.clone())?;
            sim.run(self.until)?;
            Ok::<_, ScenarioError>(sim.finish())
        })?;
        let snapshot = metrics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot();

        let report = RunReport::new(monitor, Some(snapshot))?;
        info!(
            scenario = %self.name,
            arrivals = report.summary.arrivals,
            completed = report.summary.completed,
            rejected = report.summary.rejected,
            "Scenario finished"
        );
        Ok(report)
    }
}
