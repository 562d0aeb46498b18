//! Errors surfaced by scenario loading and running

use microsim_core::{ConfigError, SimError};
use microsim_metrics::MetricsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Failed to read scenario: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed scenario: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Simulation error: {0}")]
    Simulation(#[from] SimError),

    #[error("Metrics error: {0}")]
    Metrics(#[from] MetricsError),

    #[error("Horizon must be a finite non-negative time, got {0}")]
    InvalidHorizon(f64),
}

impl From<ConfigError> for ScenarioError {
    fn from(err: ConfigError) -> Self {
        ScenarioError::Simulation(SimError::Configuration(err))
    }
}
