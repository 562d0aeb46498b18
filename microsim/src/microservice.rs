//! The toy microservice model: requests through an app server, optionally
//! followed by a database
//!
//! Every request seizes one unit of `app`, is served, and releases it. With a
//! database configured it then seizes `database`, is served again, and
//! releases it. Both resources balk once their queue is full.

use microsim_core::{
    Dist, GeneratorSpec, ResourceSpec, SimulationConfig, StepSpec, TrajectorySpec,
};
use serde::{Deserialize, Serialize};

use crate::scenario::Scenario;

pub const APP: &str = "app";
pub const DATABASE: &str = "database";
pub const REQUEST: &str = "request";

/// A database stage behind the app server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseParams {
    pub service: Dist,
    pub capacity: u32,
    #[serde(default)]
    pub queue_size: Option<u32>,
}

/// Parameters of one microservice run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MicroserviceParams {
    pub arrival: Dist,
    pub app_service: Dist,
    pub app_capacity: u32,
    #[serde(default)]
    pub app_queue_size: Option<u32>,
    #[serde(default)]
    pub database: Option<DatabaseParams>,
    #[serde(default)]
    pub seed: u64,
    pub until: f64,
}

impl MicroserviceParams {
    /// App server only, arrivals as fast as the service on average
    pub fn app_only() -> Self {
        Self {
            arrival: Dist::normal(10.0, 2.0),
            app_service: Dist::normal(10.0, 1.0),
            app_capacity: 1,
            app_queue_size: Some(20),
            database: None,
            seed: 1,
            until: 4000.0,
        }
    }

    /// App server only, arrivals twice as fast as the service
    pub fn overloaded() -> Self {
        Self {
            arrival: Dist::normal(5.0, 1.0),
            ..Self::app_only()
        }
    }

    /// App server followed by a database
    pub fn with_database() -> Self {
        Self {
            app_service: Dist::normal(5.0, 1.0),
            database: Some(DatabaseParams {
                service: Dist::normal(4.0, 1.0),
                capacity: 1,
                queue_size: Some(20),
            }),
            ..Self::app_only()
        }
    }

    pub fn arrival(mut self, arrival: Dist) -> Self {
        self.arrival = arrival;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn until(mut self, until: f64) -> Self {
        self.until = until;
        self
    }

    pub fn to_config(&self) -> SimulationConfig {
        let mut steps = vec![
            StepSpec::seize(APP),
            StepSpec::timeout(self.app_service.clone()),
            StepSpec::release(APP),
        ];
        let mut config = SimulationConfig::new(self.seed).resource(ResourceSpec::new(
            APP,
            self.app_capacity,
            self.app_queue_size,
        ));
        if let Some(db) = &self.database {
            steps.extend([
                StepSpec::seize(DATABASE),
                StepSpec::timeout(db.service.clone()),
                StepSpec::release(DATABASE),
            ]);
            config = config.resource(ResourceSpec::new(DATABASE, db.capacity, db.queue_size));
        }
        config
            .trajectory(TrajectorySpec::new(REQUEST, steps))
            .generator(GeneratorSpec::new(REQUEST, REQUEST, self.arrival.clone()))
    }

    pub fn to_scenario(&self) -> Scenario {
        let name = if self.database.is_some() {
            "app+database"
        } else {
            "app"
        };
        Scenario::new(name, self.to_config(), self.until)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_only_config() {
        let config = MicroserviceParams::app_only().to_config();
        assert_eq!(config.resources.len(), 1);
        assert_eq!(config.trajectories[0].steps.len(), 3);
        assert_eq!(config.generators[0].trajectory, REQUEST);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_database_config() {
        let config = MicroserviceParams::with_database().seed(9).to_config();
        assert_eq!(config.seed, 9);
        assert_eq!(config.resources[1].name, DATABASE);
        assert_eq!(config.trajectories[0].steps.len(), 6);
        assert_eq!(config.trajectories[0].steps[3], StepSpec::seize(DATABASE));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overloaded_rejects() {
        let report = MicroserviceParams::overloaded()
            .until(1000.0)
            .to_scenario()
            .run()
            .unwrap();
        assert!(report.summary.rejected > 0);
        assert_eq!(report.summary.resource(APP).unwrap().max_queue, 20);
    }

    #[test]
    fn test_params_from_json() {
        let params: MicroserviceParams = serde_json::from_str(
            r#"{
                "arrival": { "type": "exponential", "rate": 0.1 },
                "app_service": { "type": "constant", "value": 8.0 },
                "app_capacity": 2,
                "until": 100.0
            }"#,
        )
        .unwrap();
        assert_eq!(params.app_queue_size, None);
        assert!(params.database.is_none());
        assert_eq!(params.to_scenario().name, "app");
    }
}
