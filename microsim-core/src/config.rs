//! Simulation configuration
//!
//! [`SimulationConfig`] is plain serde data describing resources, trajectories
//! and generators by name. [`SimulationConfig::build`] validates all of it up
//! front and resolves names to ids; a simulation never starts from a config
//! that failed validation.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::error::ConfigError;
use crate::generator::{Generator, GeneratorSpec};
use crate::ids::{ResourceId, TrajectoryId};
use crate::resource::Resource;
use crate::trajectory::{ResourceIndex, Trajectory, TrajectorySpec};

/// A resource definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSpec {
    pub name: String,
    pub capacity: u32,
    /// Maximum number of waiting entities; absent means unbounded
    #[serde(default)]
    pub queue_size: Option<u32>,
}

impl ResourceSpec {
    pub fn new(name: impl Into<String>, capacity: u32, queue_size: Option<u32>) -> Self {
        Self {
            name: name.into(),
            capacity,
            queue_size,
        }
    }
}

/// Everything needed to build a [`crate::Simulation`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Seed of the random source
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub resources: Vec<ResourceSpec>,
    #[serde(default)]
    pub trajectories: Vec<TrajectorySpec>,
    #[serde(default)]
    pub generators: Vec<GeneratorSpec>,
}

/// A validated configuration with every name resolved
#[derive(Debug)]
pub(crate) struct Model {
    pub resources: Vec<Resource>,
    pub trajectories: Vec<Trajectory>,
    pub generators: Vec<Generator>,
}

impl SimulationConfig {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    pub fn resource(mut self, spec: ResourceSpec) -> Self {
        self.resources.push(spec);
        self
    }

    pub fn trajectory(mut self, spec: TrajectorySpec) -> Self {
        self.trajectories.push(spec);
        self
    }

    pub fn generator(mut self, spec: GeneratorSpec) -> Self {
        self.generators.push(spec);
        self
    }

    /// Check the whole configuration without building anything
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.build().map(|_| ())
    }

    pub(crate) fn build(&self) -> Result<Model, ConfigError> {
        let mut index: ResourceIndex<'_> = HashMap::new();
        let mut resources = Vec::with_capacity(self.resources.len());
        for (i, spec) in self.resources.iter().enumerate() {
            if spec.capacity == 0 {
                return Err(ConfigError::InvalidCapacity {
                    name: spec.name.clone(),
                    capacity: spec.capacity,
                });
            }
            if index
                .insert(spec.name.as_str(), (ResourceId(i), spec.capacity))
                .is_some()
            {
                return Err(ConfigError::DuplicateResource(spec.name.clone()));
            }
            resources.push(Resource::new(&spec.name, spec.capacity, spec.queue_size));
        }

        let mut trajectory_ids = HashMap::new();
        let mut trajectories = Vec::with_capacity(self.trajectories.len());
        for (i, spec) in self.trajectories.iter().enumerate() {
            if trajectory_ids
                .insert(spec.name.as_str(), TrajectoryId(i))
                .is_some()
            {
                return Err(ConfigError::DuplicateTrajectory(spec.name.clone()));
            }
            trajectories.push(Trajectory::resolve(spec, &index)?);
        }

        if self.generators.is_empty() {
            return Err(ConfigError::NoGenerators);
        }
        let mut generator_names = HashSet::new();
        let mut generators = Vec::with_capacity(self.generators.len());
        for spec in &self.generators {
            if !generator_names.insert(spec.name.as_str()) {
                return Err(ConfigError::DuplicateGenerator(spec.name.clone()));
            }
            let trajectory = *trajectory_ids.get(spec.trajectory.as_str()).ok_or_else(|| {
                ConfigError::UnknownTrajectory {
                    generator: spec.name.clone(),
                    trajectory: spec.trajectory.clone(),
                }
            })?;
            spec.interarrival
                .validate_interarrival(&format!("generator '{}'", spec.name))?;
            generators.push(Generator::new(spec, trajectory));
        }

        Ok(Model {
            resources,
            trajectories,
            generators,
        })
    }
}
