//! Trajectories: the ordered steps every entity of a path goes through
//!
//! A trajectory is written as a plain list of [`StepSpec`]s naming resources
//! by string. At setup it is resolved into a [`Trajectory`] whose steps point
//! at resources by [`ResourceId`]; resolution checks every reference and that
//! the path releases exactly what it seizes. Resolved trajectories are shared
//! read-only by all entities; per-entity progress lives in the entity.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::dists::Dist;
use crate::error::ConfigError;
use crate::ids::ResourceId;

fn one() -> u32 {
    1
}

/// One step of a trajectory definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum StepSpec {
    Seize {
        resource: String,
        #[serde(default = "one")]
        amount: u32,
    },
    Timeout {
        duration: Dist,
    },
    Release {
        resource: String,
        #[serde(default = "one")]
        amount: u32,
    },
}

impl StepSpec {
    pub fn seize(resource: impl Into<String>) -> Self {
        StepSpec::Seize {
            resource: resource.into(),
            amount: 1,
        }
    }

    pub fn seize_n(resource: impl Into<String>, amount: u32) -> Self {
        StepSpec::Seize {
            resource: resource.into(),
            amount,
        }
    }

    pub fn timeout(duration: Dist) -> Self {
        StepSpec::Timeout { duration }
    }

    pub fn release(resource: impl Into<String>) -> Self {
        StepSpec::Release {
            resource: resource.into(),
            amount: 1,
        }
    }

    pub fn release_n(resource: impl Into<String>, amount: u32) -> Self {
        StepSpec::Release {
            resource: resource.into(),
            amount,
        }
    }
}

/// A named trajectory definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySpec {
    pub name: String,
    pub steps: Vec<StepSpec>,
}

impl TrajectorySpec {
    pub fn new(name: impl Into<String>, steps: Vec<StepSpec>) -> Self {
        Self {
            name: name.into(),
            steps,
        }
    }
}

/// A resolved step
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Seize { resource: ResourceId, amount: u32 },
    Timeout(Dist),
    Release { resource: ResourceId, amount: u32 },
}

/// What the engine does after executing one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextAction {
    /// Run the next step right away
    Continue,
    /// Wait for an event (a timeout expiring or a queued seize being granted)
    Suspend,
    /// The trajectory is over; `finished` is false for rejected entities
    Finish { finished: bool },
}

/// A resolved trajectory
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    name: String,
    steps: Vec<Step>,
}

/// Name, capacity lookup used while resolving trajectories
pub(crate) type ResourceIndex<'a> = HashMap<&'a str, (ResourceId, u32)>;

impl Trajectory {
    pub(crate) fn resolve(
        spec: &TrajectorySpec,
        resources: &ResourceIndex<'_>,
    ) -> Result<Self, ConfigError> {
        if spec.steps.is_empty() {
            return Err(ConfigError::EmptyTrajectory(spec.name.clone()));
        }

        let lookup = |name: &str, amount: u32| -> Result<ResourceId, ConfigError> {
            let (id, capacity) =
                *resources
                    .get(name)
                    .ok_or_else(|| ConfigError::UnknownResource {
                        trajectory: spec.name.clone(),
                        resource: name.to_string(),
                    })?;
            if amount == 0 || amount > capacity {
                return Err(ConfigError::InvalidAmount {
                    trajectory: spec.name.clone(),
                    resource: name.to_string(),
                    amount,
                    capacity,
                });
            }
            Ok(id)
        };

        // units held per resource while walking the path
        let mut held: HashMap<&str, u32> = HashMap::new();
        let mut steps = Vec::with_capacity(spec.steps.len());
        for (index, step) in spec.steps.iter().enumerate() {
            let resolved = match step {
                StepSpec::Seize { resource, amount } => {
                    let id = lookup(resource, *amount)?;
                    *held.entry(resource.as_str()).or_default() += amount;
                    Step::Seize {
                        resource: id,
                        amount: *amount,
                    }
                }
                StepSpec::Timeout { duration } => {
                    duration.validate(&format!("step {index} of trajectory '{}'", spec.name))?;
                    Step::Timeout(duration.clone())
                }
                StepSpec::Release { resource, amount } => {
                    let id = lookup(resource, *amount)?;
                    let current = held.entry(resource.as_str()).or_default();
                    if *amount > *current {
                        return Err(ConfigError::UnbalancedTrajectory {
                            trajectory: spec.name.clone(),
                            resource: resource.clone(),
                            reason: format!(
                                "step {index} releases {amount} units while holding {current}"
                            ),
                        });
                    }
                    *current -= amount;
                    Step::Release {
                        resource: id,
                        amount: *amount,
                    }
                }
            };
            steps.push(resolved);
        }

        let mut leftover: Vec<_> = held.into_iter().filter(|(_, units)| *units > 0).collect();
        leftover.sort();
        if let Some((resource, units)) = leftover.first() {
            return Err(ConfigError::UnbalancedTrajectory {
                trajectory: spec.name.clone(),
                resource: resource.to_string(),
                reason: format!("{units} units are never released"),
            });
        }

        Ok(Self {
            name: spec.name.clone(),
            steps,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn step(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}
