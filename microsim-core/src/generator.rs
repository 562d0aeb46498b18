//! Generators: lazy streams of new entities

use serde::{Deserialize, Serialize};

use crate::dists::Dist;
use crate::ids::TrajectoryId;

/// A generator definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorSpec {
    /// Prefix of generated entity names (`request0`, `request1`, ...)
    pub name: String,
    /// Name of the trajectory every generated entity follows
    pub trajectory: String,
    /// Gap between consecutive arrivals
    pub interarrival: Dist,
    /// Stop after this many entities; `None` generates until the run stops
    #[serde(default)]
    pub limit: Option<u64>,
}

impl GeneratorSpec {
    pub fn new(name: impl Into<String>, trajectory: impl Into<String>, interarrival: Dist) -> Self {
        Self {
            name: name.into(),
            trajectory: trajectory.into(),
            interarrival,
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Runtime state of a generator
#[derive(Debug, Clone)]
pub struct Generator {
    name: String,
    trajectory: TrajectoryId,
    interarrival: Dist,
    limit: Option<u64>,
    generated: u64,
}

impl Generator {
    pub(crate) fn new(spec: &GeneratorSpec, trajectory: TrajectoryId) -> Self {
        Self {
            name: spec.name.clone(),
            trajectory,
            interarrival: spec.interarrival.clone(),
            limit: spec.limit,
            generated: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn trajectory(&self) -> TrajectoryId {
        self.trajectory
    }

    pub fn generated(&self) -> u64 {
        self.generated
    }

    /// Whether another activation may be scheduled
    pub fn is_eligible(&self) -> bool {
        self.limit.map_or(true, |limit| self.generated < limit)
    }

    /// Distribution of the gap until the next activation
    pub fn interarrival(&self) -> &Dist {
        &self.interarrival
    }

    /// Count a new entity and return its name
    pub(crate) fn next_entity_name(&mut self) -> String {
        let name = format!("{}{}", self.name, self.generated);
        self.generated += 1;
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::randomness::SeededRandom;
    use crate::SimTime;

    #[test]
    fn test_names_and_limit() {
        let spec = GeneratorSpec::new("request", "path", Dist::constant(1.0)).with_limit(2);
        let mut gen = Generator::new(&spec, TrajectoryId(0));
        assert!(gen.is_eligible());
        assert_eq!(gen.next_entity_name(), "request0");
        assert_eq!(gen.next_entity_name(), "request1");
        assert!(!gen.is_eligible());
        assert_eq!(gen.generated(), 2);
    }

    #[test]
    fn test_unlimited_generator_stays_eligible() {
        let spec = GeneratorSpec::new("request", "path", Dist::constant(1.0));
        let mut gen = Generator::new(&spec, TrajectoryId(0));
        for _ in 0..10_000 {
            gen.next_entity_name();
        }
        assert!(gen.is_eligible());
    }

    #[test]
    fn test_gap_comes_from_interarrival() {
        let spec = GeneratorSpec::new("request", "path", Dist::constant(2.5));
        let gen = Generator::new(&spec, TrajectoryId(0));
        let mut rng = SeededRandom::new(1);
        assert_eq!(
            gen.interarrival().sample(&mut rng).unwrap().duration,
            SimTime::from_millis(2500)
        );
    }

    #[test]
    fn test_spec_limit_defaults_to_none() {
        let spec: GeneratorSpec = serde_json::from_str(
            r#"{"name": "request", "trajectory": "path", "interarrival": {"type": "normal", "mean": 10.0, "sd": 2.0}}"#,
        )
        .unwrap();
        assert_eq!(spec.limit, None);
        assert_eq!(spec.interarrival, Dist::normal(10.0, 2.0));
    }
}
