//! Core discrete event simulation engine with finite-capacity queued resources.
//!
//! This crate provides the building blocks of a queueing simulation: time
//! management, an event queue, resources with bounded FIFO wait queues,
//! trajectories of seize/timeout/release steps, entity generators, and a
//! monitor that records what happened.
//!
//! # Architecture Overview
//!
//! - [`SimulationConfig`]: plain serde data naming resources, trajectories and
//!   generators. Validated and resolved by [`Simulation::new`].
//! - [`Simulation`]: owns the event queue, the resources, the random source and
//!   the [`Monitor`]. Nothing is shared between simulations, so independent
//!   runs can execute on different threads.
//! - [`Executor`]: stop conditions for a run (horizon, step count, or until
//!   the queue drains).
//!
//! # Basic Usage
//!
//! ```rust
//! use microsim_core::{
//!     Dist, GeneratorSpec, ResourceSpec, Simulation, SimulationConfig, StepSpec, TrajectorySpec,
//! };
//!
//! let config = SimulationConfig::new(42)
//!     .resource(ResourceSpec::new("app", 1, Some(20)))
//!     .trajectory(TrajectorySpec::new(
//!         "request",
//!         vec![
//!             StepSpec::seize("app"),
//!             StepSpec::timeout(Dist::normal(10.0, 1.0)),
//!             StepSpec::release("app"),
//!         ],
//!     ))
//!     .generator(GeneratorSpec::new("request", "request", Dist::normal(10.0, 2.0)));
//!
//! let mut sim = Simulation::new(config).unwrap();
//! sim.run(400.0).unwrap();
//! let monitor = sim.finish();
//! assert!(monitor.arrivals().len() > 25);
//! ```
//!
//! # Time Model
//!
//! All timing uses [`SimTime`], simulated time with one unit per second. Events
//! at equal times run in the order they were scheduled, so a run is a pure
//! function of its configuration and seed.

pub mod config;
pub mod dists;
pub mod entity;
pub mod error;
pub mod execute;
pub mod generator;
pub mod ids;
pub mod logging;
pub mod metrics;
pub mod monitor;
pub mod randomness;
pub mod resource;
pub mod scheduler;
pub mod time;
pub mod trajectory;

use std::collections::HashMap;
use std::fmt;
use tracing::{instrument, trace, warn};

pub use config::{ResourceSpec, SimulationConfig};
pub use dists::{Dist, Sample};
pub use entity::{Entity, EntityState};
pub use error::{ConfigError, EventError, ResourceError, SimError};
pub use execute::{Execute, Executor};
pub use generator::{Generator, GeneratorSpec};
pub use ids::{EntityId, EventId, GeneratorId, ResourceId, TrajectoryId};
pub use logging::{init_simulation_logging, init_simulation_logging_with_level, simulation_span};
pub use monitor::{ArrivalRecord, Monitor, OccupancySample, ResourceInfo, UsageRecord};
pub use randomness::{RandomProvider, SeededRandom};
pub use resource::{Resource, SeizeOutcome};
pub use scheduler::{Action, EventQueue, ScheduledEvent};
pub use time::SimTime;
pub use trajectory::{NextAction, Step, StepSpec, Trajectory, TrajectorySpec};

/// Lifecycle of a simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Built, generators not yet started
    Idle,
    /// Inside a `run`/`execute` call
    Running,
    /// Between runs, or after the queue drained
    Stopped,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineState::Idle => "Idle",
            EngineState::Running => "Running",
            EngineState::Stopped => "Stopped",
        };
        f.write_str(name)
    }
}

/// Simulation struct that puts the different parts of a run together.
///
/// See the [crate-level documentation](index.html) for more information.
pub struct Simulation {
    seed: u64,
    state: EngineState,
    queue: EventQueue,
    resources: Vec<Resource>,
    resource_ids: HashMap<String, ResourceId>,
    trajectories: Vec<Trajectory>,
    generators: Vec<Generator>,
    entities: HashMap<EntityId, Entity>,
    next_entity_id: u64,
    random: Box<dyn RandomProvider>,
    monitor: Monitor,
    events_processed: u64,
    clamped_draws: u64,
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("seed", &self.seed)
            .field("state", &self.state)
            .field("time", &self.queue.time())
            .field("pending_events", &self.queue.len())
            .field("in_system", &self.entities.len())
            .finish()
    }
}

impl Simulation {
    /// Validates `config` and builds a simulation seeded with `config.seed`.
    ///
    /// Every configuration error is reported here, before anything runs.
    pub fn new(config: SimulationConfig) -> Result<Self, SimError> {
        let model = config.build()?;
        let resource_ids = model
            .resources
            .iter()
            .enumerate()
            .map(|(i, r)| (r.name().to_string(), ResourceId(i)))
            .collect();
        let info = model
            .resources
            .iter()
            .map(|r| ResourceInfo {
                name: r.name().to_string(),
                capacity: r.capacity(),
                queue_size: r.queue_size(),
            })
            .collect();

        Ok(Self {
            seed: config.seed,
            state: EngineState::Idle,
            queue: EventQueue::new(),
            resources: model.resources,
            resource_ids,
            trajectories: model.trajectories,
            generators: model.generators,
            entities: HashMap::new(),
            next_entity_id: 0,
            random: Box::new(SeededRandom::new(config.seed)),
            monitor: Monitor::new(info),
            events_processed: 0,
            clamped_draws: 0,
        })
    }

    /// Replaces the random source. Only allowed before the first run.
    pub fn with_random(mut self, random: Box<dyn RandomProvider>) -> Result<Self, SimError> {
        if self.state != EngineState::Idle {
            return Err(SimError::Internal(
                "random source can only be replaced before the first run".to_string(),
            ));
        }
        self.random = random;
        Ok(self)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Returns the current simulation time.
    #[must_use]
    pub fn time(&self) -> SimTime {
        self.queue.time()
    }

    pub fn monitor(&self) -> &Monitor {
        &self.monitor
    }

    /// Consumes the simulation and returns its logs
    pub fn finish(self) -> Monitor {
        self.monitor
    }

    pub fn resource(&self, name: &str) -> Option<&Resource> {
        self.resource_ids.get(name).map(|id| &self.resources[id.0])
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn generators(&self) -> &[Generator] {
        &self.generators
    }

    /// Entity currently in the system
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Number of entities that arrived and have not left yet
    pub fn in_system(&self) -> usize {
        self.entities.len()
    }

    pub fn events_processed(&self) -> u64 {
        self.events_processed
    }

    /// Number of sampled durations that came out negative and were clamped
    pub fn clamped_draws(&self) -> u64 {
        self.clamped_draws
    }

    /// Returns the time of the next scheduled event, or None if no events are scheduled.
    pub fn peek_next_event_time(&self) -> Option<SimTime> {
        self.queue.peek_time()
    }

    /// Runs until the horizon `until` (in time units).
    ///
    /// The horizon is half-open: only events strictly before `until` are
    /// executed. An event scheduled exactly at `until` stays in the queue
    /// along with everything later, so `run(0.0)` executes nothing. The clock
    /// and the monitor's end time are set to `until` on return.
    ///
    /// A stopped simulation can be run again with a later horizon, which picks
    /// up the events left pending at `until`.
    pub fn run(&mut self, until: f64) -> Result<u64, SimError> {
        let horizon = SimTime::try_from_secs_f64(until)?;
        self.execute(Executor::timed(horizon))
    }

    /// Runs the simulation.
    ///
    /// The stopping condition and other execution details depend on the executor used.
    /// See [`Execute`] and [`Executor`] for more details.
    #[instrument(skip(self, executor), fields(seed = self.seed, initial_time = %self.time()))]
    pub fn execute<E: Execute>(&mut self, executor: E) -> Result<u64, SimError> {
        executor.execute(self)
    }

    /// Performs one step of the simulation. Returns `true` if an event was
    /// processed and `false` when the queue is empty, which stops the run.
    ///
    /// The monitor's end time follows the clock, so a stepped run can be
    /// summarized at any point.
    pub fn step(&mut self) -> Result<bool, SimError> {
        if self.state == EngineState::Idle {
            self.begin()?;
        }
        let event = match self.queue.pop_min() {
            Ok(event) => event,
            Err(EventError::EmptyQueue) => {
                if self.generators.iter().any(Generator::is_eligible) {
                    warn!(time = %self.time(), "Event queue empty while generators are still eligible");
                }
                self.set_state(EngineState::Stopped);
                self.monitor.set_end_time(self.time().as_secs_f64());
                return Ok(false);
            }
            Err(err) => return Err(err.into()),
        };

        let kind = match event.action {
            Action::Generate { .. } => "generate",
            Action::Advance { .. } => "advance",
        };
        let _span = logging::event_span(event.id, kind, event.time).entered();
        trace!(pending = self.queue.len(), "Processing simulation step");

        match event.action {
            Action::Generate { generator } => self.activate(generator)?,
            Action::Advance { entity } => self.advance(entity)?,
        }
        self.events_processed += 1;
        self.monitor.set_end_time(self.time().as_secs_f64());
        crate::metrics::event_processed(kind);
        Ok(true)
    }

    /// Enters the running state, starting the generators on the first call.
    pub(crate) fn begin(&mut self) -> Result<(), SimError> {
        if self.state == EngineState::Idle {
            logging::events::simulation_started(self.seed, self.resources.len(), self.generators.len());
            for index in 0..self.generators.len() {
                if self.generators[index].is_eligible() {
                    self.schedule_generation(GeneratorId(index))?;
                }
            }
        }
        self.set_state(EngineState::Running);
        Ok(())
    }

    /// Leaves the running state at the end of a `run`/`execute` call.
    pub(crate) fn halt(&mut self) {
        self.set_state(EngineState::Stopped);
        self.monitor.set_end_time(self.time().as_secs_f64());
        logging::events::simulation_stopped(self.time(), self.events_processed, self.entities.len());
    }

    pub(crate) fn advance_clock(&mut self, time: SimTime) {
        self.queue.advance_clock(time);
    }

    fn set_state(&mut self, state: EngineState) {
        if self.state != state {
            logging::events::state_changed(&self.state.to_string(), &state.to_string(), self.time());
            self.state = state;
        }
    }

    /// Samples `dist`, counting and logging clamped draws
    fn draw(&mut self, dist: &Dist, context: &str) -> Result<SimTime, SimError> {
        let sample = dist.sample(self.random.as_mut())?;
        if sample.clamped {
            self.clamped_draws += 1;
            crate::metrics::draw_clamped();
            logging::events::draw_clamped(context, self.time());
        }
        Ok(sample.duration)
    }

    fn schedule_generation(&mut self, generator: GeneratorId) -> Result<(), SimError> {
        let dist = self.generators[generator.0].interarrival().clone();
        let gap = self.draw(&dist, "interarrival")?;
        self.queue.push_after(gap, Action::Generate { generator })?;
        Ok(())
    }

    /// A generator fires: create its next entity and schedule the next arrival
    fn activate(&mut self, generator: GeneratorId) -> Result<(), SimError> {
        let now = self.time();
        let source = &mut self.generators[generator.0];
        let name = source.next_entity_name();
        let trajectory = source.trajectory();
        crate::metrics::entity_generated(source.name());

        let id = EntityId(self.next_entity_id);
        self.next_entity_id += 1;
        self.entities
            .insert(id, Entity::new(id, name, generator, trajectory, now));
        self.queue.push(now, Action::Advance { entity: id })?;

        if self.generators[generator.0].is_eligible() {
            self.schedule_generation(generator)?;
        }
        Ok(())
    }

    /// Resume an entity and run its steps until it suspends or leaves
    fn advance(&mut self, id: EntityId) -> Result<(), SimError> {
        loop {
            match self.execute_step(id)? {
                NextAction::Continue => {}
                NextAction::Suspend => return Ok(()),
                NextAction::Finish { finished } => return self.retire(id, finished),
            }
        }
    }

    fn entity_mut(&mut self, id: EntityId) -> Result<&mut Entity, SimError> {
        self.entities
            .get_mut(&id)
            .ok_or_else(|| EventError::UnknownEntity(id).into())
    }

    fn execute_step(&mut self, id: EntityId) -> Result<NextAction, SimError> {
        let now = self.time();
        let entity = self
            .entities
            .get(&id)
            .ok_or(EventError::UnknownEntity(id))?;
        let Some(step) = self.trajectories[entity.trajectory.0].step(entity.step).cloned() else {
            return Ok(NextAction::Finish { finished: true });
        };
        trace!(entity = %id, step = entity.step, ?step, "Executing step");

        match step {
            Step::Seize { resource, amount } => {
                let outcome = self.resources[resource.0].seize(id, amount, now);
                self.sample_occupancy(resource);
                if outcome == SeizeOutcome::Granted {
                    crate::metrics::entity_granted(self.resources[resource.0].name(), 0.0);
                }
                let entity = self.entity_mut(id)?;
                match outcome {
                    SeizeOutcome::Granted => {
                        entity.open_seize(resource, amount, now);
                        entity.grant(resource, now);
                        entity.step += 1;
                        Ok(NextAction::Continue)
                    }
                    SeizeOutcome::Queued => {
                        entity.open_seize(resource, amount, now);
                        entity.step += 1;
                        entity.state = EntityState::Queued(resource);
                        Ok(NextAction::Suspend)
                    }
                    SeizeOutcome::Rejected => {
                        self.reject(id, resource)?;
                        Ok(NextAction::Finish { finished: false })
                    }
                }
            }
            Step::Timeout(dist) => {
                let duration = self.draw(&dist, "timeout")?;
                let entity = self.entity_mut(id)?;
                entity.activity_time = entity.activity_time + duration;
                entity.step += 1;
                entity.state = EntityState::Delayed;
                self.queue.push(now + duration, Action::Advance { entity: id })?;
                Ok(NextAction::Suspend)
            }
            Step::Release { resource, amount } => {
                let entity = self.entity_mut(id)?;
                entity.step += 1;
                let closed = entity.release(resource, amount);
                self.record_usage(id, &closed, now)?;
                self.release_units(resource, amount)?;
                Ok(NextAction::Continue)
            }
        }
    }

    /// Hand `amount` units back to `resource` and wake every waiter it grants
    fn release_units(&mut self, resource: ResourceId, amount: u32) -> Result<(), SimError> {
        let now = self.time();
        let grants = self.resources[resource.0].release(amount, now)?;
        for grant in grants {
            trace!(
                entity = %grant.entity,
                amount = grant.amount,
                waited = %grant.waited,
                "Waiting entity granted"
            );
            crate::metrics::entity_granted(
                self.resources[resource.0].name(),
                grant.waited.as_secs_f64(),
            );
            let entity = self.entity_mut(grant.entity)?;
            entity.grant(resource, now);
            entity.state = EntityState::Ready;
            self.queue.push(now, Action::Advance { entity: grant.entity })?;
        }
        self.sample_occupancy(resource);
        Ok(())
    }

    /// Balking: log the failed seize and give back everything the entity holds
    fn reject(&mut self, id: EntityId, resource: ResourceId) -> Result<(), SimError> {
        let now = self.time();
        let entity = self.entity_mut(id)?;
        let held = entity.release_all();
        let name = entity.name.clone();
        let generator = entity.generator;

        let resource_name = self.resources[resource.0].name();
        logging::events::entity_rejected(id, &name, resource_name, now);
        crate::metrics::entity_rejected(self.generators[generator.0].name(), resource_name);
        self.monitor.record_usage(UsageRecord {
            entity: id,
            name,
            resource: resource_name.to_string(),
            requested_at: now.as_secs_f64(),
            granted_at: None,
            released_at: None,
        });

        self.record_usage(id, &held, now)?;
        for usage in held {
            self.release_units(usage.resource, usage.amount)?;
        }
        Ok(())
    }

    fn record_usage(&mut self, id: EntityId, closed: &[entity::OpenUsage], now: SimTime) -> Result<(), SimError> {
        if closed.is_empty() {
            return Ok(());
        }
        let name = self
            .entities
            .get(&id)
            .ok_or(EventError::UnknownEntity(id))?
            .name
            .clone();
        for usage in closed {
            self.monitor.record_usage(UsageRecord {
                entity: id,
                name: name.clone(),
                resource: self.resources[usage.resource.0].name().to_string(),
                requested_at: usage.requested_at.as_secs_f64(),
                granted_at: usage.granted_at.map(|t| t.as_secs_f64()),
                released_at: Some(now.as_secs_f64()),
            });
        }
        Ok(())
    }

    /// The entity leaves the system
    fn retire(&mut self, id: EntityId, finished: bool) -> Result<(), SimError> {
        let entity = self
            .entities
            .remove(&id)
            .ok_or(EventError::UnknownEntity(id))?;
        let generator = self.generators[entity.generator.0].name();
        let record = ArrivalRecord {
            entity: id,
            name: entity.name,
            generator: generator.to_string(),
            start_time: entity.start_time.as_secs_f64(),
            end_time: self.time().as_secs_f64(),
            activity_time: entity.activity_time.as_secs_f64(),
            finished,
        };
        if finished {
            crate::metrics::entity_completed(generator, record.flow_time());
            logging::events::entity_finished(id, &record.name, record.flow_time());
        }
        self.monitor.record_arrival(record);
        Ok(())
    }

    fn sample_occupancy(&mut self, resource: ResourceId) {
        let res = &self.resources[resource.0];
        crate::metrics::resource_occupancy(res.name(), res.in_service(), res.queue_len());
        self.monitor.record_occupancy(OccupancySample {
            resource: res.name().to_string(),
            time: self.queue.time().as_secs_f64(),
            server: res.in_service(),
            queue: res.queue_len() as u32,
            capacity: res.capacity(),
            queue_size: res.queue_size(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Provider returning zero for every primitive draw, so normal durations
    /// equal their mean exactly
    struct AtMean;

    impl RandomProvider for AtMean {
        fn standard_normal(&mut self) -> f64 {
            0.0
        }
        fn standard_exponential(&mut self) -> f64 {
            1.0
        }
        fn unit(&mut self) -> f64 {
            0.5
        }
    }

    fn single_server(queue_size: Option<u32>, service: f64, gap: f64) -> SimulationConfig {
        SimulationConfig::new(1)
            .resource(ResourceSpec::new("app", 1, queue_size))
            .trajectory(TrajectorySpec::new(
                "request",
                vec![
                    StepSpec::seize("app"),
                    StepSpec::timeout(Dist::constant(service)),
                    StepSpec::release("app"),
                ],
            ))
            .generator(GeneratorSpec::new("request", "request", Dist::constant(gap)))
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let err = Simulation::new(SimulationConfig::new(0)).unwrap_err();
        assert!(matches!(err, SimError::Configuration(ConfigError::NoGenerators)));
    }

    #[test]
    fn test_new_rejects_unschedulable_timeout() {
        let mut config = single_server(None, 1.0, 2.0);
        config.trajectories[0].steps[1] = StepSpec::timeout(Dist::normal(1e11, 1.0));
        let err = Simulation::new(config).unwrap_err();
        assert!(matches!(
            err,
            SimError::Configuration(ConfigError::InvalidDistribution { .. })
        ));
    }

    #[test]
    fn test_initial_state() {
        let sim = Simulation::new(single_server(None, 1.0, 2.0)).unwrap();
        assert_eq!(sim.state(), EngineState::Idle);
        assert_eq!(sim.time(), SimTime::zero());
        assert!(sim.monitor().is_empty());
        assert_eq!(sim.resource("app").map(Resource::capacity), Some(1));
        assert!(sim.resource("database").is_none());
    }

    #[test]
    fn test_run_until_zero_processes_nothing() {
        let mut sim = Simulation::new(single_server(None, 1.0, 2.0)).unwrap();
        assert_eq!(sim.run(0.0).unwrap(), 0);
        assert_eq!(sim.state(), EngineState::Stopped);
        assert!(sim.monitor().arrivals().is_empty());
        assert!(sim.monitor().occupancy().is_empty());
    }

    #[test]
    fn test_event_at_horizon_is_left_pending() {
        // first arrival exactly at 2
        let mut sim = Simulation::new(single_server(None, 1.0, 2.0)).unwrap();
        assert_eq!(sim.run(2.0).unwrap(), 0);
        assert_eq!(sim.peek_next_event_time(), Some(SimTime::from_secs(2)));
        assert_eq!(sim.time(), SimTime::from_secs(2));
        assert_eq!(sim.monitor().end_time(), 2.0);
        assert!(sim.monitor().occupancy().is_empty());

        assert!(sim.run(2.5).unwrap() > 0);
        assert_eq!(sim.monitor().occupancy()[0].time, 2.0);
    }

    #[test]
    fn test_run_rejects_negative_horizon() {
        let mut sim = Simulation::new(single_server(None, 1.0, 2.0)).unwrap();
        assert!(matches!(sim.run(-1.0), Err(SimError::InvalidTime(_))));
    }

    #[test]
    fn test_queueing_adds_waiting_time() {
        // arrivals every 1, service 3: the second request waits 2
        let mut config = single_server(None, 3.0, 1.0);
        config.generators[0].limit = Some(2);
        let mut sim = Simulation::new(config).unwrap();
        sim.execute(Executor::unbound()).unwrap();

        let arrivals = sim.monitor().arrivals();
        assert_eq!(arrivals.len(), 2);
        assert_eq!(arrivals[0].name, "request0");
        assert_eq!(arrivals[0].waiting_time(), 0.0);
        assert_eq!(arrivals[1].start_time, 2.0);
        assert_eq!(arrivals[1].end_time, 7.0);
        assert_eq!(arrivals[1].waiting_time(), 2.0);
        assert!(arrivals.iter().all(|a| a.finished));
    }

    #[test]
    fn test_full_queue_rejects_and_frees_nothing() {
        // service 10, arrivals every 1, no queue: only one in service at a time
        let mut config = single_server(Some(0), 10.0, 1.0);
        config.generators[0].limit = Some(3);
        let mut sim = Simulation::new(config).unwrap();
        sim.execute(Executor::unbound()).unwrap();

        let monitor = sim.monitor();
        assert_eq!(monitor.completed().count(), 1);
        assert_eq!(monitor.rejected().count(), 2);
        let rejected: Vec<_> = monitor.rejected().map(|a| (a.start_time, a.end_time)).collect();
        assert_eq!(rejected, vec![(2.0, 2.0), (3.0, 3.0)]);
        assert_eq!(
            monitor.usage().iter().filter(|u| u.granted_at.is_none()).count(),
            2
        );
        assert_eq!(sim.resource("app").unwrap().total_rejected(), 2);
    }

    #[test]
    fn test_rejection_releases_held_units() {
        // the second seize of a two-stage path finds the database saturated
        let config = SimulationConfig::new(1)
            .resource(ResourceSpec::new("app", 2, None))
            .resource(ResourceSpec::new("database", 1, Some(0)))
            .trajectory(TrajectorySpec::new(
                "request",
                vec![
                    StepSpec::seize("app"),
                    StepSpec::seize("database"),
                    StepSpec::timeout(Dist::constant(5.0)),
                    StepSpec::release("database"),
                    StepSpec::release("app"),
                ],
            ))
            .generator(GeneratorSpec::new("request", "request", Dist::constant(1.0)).with_limit(2));
        let mut sim = Simulation::new(config).unwrap();
        sim.execute(Executor::unbound()).unwrap();

        let monitor = sim.monitor();
        assert_eq!(monitor.rejected().count(), 1);
        assert_eq!(monitor.completed().count(), 1);
        assert_eq!(sim.resource("app").unwrap().in_service(), 0);
        assert_eq!(sim.resource("database").unwrap().in_service(), 0);
        // the app unit held by the rejected request is released at rejection time
        let released: Vec<_> = monitor
            .usage()
            .iter()
            .filter(|u| u.name == "request1" && u.resource == "app")
            .map(|u| u.released_at)
            .collect();
        assert_eq!(released, vec![Some(2.0)]);
    }

    #[test]
    fn test_occupancy_stays_within_bounds() {
        let mut sim = Simulation::new(single_server(Some(3), 2.5, 1.0)).unwrap();
        sim.run(200.0).unwrap();
        for sample in sim.monitor().occupancy() {
            assert!(sample.server <= sample.capacity);
            assert!(sample.queue <= sample.queue_size.unwrap());
        }
        assert!(sim.monitor().rejected().count() > 0);
    }

    #[test]
    fn test_resume_with_later_horizon() {
        let mut sim = Simulation::new(single_server(None, 1.0, 2.0)).unwrap();
        sim.run(10.0).unwrap();
        let first = sim.monitor().arrivals().len();
        assert_eq!(sim.state(), EngineState::Stopped);
        sim.run(20.0).unwrap();
        assert!(sim.monitor().arrivals().len() > first);
        assert_eq!(sim.time(), SimTime::from_secs(20));
    }

    #[test]
    fn test_injected_random_source() {
        let config = SimulationConfig::new(9)
            .resource(ResourceSpec::new("app", 1, None))
            .trajectory(TrajectorySpec::new(
                "request",
                vec![
                    StepSpec::seize("app"),
                    StepSpec::timeout(Dist::normal(4.0, 1.0)),
                    StepSpec::release("app"),
                ],
            ))
            .generator(GeneratorSpec::new("request", "request", Dist::normal(10.0, 2.0)).with_limit(3));
        let mut sim = Simulation::new(config)
            .unwrap()
            .with_random(Box::new(AtMean))
            .unwrap();
        sim.execute(Executor::unbound()).unwrap();
        let flow: Vec<f64> = sim.monitor().arrivals().iter().map(|a| a.flow_time()).collect();
        assert_eq!(flow, vec![4.0, 4.0, 4.0]);
        assert_eq!(sim.time(), SimTime::from_secs(34));
    }

    #[test]
    fn test_with_random_after_start_fails() {
        let mut sim = Simulation::new(single_server(None, 1.0, 2.0)).unwrap();
        sim.run(5.0).unwrap();
        assert!(sim.with_random(Box::new(AtMean)).is_err());
    }

    #[test]
    fn test_negative_draws_are_clamped() {
        let config = SimulationConfig::new(3)
            .resource(ResourceSpec::new("app", 1, None))
            .trajectory(TrajectorySpec::new(
                "request",
                vec![
                    StepSpec::seize("app"),
                    StepSpec::timeout(Dist::normal(0.0, 1.0)),
                    StepSpec::release("app"),
                ],
            ))
            .generator(GeneratorSpec::new("request", "request", Dist::constant(1.0)).with_limit(200));
        let mut sim = Simulation::new(config).unwrap();
        sim.execute(Executor::unbound()).unwrap();
        assert!(sim.clamped_draws() > 0);
        assert!(sim.monitor().arrivals().iter().all(|a| a.end_time >= a.start_time));
    }

    #[test]
    fn test_step_on_empty_queue_stops() {
        let mut config = single_server(None, 1.0, 2.0);
        config.generators[0].limit = Some(0);
        let mut sim = Simulation::new(config).unwrap();
        assert!(!sim.step().unwrap());
        assert_eq!(sim.state(), EngineState::Stopped);
    }

    #[test]
    fn test_stepped_run_tracks_end_time() {
        // arrivals at 2, 4 and 6, each served for 1
        let mut config = single_server(None, 1.0, 2.0);
        config.generators[0].limit = Some(3);
        let mut sim = Simulation::new(config).unwrap();

        assert!(sim.step().unwrap());
        assert_eq!(sim.monitor().end_time(), 2.0);
        while sim.step().unwrap() {}
        assert_eq!(sim.state(), EngineState::Stopped);
        assert_eq!(sim.time(), SimTime::from_secs(7));
        assert_eq!(sim.monitor().end_time(), 7.0);
        assert_eq!(sim.monitor().completed().count(), 3);
    }
}
