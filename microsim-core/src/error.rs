//! Error types for the simulation core

use thiserror::Error;

use crate::ids::EntityId;
use crate::time::SimTime;

/// Top-level error type for simulation operations
#[derive(Debug, Error)]
pub enum SimError {
    #[error("Invalid configuration: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Event error: {0}")]
    Event(#[from] EventError),

    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),

    #[error("Time validation error: {0} is not a valid non-negative simulation time")]
    InvalidTime(f64),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Setup-time validation failures. All of these are reported before the
/// engine enters the running state.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("resource '{name}' must have capacity >= 1, got {capacity}")]
    InvalidCapacity { name: String, capacity: u32 },

    #[error("resource '{0}' is defined more than once")]
    DuplicateResource(String),

    #[error("trajectory '{trajectory}' references unknown resource '{resource}'")]
    UnknownResource { trajectory: String, resource: String },

    #[error("trajectory '{0}' is defined more than once")]
    DuplicateTrajectory(String),

    #[error("generator '{generator}' references unknown trajectory '{trajectory}'")]
    UnknownTrajectory { generator: String, trajectory: String },

    #[error("generator '{0}' is defined more than once")]
    DuplicateGenerator(String),

    #[error("trajectory '{0}' has no steps")]
    EmptyTrajectory(String),

    #[error("trajectory '{trajectory}' is unbalanced on resource '{resource}': {reason}")]
    UnbalancedTrajectory {
        trajectory: String,
        resource: String,
        reason: String,
    },

    #[error("trajectory '{trajectory}' requests {amount} units of '{resource}' (capacity {capacity})")]
    InvalidAmount {
        trajectory: String,
        resource: String,
        amount: u32,
        capacity: u32,
    },

    #[error("invalid distribution for {context}: {reason}")]
    InvalidDistribution { context: String, reason: String },

    #[error("simulation has no generators")]
    NoGenerators,
}

/// Errors related to event scheduling
#[derive(Debug, Error, PartialEq)]
pub enum EventError {
    #[error("Event queue is empty")]
    EmptyQueue,

    #[error("cannot schedule event at {at} before the current time {now}")]
    ScheduleInPast { at: SimTime, now: SimTime },

    #[error("entity {0} is not active")]
    UnknownEntity(EntityId),
}

/// Resource bookkeeping errors. These indicate an engine bug, since trajectory
/// validation rules them out for well-formed configurations.
#[derive(Debug, Error, PartialEq)]
pub enum ResourceError {
    #[error("resource '{resource}' released {amount} units but only {in_service} are in service")]
    OverRelease {
        resource: String,
        amount: u32,
        in_service: u32,
    },
}
