//! Append-only run logs
//!
//! The [`Monitor`] is the raw output of a run: one [`ArrivalRecord`] per
//! entity that left the system, one [`UsageRecord`] per seize attempt, and one
//! [`OccupancySample`] per resource state change. Times are in simulated time
//! units. Records are only ever appended, in the order things happened.

use serde::{Deserialize, Serialize};

use crate::ids::EntityId;

/// One entity that completed or was dropped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrivalRecord {
    pub entity: EntityId,
    pub name: String,
    pub generator: String,
    pub start_time: f64,
    pub end_time: f64,
    /// Total time spent in timeouts
    pub activity_time: f64,
    /// `false` when the entity was rejected by a full queue
    pub finished: bool,
}

impl ArrivalRecord {
    /// Time in the system
    pub fn flow_time(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Time in the system not spent in timeouts, i.e. queueing delay
    pub fn waiting_time(&self) -> f64 {
        // float noise can make the difference a hair below zero
        (self.flow_time() - self.activity_time).max(0.0)
    }
}

/// One seize attempt of one entity on one resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub entity: EntityId,
    pub name: String,
    pub resource: String,
    pub requested_at: f64,
    /// `None` when the seize was rejected
    pub granted_at: Option<f64>,
    /// `None` when the seize was rejected
    pub released_at: Option<f64>,
}

impl UsageRecord {
    /// Time spent waiting in this resource's queue
    pub fn queueing_time(&self) -> Option<f64> {
        self.granted_at.map(|granted| granted - self.requested_at)
    }
}

/// State of one resource right after a change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancySample {
    pub resource: String,
    pub time: f64,
    /// Units in service
    pub server: u32,
    /// Entities waiting
    pub queue: u32,
    pub capacity: u32,
    /// `None` for an unbounded queue
    pub queue_size: Option<u32>,
}

/// Static description of a resource, kept alongside the samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceInfo {
    pub name: String,
    pub capacity: u32,
    pub queue_size: Option<u32>,
}

/// Run logs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Monitor {
    resources: Vec<ResourceInfo>,
    arrivals: Vec<ArrivalRecord>,
    usage: Vec<UsageRecord>,
    occupancy: Vec<OccupancySample>,
    /// Time the run stopped at
    end_time: f64,
}

impl Monitor {
    pub fn new(resources: Vec<ResourceInfo>) -> Self {
        Self {
            resources,
            ..Self::default()
        }
    }

    pub(crate) fn record_arrival(&mut self, record: ArrivalRecord) {
        self.arrivals.push(record);
    }

    pub(crate) fn record_usage(&mut self, record: UsageRecord) {
        self.usage.push(record);
    }

    pub(crate) fn record_occupancy(&mut self, sample: OccupancySample) {
        self.occupancy.push(sample);
    }

    pub(crate) fn set_end_time(&mut self, end_time: f64) {
        self.end_time = end_time;
    }

    pub fn resources(&self) -> &[ResourceInfo] {
        &self.resources
    }

    pub fn arrivals(&self) -> &[ArrivalRecord] {
        &self.arrivals
    }

    pub fn usage(&self) -> &[UsageRecord] {
        &self.usage
    }

    pub fn occupancy(&self) -> &[OccupancySample] {
        &self.occupancy
    }

    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    /// Samples of one resource, in time order
    pub fn occupancy_of<'a>(&'a self, resource: &'a str) -> impl Iterator<Item = &'a OccupancySample> + 'a {
        self.occupancy.iter().filter(move |s| s.resource == resource)
    }

    pub fn completed(&self) -> impl Iterator<Item = &ArrivalRecord> {
        self.arrivals.iter().filter(|a| a.finished)
    }

    pub fn rejected(&self) -> impl Iterator<Item = &ArrivalRecord> {
        self.arrivals.iter().filter(|a| !a.finished)
    }

    pub fn is_empty(&self) -> bool {
        self.arrivals.is_empty() && self.usage.is_empty() && self.occupancy.is_empty()
    }
}
