//! Entities: one simulated request moving through its trajectory

use crate::ids::{EntityId, GeneratorId, ResourceId, TrajectoryId};
use crate::time::SimTime;

/// Where an entity currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityState {
    /// Has an `Advance` event pending at the current step
    Ready,
    /// Waiting in the queue of a resource
    Queued(ResourceId),
    /// Inside a timeout
    Delayed,
}

/// A seize that has been requested and not yet released
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct OpenUsage {
    pub resource: ResourceId,
    pub amount: u32,
    pub requested_at: SimTime,
    pub granted_at: Option<SimTime>,
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub(crate) id: EntityId,
    pub(crate) name: String,
    pub(crate) generator: GeneratorId,
    pub(crate) trajectory: TrajectoryId,
    pub(crate) step: usize,
    pub(crate) state: EntityState,
    pub(crate) start_time: SimTime,
    pub(crate) activity_time: SimTime,
    pub(crate) open_usage: Vec<OpenUsage>,
}

impl Entity {
    pub(crate) fn new(
        id: EntityId,
        name: String,
        generator: GeneratorId,
        trajectory: TrajectoryId,
        start_time: SimTime,
    ) -> Self {
        Self {
            id,
            name,
            generator,
            trajectory,
            step: 0,
            state: EntityState::Ready,
            start_time,
            activity_time: SimTime::zero(),
            open_usage: Vec::new(),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn state(&self) -> EntityState {
        self.state
    }

    pub fn start_time(&self) -> SimTime {
        self.start_time
    }

    /// Units of `resource` currently held
    pub fn held(&self, resource: ResourceId) -> u32 {
        self.open_usage
            .iter()
            .filter(|u| u.resource == resource && u.granted_at.is_some())
            .map(|u| u.amount)
            .sum()
    }

    pub(crate) fn open_seize(&mut self, resource: ResourceId, amount: u32, now: SimTime) {
        self.open_usage.push(OpenUsage {
            resource,
            amount,
            requested_at: now,
            granted_at: None,
        });
    }

    /// Mark the oldest pending seize on `resource` as granted
    pub(crate) fn grant(&mut self, resource: ResourceId, now: SimTime) {
        if let Some(usage) = self
            .open_usage
            .iter_mut()
            .find(|u| u.resource == resource && u.granted_at.is_none())
        {
            usage.granted_at = Some(now);
        }
    }

    /// Give back `amount` units of `resource`, oldest grant first. Returns the
    /// seizes that are now fully released; a partially released seize stays
    /// open with its remaining amount.
    pub(crate) fn release(&mut self, resource: ResourceId, mut amount: u32) -> Vec<OpenUsage> {
        let mut closed = Vec::new();
        let mut index = 0;
        while amount > 0 && index < self.open_usage.len() {
            let usage = &mut self.open_usage[index];
            if usage.resource != resource || usage.granted_at.is_none() {
                index += 1;
                continue;
            }
            if usage.amount <= amount {
                amount -= usage.amount;
                closed.push(self.open_usage.remove(index));
            } else {
                usage.amount -= amount;
                amount = 0;
            }
        }
        closed
    }

    /// Drop every granted seize, returning them so the caller can hand the
    /// units back to their resources.
    pub(crate) fn release_all(&mut self) -> Vec<OpenUsage> {
        let (granted, pending) = self
            .open_usage
            .drain(..)
            .partition(|u| u.granted_at.is_some());
        self.open_usage = pending;
        granted
    }
}
