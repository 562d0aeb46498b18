//! Finite-capacity resources with a bounded FIFO wait queue
//!
//! A [`Resource`] serves up to `capacity` units concurrently. Arrivals that do
//! not fit wait in a FIFO queue of at most `queue_size` entities; arrivals
//! that find the queue full are rejected (balking). Waiting entities are
//! granted strictly in arrival order: a waiter that does not fit blocks the
//! ones behind it, so nobody overtakes.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::error::ResourceError;
use crate::ids::EntityId;
use crate::time::SimTime;

/// Outcome of a seize attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeizeOutcome {
    /// Capacity was available; the entity proceeds immediately
    Granted,
    /// The entity waits in the queue until a release makes room
    Queued,
    /// The queue was full; the entity is dropped
    Rejected,
}

/// An entity waiting in a resource queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Waiter {
    pub entity: EntityId,
    pub amount: u32,
    pub since: SimTime,
}

/// A waiter that got its units after a release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grant {
    pub entity: EntityId,
    pub amount: u32,
    pub waited: SimTime,
}

#[derive(Debug, Clone)]
pub struct Resource {
    name: String,
    capacity: u32,
    /// `None` means the queue is unbounded
    queue_size: Option<u32>,
    in_service: u32,
    queue: VecDeque<Waiter>,
    total_granted: u64,
    total_queued: u64,
    total_rejected: u64,
}

impl Resource {
    /// Capacity and queue bounds are validated by [`crate::config`] before a
    /// resource is built.
    pub fn new(name: impl Into<String>, capacity: u32, queue_size: Option<u32>) -> Self {
        Self {
            name: name.into(),
            capacity,
            queue_size,
            in_service: 0,
            queue: VecDeque::new(),
            total_granted: 0,
            total_queued: 0,
            total_rejected: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn queue_size(&self) -> Option<u32> {
        self.queue_size
    }

    /// Units currently held
    pub fn in_service(&self) -> u32 {
        self.in_service
    }

    /// Entities currently waiting
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_queue_full(&self) -> bool {
        self.queue_size
            .is_some_and(|limit| self.queue.len() >= limit as usize)
    }

    pub fn total_granted(&self) -> u64 {
        self.total_granted
    }

    pub fn total_queued(&self) -> u64 {
        self.total_queued
    }

    pub fn total_rejected(&self) -> u64 {
        self.total_rejected
    }

    /// Try to take `amount` units for `entity`.
    pub fn seize(&mut self, entity: EntityId, amount: u32, now: SimTime) -> SeizeOutcome {
        if self.queue.is_empty() && self.in_service + amount <= self.capacity {
            self.in_service += amount;
            self.total_granted += 1;
            SeizeOutcome::Granted
        } else if !self.is_queue_full() {
            self.queue.push_back(Waiter {
                entity,
                amount,
                since: now,
            });
            self.total_queued += 1;
            SeizeOutcome::Queued
        } else {
            self.total_rejected += 1;
            SeizeOutcome::Rejected
        }
    }

    /// Give back `amount` units and grant as many waiters as now fit, in
    /// FIFO order. The caller resumes every returned entity at `now`.
    pub fn release(&mut self, amount: u32, now: SimTime) -> Result<Vec<Grant>, ResourceError> {
        if amount > self.in_service {
            return Err(ResourceError::OverRelease {
                resource: self.name.clone(),
                amount,
                in_service: self.in_service,
            });
        }
        self.in_service -= amount;

        let mut grants = Vec::new();
        while let Some(head) = self.queue.front().copied() {
            if self.in_service + head.amount > self.capacity {
                break;
            }
            self.queue.pop_front();
            self.in_service += head.amount;
            self.total_granted += 1;
            grants.push(Grant {
                entity: head.entity,
                amount: head.amount,
                waited: now - head.since,
            });
        }
        Ok(grants)
    }
}
