//! The event queue: a priority timeline of scheduled actions.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::error::EventError;
use crate::ids::{EntityId, EventId, GeneratorId};
use crate::SimTime;

/// What happens when a scheduled event fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// A generator creates its next entity
    Generate { generator: GeneratorId },
    /// An entity resumes its trajectory at its current step
    Advance { entity: EntityId },
}

/// Entry stored in the event queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledEvent {
    pub id: EventId,
    pub time: SimTime,
    pub action: Action,
}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed on both keys so the max-heap pops the earliest time, and
        // the earliest inserted event among equal times.
        other
            .time
            .cmp(&self.time)
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// Event queue keeping the current time and the upcoming events.
///
/// Events pop in non-decreasing time order; events scheduled for the same
/// time pop in the order they were pushed.
#[derive(Debug, Default)]
pub struct EventQueue {
    next_event_id: u64,
    events: BinaryHeap<ScheduledEvent>,
    clock: SimTime,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `action` at the absolute time `time`.
    pub fn push(&mut self, time: SimTime, action: Action) -> Result<EventId, EventError> {
        if time < self.clock {
            return Err(EventError::ScheduleInPast {
                at: time,
                now: self.clock,
            });
        }
        let id = EventId(self.next_event_id);
        self.next_event_id += 1;
        self.events.push(ScheduledEvent { id, time, action });
        Ok(id)
    }

    /// Schedules `action` at `self.time() + delay`.
    pub fn push_after(&mut self, delay: SimTime, action: Action) -> Result<EventId, EventError> {
        self.push(self.clock + delay, action)
    }

    /// Removes and returns the next event, advancing the clock to its time.
    pub fn pop_min(&mut self) -> Result<ScheduledEvent, EventError> {
        let event = self.events.pop().ok_or(EventError::EmptyQueue)?;
        self.clock = event.time;
        Ok(event)
    }

    /// Time of the next event, or `None` if none are left.
    pub fn peek_time(&self) -> Option<SimTime> {
        self.events.peek().map(|e| e.time)
    }

    /// Returns the current simulation time.
    #[must_use]
    pub fn time(&self) -> SimTime {
        self.clock
    }

    /// Moves the clock forward without popping, used when a run stops at its
    /// horizon. Never moves the clock backwards.
    pub(crate) fn advance_clock(&mut self, time: SimTime) {
        if time > self.clock {
            self.clock = time;
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Total number of events ever pushed
    pub fn scheduled_count(&self) -> u64 {
        self.next_event_id
    }
}
