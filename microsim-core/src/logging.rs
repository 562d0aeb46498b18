//! Structured logging for simulation runs
//!
//! The engine emits `tracing` events; nothing is printed until a subscriber is
//! installed. The helpers here install a `tracing-subscriber` fmt layer with an
//! [`EnvFilter`], so output can be tuned through `RUST_LOG`:
//!
//! ```bash
//! # Default (info level): run start and stop only
//! cargo run --example microservice_sweep
//!
//! # Rejections and engine state transitions
//! RUST_LOG=microsim_core=debug cargo run --example microservice_sweep
//!
//! # Every dispatched event and random draw (very verbose)
//! RUST_LOG=microsim_core=trace cargo run --example microservice_sweep
//! ```
//!
//! Level guidelines used throughout the crates:
//! - **TRACE**: each dispatched event, each step, each clamped draw
//! - **DEBUG**: rejections, engine state transitions, resource setup
//! - **INFO**: run start and completion
//! - **WARN**: unusual conditions such as a run with no remaining generators

use tracing::{debug, info, trace, Span};
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::ids::{EntityId, EventId};
use crate::SimTime;

/// Initialize logging at `info`, unless `RUST_LOG` says otherwise
pub fn init_simulation_logging() {
    init_simulation_logging_with_level("info")
}

/// Initialize logging with a specific default level
///
/// `RUST_LOG` takes precedence when set. Calling this more than once (from
/// several tests, say) is harmless: only the first call installs a subscriber.
///
/// # Example
/// ```rust
/// use microsim_core::logging::init_simulation_logging_with_level;
///
/// init_simulation_logging_with_level("debug");
/// ```
pub fn init_simulation_logging_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("{level},microsim_core={level},microsim_metrics={level}").into());

    let installed = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter)
        .try_init()
        .is_ok();

    if installed {
        info!("Simulation logging initialized at level: {}", level);
    }
}

/// Create a span covering one simulation run
pub fn simulation_span(name: &str, seed: u64) -> Span {
    tracing::info_span!("simulation", name = name, seed = seed)
}

/// Create a span for one dispatched event
pub fn event_span(event_id: EventId, action: &str, time: SimTime) -> Span {
    tracing::trace_span!("event", id = %event_id, action = action, time = %time)
}

/// Logging utilities for common simulation events
pub mod events {
    use super::*;

    /// Log simulation start
    pub fn simulation_started(seed: u64, resources: usize, generators: usize) {
        info!(
            seed = seed,
            resources = resources,
            generators = generators,
            "Simulation started"
        );
    }

    /// Log the end of one `run`/`execute` call
    pub fn simulation_stopped(final_time: SimTime, events_processed: u64, in_system: usize) {
        info!(
            final_time = %final_time,
            events_processed = events_processed,
            in_system = in_system,
            "Simulation stopped"
        );
    }

    /// Log a balking rejection
    pub fn entity_rejected(entity: EntityId, name: &str, resource: &str, time: SimTime) {
        debug!(
            entity = %entity,
            name = name,
            resource = resource,
            time = %time,
            "Entity rejected, queue full"
        );
    }

    /// Log an entity leaving the system after its last step
    pub fn entity_finished(entity: EntityId, name: &str, flow_time: f64) {
        trace!(
            entity = %entity,
            name = name,
            flow_time = flow_time,
            "Entity finished"
        );
    }

    /// Log a negative draw that was clamped to zero
    pub fn draw_clamped(context: &str, time: SimTime) {
        trace!(context = context, time = %time, "Negative duration clamped to zero");
    }

    /// Log an engine state transition
    pub fn state_changed(old_state: &str, new_state: &str, time: SimTime) {
        debug!(
            old_state = old_state,
            new_state = new_state,
            time = %time,
            "Engine state changed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_initialization_is_idempotent() {
        init_simulation_logging_with_level("debug");
        init_simulation_logging_with_level("trace");
        info!("Test info message");
    }

    #[test]
    fn test_span_creation() {
        let _sim_span = simulation_span("test_simulation", 42);
        let _event_span = event_span(EventId(1), "advance", SimTime::from_millis(100));
    }

    #[test]
    fn test_event_logging() {
        events::simulation_started(42, 2, 1);
        events::entity_rejected(EntityId(3), "request3", "app", SimTime::from_secs(7));
        events::entity_finished(EntityId(1), "request1", 12.0);
        events::draw_clamped("timeout", SimTime::from_secs(7));
        events::state_changed("Idle", "Running", SimTime::zero());
        events::simulation_stopped(SimTime::from_secs(10), 100, 3);
    }
}
