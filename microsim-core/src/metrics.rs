//! Metric names and emission helpers used by the engine
//!
//! The engine reports through the `metrics` facade, so nothing is recorded
//! unless a recorder is installed. `microsim-metrics` provides one that keeps
//! every value in memory for a single run.

use metrics::{counter, gauge, histogram};

pub const ENTITIES_GENERATED: &str = "microsim_entities_generated_total";
pub const ENTITIES_COMPLETED: &str = "microsim_entities_completed_total";
pub const ENTITIES_REJECTED: &str = "microsim_entities_rejected_total";
pub const RESOURCE_IN_SERVICE: &str = "microsim_resource_in_service";
pub const RESOURCE_QUEUE_LENGTH: &str = "microsim_resource_queue_length";
/// Flow time of completed entities, in time units
pub const FLOW_TIME: &str = "microsim_flow_time";
/// Time from seize to grant, in time units; zero for immediate grants
pub const QUEUEING_TIME: &str = "microsim_queueing_time";
pub const EVENTS_PROCESSED: &str = "microsim_events_processed_total";
pub const CLAMPED_DRAWS: &str = "microsim_clamped_draws_total";

pub(crate) fn entity_generated(generator: &str) {
    counter!(ENTITIES_GENERATED, "generator" => generator.to_string()).increment(1);
}

pub(crate) fn entity_completed(generator: &str, flow_time: f64) {
    counter!(ENTITIES_COMPLETED, "generator" => generator.to_string()).increment(1);
    histogram!(FLOW_TIME, "generator" => generator.to_string()).record(flow_time);
}

pub(crate) fn entity_rejected(generator: &str, resource: &str) {
    counter!(
        ENTITIES_REJECTED,
        "generator" => generator.to_string(),
        "resource" => resource.to_string()
    )
    .increment(1);
}

pub(crate) fn entity_granted(resource: &str, waited: f64) {
    histogram!(QUEUEING_TIME, "resource" => resource.to_string()).record(waited);
}

pub(crate) fn resource_occupancy(resource: &str, in_service: u32, queue_len: usize) {
    gauge!(RESOURCE_IN_SERVICE, "resource" => resource.to_string()).set(in_service as f64);
    gauge!(RESOURCE_QUEUE_LENGTH, "resource" => resource.to_string()).set(queue_len as f64);
}

pub(crate) fn event_processed(kind: &'static str) {
    counter!(EVENTS_PROCESSED, "action" => kind).increment(1);
}

pub(crate) fn draw_clamped() {
    counter!(CLAMPED_DRAWS).increment(1);
}
