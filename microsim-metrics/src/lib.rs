//! Metrics collection, run summaries and export for microsim runs
//!
//! The engine emits counters, gauges and histograms through the `metrics`
//! facade. [`SimulationRecorder`] captures them into [`SimulationMetrics`];
//! [`RunSummary`] condenses a [`microsim_core::Monitor`] into per-generator
//! and per-resource figures; [`export`] writes the result as JSON or CSV.

pub mod error;
pub mod export;
pub mod recorder;
pub mod simulation_metrics;
pub mod summary;
pub mod time_series;

pub use error::MetricsError;
pub use export::{export_csv, export_json, MetricsExporter};
pub use recorder::{with_simulation_metrics_recorder, SimulationRecorder};
pub use simulation_metrics::{HistogramStats, MetricsSnapshot, SimulationMetrics};
pub use summary::{GeneratorSummary, ResourceSummary, RunReport, RunSummary, Stats};
pub use time_series::{ExponentialMovingAverage, OccupancySeries, TimeSeriesPoint};
