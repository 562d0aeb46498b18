//! Export of run reports
//!
//! JSON keeps the whole [`RunReport`] in one document. CSV splits it into one
//! flat table per record type for spreadsheets and dataframes.

pub mod csv;
pub mod json;

use crate::error::MetricsError;
use crate::summary::RunReport;
use std::path::Path;

/// Trait for exporting a run report to different formats
pub trait MetricsExporter {
    /// Export the report to the configured destination
    fn export(&self, report: &RunReport) -> Result<(), MetricsError>;
}

/// Export a report to JSON format
///
/// # Example
/// ```no_run
/// use microsim_core::Monitor;
/// use microsim_metrics::RunReport;
/// use microsim_metrics::export::export_json;
///
/// let report = RunReport::new(Monitor::default(), None).unwrap();
/// export_json(&report, "results/run.json", true).unwrap();
/// ```
pub fn export_json(
    report: &RunReport,
    path: impl AsRef<Path>,
    pretty: bool,
) -> Result<(), MetricsError> {
    json::JsonExporter::new(path.as_ref(), pretty).export(report)
}

/// Export a report to a family of CSV files named after `path`
///
/// # Example
/// ```no_run
/// use microsim_core::Monitor;
/// use microsim_metrics::RunReport;
/// use microsim_metrics::export::export_csv;
///
/// let report = RunReport::new(Monitor::default(), None).unwrap();
/// // writes results/run_arrivals.csv, results/run_usage.csv, ...
/// export_csv(&report, "results/run.csv").unwrap();
/// ```
pub fn export_csv(report: &RunReport, path: impl AsRef<Path>) -> Result<(), MetricsError> {
    csv::CsvExporter::new(path.as_ref()).export(report)
}
