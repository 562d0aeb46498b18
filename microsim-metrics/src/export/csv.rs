//! CSV export for run reports
//!
//! One file per table, suitable for spreadsheet analysis and pandas.

use crate::error::MetricsError;
use crate::export::MetricsExporter;
use crate::summary::RunReport;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// CSV exporter for run reports
///
/// This exporter creates separate CSV files next to `path`:
/// - `{base}_arrivals.csv` - One row per entity that left the system
/// - `{base}_usage.csv` - One row per closed seize attempt
/// - `{base}_occupancy.csv` - One row per occupancy sample
/// - `{base}_generators.csv` - Per-generator summary
/// - `{base}_resources.csv` - Per-resource summary
/// - `{base}_counters.csv` - Captured counters, only when the report has metrics
#[derive(Debug)]
pub struct CsvExporter {
    path: PathBuf,
}

impl CsvExporter {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Get the path for a specific CSV file
    pub fn path_for(&self, suffix: &str) -> PathBuf {
        let stem = self
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("run");
        let parent = self.path.parent().unwrap_or_else(|| Path::new("."));
        parent.join(format!("{stem}_{suffix}.csv"))
    }

    fn write_table(
        &self,
        suffix: &str,
        header: &str,
        rows: impl IntoIterator<Item = String>,
    ) -> Result<(), MetricsError> {
        let path = self.path_for(suffix);
        let file = File::create(&path).map_err(|e| {
            MetricsError::ExportError(format!("Failed to create {}: {e}", path.display()))
        })?;
        let mut out = BufWriter::new(file);

        writeln!(out, "{header}")
            .map_err(|e| MetricsError::ExportError(format!("Failed to write header: {e}")))?;
        for row in rows {
            writeln!(out, "{row}")
                .map_err(|e| MetricsError::ExportError(format!("Failed to write row: {e}")))?;
        }
        out.flush()?;
        Ok(())
    }
}

impl MetricsExporter for CsvExporter {
    fn export(&self, report: &RunReport) -> Result<(), MetricsError> {
        let monitor = &report.monitor;

        self.write_table(
            "arrivals",
            "entity,name,generator,start_time,end_time,activity_time,finished",
            monitor.arrivals().iter().map(|a| {
                format!(
                    "{},{},{},{},{},{},{}",
                    a.entity.0,
                    escape_csv(&a.name),
                    escape_csv(&a.generator),
                    a.start_time,
                    a.end_time,
                    a.activity_time,
                    a.finished
                )
            }),
        )?;

        self.write_table(
            "usage",
            "entity,name,resource,requested_at,granted_at,released_at",
            monitor.usage().iter().map(|u| {
                format!(
                    "{},{},{},{},{},{}",
                    u.entity.0,
                    escape_csv(&u.name),
                    escape_csv(&u.resource),
                    u.requested_at,
                    optional(u.granted_at),
                    optional(u.released_at)
                )
            }),
        )?;

        self.write_table(
            "occupancy",
            "resource,time,server,queue,capacity,queue_size",
            monitor.occupancy().iter().map(|s| {
                format!(
                    "{},{},{},{},{},{}",
                    escape_csv(&s.resource),
                    s.time,
                    s.server,
                    s.queue,
                    s.capacity,
                    optional(s.queue_size)
                )
            }),
        )?;

        self.write_table(
            "generators",
            "generator,arrivals,completed,rejected,rejection_rate,throughput,\
             flow_mean,flow_p50,flow_p95,flow_p99,waiting_mean,waiting_p95",
            report.summary.generators.iter().map(|g| {
                format!(
                    "{},{},{},{},{},{},{},{},{},{},{},{}",
                    escape_csv(&g.generator),
                    g.arrivals,
                    g.completed,
                    g.rejected,
                    g.rejection_rate,
                    g.throughput,
                    g.flow_time.mean,
                    g.flow_time.p50,
                    g.flow_time.p95,
                    g.flow_time.p99,
                    g.waiting_time.mean,
                    g.waiting_time.p95
                )
            }),
        )?;

        self.write_table(
            "resources",
            "resource,capacity,queue_size,utilization,mean_in_service,mean_queue,\
             max_in_service,max_queue,seizes,rejections,mean_queueing_time",
            report.summary.resources.iter().map(|r| {
                format!(
                    "{},{},{},{},{},{},{},{},{},{},{}",
                    escape_csv(&r.resource),
                    r.capacity,
                    optional(r.queue_size),
                    r.utilization,
                    r.mean_in_service,
                    r.mean_queue,
                    r.max_in_service,
                    r.max_queue,
                    r.seizes,
                    r.rejections,
                    r.mean_queueing_time
                )
            }),
        )?;

        if let Some(metrics) = &report.metrics {
            self.write_table(
                "counters",
                "metric_name,labels,value",
                metrics.counters.iter().map(|c| {
                    format!(
                        "{},{},{}",
                        escape_csv(&c.name),
                        escape_csv(&format_labels(&c.labels)),
                        c.value
                    )
                }),
            )?;
        }

        tracing::debug!(base = %self.path.display(), "Exported run report as CSV");
        Ok(())
    }
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Format labels as a semicolon-separated string
fn format_labels(labels: &BTreeMap<String, String>) -> String {
    labels
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(";")
}

/// Escape a string for CSV format
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
