//! JSON export for run reports

use crate::error::MetricsError;
use crate::export::MetricsExporter;
use crate::summary::RunReport;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct JsonExporter {
    path: PathBuf,
    pretty: bool,
}

impl JsonExporter {
    /// Create a new JSON exporter
    ///
    /// # Arguments
    /// * `path` - Output file path
    /// * `pretty` - Whether to pretty-print the JSON
    pub fn new(path: &Path, pretty: bool) -> Self {
        Self {
            path: path.to_path_buf(),
            pretty,
        }
    }
}

impl MetricsExporter for JsonExporter {
    fn export(&self, report: &RunReport) -> Result<(), MetricsError> {
        let json = if self.pretty {
            serde_json::to_string_pretty(report)?
        } else {
            serde_json::to_string(report)?
        };

        let mut file = File::create(&self.path).map_err(|e| {
            MetricsError::ExportError(format!("Failed to create {}: {e}", self.path.display()))
        })?;
        file.write_all(json.as_bytes())?;
        tracing::debug!(path = %self.path.display(), bytes = json.len(), "Exported run report");
        Ok(())
    }
}
