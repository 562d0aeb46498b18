//! Run summaries computed from the monitor logs
//!
//! A [`RunSummary`] condenses one run into per-generator and per-resource
//! figures: counts, rejection rate, throughput, flow and waiting time
//! distributions, and time-weighted utilization. It is computed from the
//! [`Monitor`] alone, so it can be rebuilt from a saved log.

use hdrhistogram::Histogram as HdrHistogram;
use microsim_core::{ArrivalRecord, Monitor};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::MetricsError;
use crate::simulation_metrics::MetricsSnapshot;
use crate::time_series::time_weighted_mean;

const SCALE: f64 = 1000.0;

/// Distribution of a set of durations
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Stats {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
}

impl Stats {
    /// Mean, min and max are exact; percentiles come from an HDR histogram
    /// with three significant digits. An empty input gives all zeros.
    pub fn from_values(values: &[f64]) -> Result<Self, MetricsError> {
        if values.is_empty() {
            return Ok(Self::default());
        }
        let mut hdr = HdrHistogram::<u64>::new(3)
            .map_err(|e| MetricsError::Histogram(e.to_string()))?;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &v in values {
            hdr.record((v.max(0.0) * SCALE).round() as u64)
                .map_err(|e| MetricsError::Histogram(e.to_string()))?;
            sum += v;
            min = min.min(v);
            max = max.max(v);
        }
        let q = |q: f64| hdr.value_at_quantile(q) as f64 / SCALE;
        Ok(Self {
            count: values.len(),
            mean: sum / values.len() as f64,
            min,
            max,
            p50: q(0.5),
            p95: q(0.95),
            p99: q(0.99),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratorSummary {
    pub generator: String,
    /// Entities that left the system, finished or rejected
    pub arrivals: usize,
    pub completed: usize,
    pub rejected: usize,
    pub rejection_rate: f64,
    /// Completions per time unit
    pub throughput: f64,
    pub flow_time: Stats,
    pub waiting_time: Stats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceSummary {
    pub resource: String,
    pub capacity: u32,
    pub queue_size: Option<u32>,
    /// Time-weighted share of capacity in service
    pub utilization: f64,
    pub mean_in_service: f64,
    pub mean_queue: f64,
    pub max_in_service: u32,
    pub max_queue: u32,
    /// Closed seize attempts, granted or rejected
    pub seizes: usize,
    pub rejections: usize,
    pub mean_queueing_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub end_time: f64,
    pub arrivals: usize,
    pub completed: usize,
    pub rejected: usize,
    /// Sorted by generator name
    pub generators: Vec<GeneratorSummary>,
    /// In declaration order
    pub resources: Vec<ResourceSummary>,
}

impl RunSummary {
    pub fn from_monitor(monitor: &Monitor) -> Result<Self, MetricsError> {
        let end_time = monitor.end_time();

        let mut by_generator: BTreeMap<&str, Vec<&ArrivalRecord>> = BTreeMap::new();
        for arrival in monitor.arrivals() {
            by_generator
                .entry(arrival.generator.as_str())
                .or_default()
                .push(arrival);
        }
        let generators = by_generator
            .into_iter()
            .map(|(name, arrivals)| generator_summary(name, &arrivals, end_time))
            .collect::<Result<Vec<_>, _>>()?;

        let resources = monitor
            .resources()
            .iter()
            .map(|info| {
                let samples: Vec<_> = monitor.occupancy_of(&info.name).collect();
                let server: Vec<(f64, f64)> =
                    samples.iter().map(|s| (s.time, s.server as f64)).collect();
                let queue: Vec<(f64, f64)> =
                    samples.iter().map(|s| (s.time, s.queue as f64)).collect();
                let usage: Vec<_> = monitor
                    .usage()
                    .iter()
                    .filter(|u| u.resource == info.name)
                    .collect();
                let waits: Vec<f64> = usage.iter().filter_map(|u| u.queueing_time()).collect();
                let mean_in_service = time_weighted_mean(&server, end_time);

                ResourceSummary {
                    resource: info.name.clone(),
                    capacity: info.capacity,
                    queue_size: info.queue_size,
                    utilization: mean_in_service / info.capacity as f64,
                    mean_in_service,
                    mean_queue: time_weighted_mean(&queue, end_time),
                    max_in_service: samples.iter().map(|s| s.server).max().unwrap_or(0),
                    max_queue: samples.iter().map(|s| s.queue).max().unwrap_or(0),
                    seizes: usage.len(),
                    rejections: usage.iter().filter(|u| u.granted_at.is_none()).count(),
                    mean_queueing_time: mean(&waits),
                }
            })
            .collect();

        Ok(Self {
            end_time,
            arrivals: monitor.arrivals().len(),
            completed: monitor.completed().count(),
            rejected: monitor.rejected().count(),
            generators,
            resources,
        })
    }

    pub fn generator(&self, name: &str) -> Option<&GeneratorSummary> {
        self.generators.iter().find(|g| g.generator == name)
    }

    pub fn resource(&self, name: &str) -> Option<&ResourceSummary> {
        self.resources.iter().find(|r| r.resource == name)
    }
}

fn generator_summary(
    name: &str,
    arrivals: &[&ArrivalRecord],
    end_time: f64,
) -> Result<GeneratorSummary, MetricsError> {
    let completed: Vec<&&ArrivalRecord> = arrivals.iter().filter(|a| a.finished).collect();
    let flow: Vec<f64> = completed.iter().map(|a| a.flow_time()).collect();
    let waiting: Vec<f64> = completed.iter().map(|a| a.waiting_time()).collect();
    let rejected = arrivals.len() - completed.len();

    Ok(GeneratorSummary {
        generator: name.to_string(),
        arrivals: arrivals.len(),
        completed: completed.len(),
        rejected,
        rejection_rate: rejected as f64 / arrivals.len() as f64,
        throughput: if end_time > 0.0 {
            completed.len() as f64 / end_time
        } else {
            0.0
        },
        flow_time: Stats::from_values(&flow)?,
        waiting_time: Stats::from_values(&waiting)?,
    })
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Everything a run produced, in one serializable value
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub summary: RunSummary,
    pub monitor: Monitor,
    /// Metrics captured by the recorder, when one was installed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<MetricsSnapshot>,
}

impl RunReport {
    pub fn new(monitor: Monitor, metrics: Option<MetricsSnapshot>) -> Result<Self, MetricsError> {
        Ok(Self {
            summary: RunSummary::from_monitor(&monitor)?,
            monitor,
            metrics,
        })
    }
}
