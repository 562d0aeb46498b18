//! In-memory metric store for one simulation run
//!
//! [`SimulationMetrics`] keeps every counter, gauge and histogram emitted
//! through the `metrics` facade while [`crate::SimulationRecorder`] is
//! installed. Keys are a metric name plus its sorted label set, so lookups
//! do not depend on the order labels were written in.

use hdrhistogram::Histogram as HdrHistogram;
use serde::Serialize;
use std::collections::BTreeMap;

/// Histograms store values in thousandths of a unit
const HISTOGRAM_SCALE: f64 = 1000.0;
const HISTOGRAM_SIGFIG: u8 = 3;

type Labels = BTreeMap<String, String>;
type MetricKey = (String, Labels);

fn key(name: &str, labels: &[(&str, &str)]) -> MetricKey {
    (
        name.to_string(),
        labels
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

#[derive(Debug, Clone)]
struct HistogramData {
    hdr: HdrHistogram<u64>,
    count: u64,
    sum: f64,
    min: f64,
    max: f64,
}

impl HistogramData {
    fn new() -> Option<Self> {
        match HdrHistogram::new(HISTOGRAM_SIGFIG) {
            Ok(hdr) => Some(Self {
                hdr,
                count: 0,
                sum: 0.0,
                min: f64::INFINITY,
                max: f64::NEG_INFINITY,
            }),
            Err(e) => {
                tracing::warn!("Failed to create HDR histogram: {}", e);
                None
            }
        }
    }

    fn record(&mut self, value: f64) {
        let scaled = (value.max(0.0) * HISTOGRAM_SCALE).round() as u64;
        if let Err(e) = self.hdr.record(scaled) {
            tracing::warn!("Failed to record value in HDR histogram: {}", e);
            return;
        }
        self.count += 1;
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    fn quantile(&self, q: f64) -> f64 {
        self.hdr.value_at_quantile(q) as f64 / HISTOGRAM_SCALE
    }

    fn stats(&self) -> HistogramStats {
        HistogramStats {
            count: self.count,
            sum: self.sum,
            min: self.min,
            max: self.max,
            mean: if self.count > 0 { self.sum / self.count as f64 } else { 0.0 },
            median: self.quantile(0.5),
            p95: self.quantile(0.95),
            p99: self.quantile(0.99),
        }
    }
}

/// Summary of one recorded histogram
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramStats {
    pub count: u64,
    pub sum: f64,
    pub min: f64,
    pub max: f64,
    /// Exact mean of the recorded values
    pub mean: f64,
    pub median: f64,
    pub p95: f64,
    pub p99: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CounterPoint {
    pub name: String,
    pub labels: Labels,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaugePoint {
    pub name: String,
    pub labels: Labels,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramPoint {
    pub name: String,
    pub labels: Labels,
    pub stats: HistogramStats,
}

/// Point-in-time copy of every metric, sorted by name then labels
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub counters: Vec<CounterPoint>,
    pub gauges: Vec<GaugePoint>,
    pub histograms: Vec<HistogramPoint>,
}

/// Metric store backing [`crate::SimulationRecorder`]
#[derive(Debug, Default)]
pub struct SimulationMetrics {
    counters: BTreeMap<MetricKey, u64>,
    gauges: BTreeMap<MetricKey, f64>,
    histograms: BTreeMap<MetricKey, HistogramData>,
}

impl SimulationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_counter(&mut self, name: &str, value: u64, labels: &[(&str, &str)]) {
        *self.counters.entry(key(name, labels)).or_default() += value;
    }

    pub fn set_counter(&mut self, name: &str, value: u64, labels: &[(&str, &str)]) {
        self.counters.insert(key(name, labels), value);
    }

    pub fn increment_gauge(&mut self, name: &str, delta: f64, labels: &[(&str, &str)]) {
        *self.gauges.entry(key(name, labels)).or_default() += delta;
    }

    pub fn set_gauge(&mut self, name: &str, value: f64, labels: &[(&str, &str)]) {
        self.gauges.insert(key(name, labels), value);
    }

    pub fn record_histogram(&mut self, name: &str, value: f64, labels: &[(&str, &str)]) {
        let key = key(name, labels);
        if !self.histograms.contains_key(&key) {
            let Some(data) = HistogramData::new() else {
                return;
            };
            self.histograms.insert(key.clone(), data);
        }
        if let Some(data) = self.histograms.get_mut(&key) {
            data.record(value);
        }
    }

    pub fn get_counter(&self, name: &str, labels: &[(&str, &str)]) -> Option<u64> {
        self.counters.get(&key(name, labels)).copied()
    }

    /// Sum of a counter over every label set
    pub fn counter_total(&self, name: &str) -> u64 {
        self.counters
            .iter()
            .filter(|((n, _), _)| n == name)
            .map(|(_, v)| *v)
            .sum()
    }

    pub fn get_gauge(&self, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
        self.gauges.get(&key(name, labels)).copied()
    }

    pub fn get_histogram_stats(&self, name: &str, labels: &[(&str, &str)]) -> Option<HistogramStats> {
        self.histograms.get(&key(name, labels)).map(HistogramData::stats)
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty() && self.gauges.is_empty() && self.histograms.is_empty()
    }

    pub fn clear(&mut self) {
        self.counters.clear();
        self.gauges.clear();
        self.histograms.clear();
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            counters: self
                .counters
                .iter()
                .map(|((name, labels), value)| CounterPoint {
                    name: name.clone(),
                    labels: labels.clone(),
                    value: *value,
                })
                .collect(),
            gauges: self
                .gauges
                .iter()
                .map(|((name, labels), value)| GaugePoint {
                    name: name.clone(),
                    labels: labels.clone(),
                    value: *value,
                })
                .collect(),
            histograms: self
                .histograms
                .iter()
                .map(|((name, labels), data)| HistogramPoint {
                    name: name.clone(),
                    labels: labels.clone(),
                    stats: data.stats(),
                })
                .collect(),
        }
    }
}
