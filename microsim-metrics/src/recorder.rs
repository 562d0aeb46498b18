//! A `metrics::Recorder` implementation backed by `SimulationMetrics`.
//!
//! The engine in `microsim-core` emits standard `metrics` counters, gauges
//! and histograms. Installing this recorder collects them into an in-memory
//! `SimulationMetrics` instance for the duration of a closure.
//!
//! Prefer the *local* recorder so that runs on different threads do not share
//! global state:
//!
//! ```rust,no_run
//! # use std::sync::{Arc, Mutex};
//! # use microsim_metrics::{SimulationMetrics, with_simulation_metrics_recorder};
//! let metrics = Arc::new(Mutex::new(SimulationMetrics::new()));
//! with_simulation_metrics_recorder(&metrics, || {
//!     metrics::counter!("microsim_entities_generated_total", "generator" => "request").increment(1);
//! });
//! assert_eq!(
//!     metrics
//!         .lock()
//!         .unwrap()
//!         .get_counter("microsim_entities_generated_total", &[("generator", "request")]),
//!     Some(1)
//! );
//! ```

use crate::simulation_metrics::SimulationMetrics;
use metrics::{Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit};
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Clone)]
pub struct SimulationRecorder {
    metrics: Arc<Mutex<SimulationMetrics>>,
}

impl SimulationRecorder {
    pub fn new(metrics: Arc<Mutex<SimulationMetrics>>) -> Self {
        Self { metrics }
    }
}

/// Run `f` with a recorder that writes into `metrics` installed on this thread
pub fn with_simulation_metrics_recorder<T>(
    metrics: &Arc<Mutex<SimulationMetrics>>,
    f: impl FnOnce() -> T,
) -> T {
    let recorder = SimulationRecorder::new(metrics.clone());
    metrics::with_local_recorder(&recorder, f)
}

/// Name and labels of one registered metric
struct Handle {
    metrics: Arc<Mutex<SimulationMetrics>>,
    name: String,
    labels: Vec<(String, String)>,
}

impl Handle {
    fn new(metrics: &Arc<Mutex<SimulationMetrics>>, key: &Key) -> Self {
        let name = key.name().to_string();
        let labels = key
            .labels()
            .map(|l| (l.key().to_string(), l.value().to_string()))
            .collect::<Vec<_>>();
        Self {
            metrics: metrics.clone(),
            name,
            labels,
        }
    }

    // the maps stay valid if another holder panicked
    fn with(&self, f: impl FnOnce(&mut SimulationMetrics, &str, &[(&str, &str)])) {
        let labels: Vec<(&str, &str)> = self
            .labels
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let mut guard = self.metrics.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut *guard, &self.name, &labels);
    }
}

impl metrics::CounterFn for Handle {
    fn increment(&self, value: u64) {
        self.with(|m, name, labels| m.increment_counter(name, value, labels));
    }

    fn absolute(&self, value: u64) {
        self.with(|m, name, labels| m.set_counter(name, value, labels));
    }
}

impl metrics::GaugeFn for Handle {
    fn increment(&self, value: f64) {
        self.with(|m, name, labels| m.increment_gauge(name, value, labels));
    }

    fn decrement(&self, value: f64) {
        self.with(|m, name, labels| m.increment_gauge(name, -value, labels));
    }

    fn set(&self, value: f64) {
        self.with(|m, name, labels| m.set_gauge(name, value, labels));
    }
}

impl metrics::HistogramFn for Handle {
    fn record(&self, value: f64) {
        self.with(|m, name, labels| m.record_histogram(name, value, labels));
    }
}

impl Recorder for SimulationRecorder {
    fn describe_counter(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn describe_gauge(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn describe_histogram(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn register_counter(&self, key: &Key, _metadata: &Metadata<'_>) -> Counter {
        Counter::from_arc(Arc::new(Handle::new(&self.metrics, key)))
    }

    fn register_gauge(&self, key: &Key, _metadata: &Metadata<'_>) -> Gauge {
        Gauge::from_arc(Arc::new(Handle::new(&self.metrics, key)))
    }

    fn register_histogram(&self, key: &Key, _metadata: &Metadata<'_>) -> Histogram {
        Histogram::from_arc(Arc::new(Handle::new(&self.metrics, key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorder_captures_metrics_macros() {
        let metrics = Arc::new(Mutex::new(SimulationMetrics::new()));

        with_simulation_metrics_recorder(&metrics, || {
            metrics::counter!("microsim_entities_rejected_total", "generator" => "request", "resource" => "app")
                .increment(2);
            metrics::gauge!("microsim_resource_queue_length", "resource" => "app").set(7.0);
            metrics::gauge!("microsim_resource_queue_length", "resource" => "app").decrement(2.0);
            metrics::histogram!("microsim_flow_time", "generator" => "request").record(12.5);
        });

        let locked = metrics.lock().unwrap();
        assert_eq!(
            locked.get_counter(
                "microsim_entities_rejected_total",
                &[("resource", "app"), ("generator", "request")]
            ),
            Some(2)
        );
        assert_eq!(
            locked.get_gauge("microsim_resource_queue_length", &[("resource", "app")]),
            Some(5.0)
        );

        let hist = locked
            .get_histogram_stats("microsim_flow_time", &[("generator", "request")])
            .unwrap();
        assert_eq!(hist.count, 1);
        assert_eq!(hist.max, 12.5);
    }

    #[test]
    fn nothing_recorded_outside_the_closure() {
        let metrics = Arc::new(Mutex::new(SimulationMetrics::new()));
        with_simulation_metrics_recorder(&metrics, || {});
        metrics::counter!("microsim_entities_generated_total").increment(1);
        assert!(metrics.lock().unwrap().is_empty());
    }
}
