//! Windowed occupancy series for one resource
//!
//! Occupancy samples describe a step function: each sample holds until the
//! next one. [`OccupancySeries`] averages that function over fixed windows of
//! simulated time and smooths the queue length with an exponential moving
//! average, which is what queue-growth plots of overloaded runs are drawn from.

use microsim_core::Monitor;
use serde::Serialize;

use crate::error::MetricsError;

/// Exponential moving average calculator
#[derive(Debug, Clone)]
pub struct ExponentialMovingAverage {
    alpha: f64,
    current_value: Option<f64>,
}

impl ExponentialMovingAverage {
    /// Create a new EMA with the given smoothing factor (0 < alpha <= 1).
    /// Lower alpha = more smoothing.
    pub fn new(alpha: f64) -> Result<Self, MetricsError> {
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(MetricsError::InvalidMetric(format!(
                "EMA alpha must be in (0, 1], got {alpha}"
            )));
        }
        Ok(Self {
            alpha,
            current_value: None,
        })
    }

    /// Update the EMA with a new value
    pub fn update(&mut self, value: f64) -> f64 {
        let next = match self.current_value {
            None => value,
            Some(current) => self.alpha * value + (1.0 - self.alpha) * current,
        };
        self.current_value = Some(next);
        next
    }

    pub fn value(&self) -> Option<f64> {
        self.current_value
    }
}

/// Value of a series over the window starting at `time`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesPoint {
    pub time: f64,
    pub value: f64,
}

/// Time-weighted averages of one resource's occupancy, per window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OccupancySeries {
    pub resource: String,
    pub window: f64,
    pub in_service: Vec<TimeSeriesPoint>,
    pub queue: Vec<TimeSeriesPoint>,
    /// `queue` after EMA smoothing
    pub smoothed_queue: Vec<TimeSeriesPoint>,
}

impl OccupancySeries {
    /// Build the series for `resource` over `[0, monitor.end_time()]`
    pub fn from_monitor(
        monitor: &Monitor,
        resource: &str,
        window: f64,
        alpha: f64,
    ) -> Result<Self, MetricsError> {
        if !(window.is_finite() && window > 0.0) {
            return Err(MetricsError::InvalidMetric(format!(
                "window must be a positive number, got {window}"
            )));
        }
        if !monitor.resources().iter().any(|r| r.name == resource) {
            return Err(MetricsError::InvalidMetric(format!(
                "unknown resource '{resource}'"
            )));
        }
        let mut ema = ExponentialMovingAverage::new(alpha)?;

        let end = monitor.end_time();
        let server: Vec<(f64, f64)> = monitor
            .occupancy_of(resource)
            .map(|s| (s.time, s.server as f64))
            .collect();
        let queue: Vec<(f64, f64)> = monitor
            .occupancy_of(resource)
            .map(|s| (s.time, s.queue as f64))
            .collect();

        let queue = window_averages(&queue, end, window);
        let smoothed_queue = queue
            .iter()
            .map(|p| TimeSeriesPoint {
                time: p.time,
                value: ema.update(p.value),
            })
            .collect();

        Ok(Self {
            resource: resource.to_string(),
            window,
            in_service: window_averages(&server, end, window),
            queue,
            smoothed_queue,
        })
    }
}

/// Average of a step function over `[0, end]`. The function is zero until
/// the first change.
pub(crate) fn time_weighted_mean(changes: &[(f64, f64)], end: f64) -> f64 {
    if end <= 0.0 {
        return 0.0;
    }
    window_averages(changes, end, end)
        .first()
        .map_or(0.0, |p| p.value)
}

fn window_averages(changes: &[(f64, f64)], end: f64, window: f64) -> Vec<TimeSeriesPoint> {
    let mut points = Vec::new();
    let mut value = 0.0;
    let mut next = 0;
    let mut k = 0u64;
    loop {
        let start = k as f64 * window;
        if start >= end {
            break;
        }
        let stop = (start + window).min(end);
        let mut area = 0.0;
        let mut t = start;
        while next < changes.len() && changes[next].0 <= stop {
            let (at, v) = changes[next];
            if at > t {
                area += value * (at - t);
                t = at;
            }
            value = v;
            next += 1;
        }
        area += value * (stop - t);
        points.push(TimeSeriesPoint {
            time: start,
            value: area / (stop - start),
        });
        k += 1;
    }
    points
}
