//! Parameter sweeps over independent runs
//!
//! Each point of a sweep is its own [`Simulation`](microsim_core::Simulation)
//! with its own seed, so points run in parallel on the rayon pool and the
//! results do not depend on scheduling. Results come back in input order.

use microsim_core::Dist;
use microsim_metrics::RunSummary;
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::error::ScenarioError;
use crate::microservice::MicroserviceParams;
use crate::scenario::Scenario;

/// One finished point of a sweep
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepPoint<P> {
    pub index: usize,
    pub params: P,
    pub summary: RunSummary,
}

/// Run every scenario, in parallel when `parallel` is set.
/// The first failure is returned.
pub fn run_scenarios(
    scenarios: Vec<Scenario>,
    parallel: bool,
) -> Result<Vec<RunSummary>, ScenarioError> {
    let run = |scenario: Scenario| scenario.run().map(|report| report.summary);
    if parallel && scenarios.len() > 1 {
        scenarios.into_par_iter().map(run).collect()
    } else {
        scenarios.into_iter().map(run).collect()
    }
}

/// Run the microservice model once per parameter set. Point `i` is seeded
/// with `base_seed + i`, overriding the seed in its parameters.
pub fn sweep(
    params: Vec<MicroserviceParams>,
    base_seed: u64,
) -> Result<Vec<SweepPoint<MicroserviceParams>>, ScenarioError> {
    let params: Vec<MicroserviceParams> = params
        .into_iter()
        .enumerate()
        .map(|(i, p)| p.seed(base_seed.wrapping_add(i as u64)))
        .collect();
    debug!(points = params.len(), base_seed, "Starting sweep");

    let summaries = run_scenarios(params.iter().map(|p| p.to_scenario()).collect(), true)?;
    Ok(params
        .into_iter()
        .zip(summaries)
        .enumerate()
        .map(|(index, (params, summary))| SweepPoint {
            index,
            params,
            summary,
        })
        .collect())
}

/// Arrival streams with mean gaps `from, from + step, ...` (`count` of them)
/// and a standard deviation of a fifth of the mean, over `base`
pub fn arrival_means(
    base: &MicroserviceParams,
    from: f64,
    step: f64,
    count: usize,
) -> Vec<MicroserviceParams> {
    (0..count)
        .map(|i| {
            let mean = from + step * i as f64;
            base.clone().arrival(Dist::normal(mean, mean / 5.0))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::microservice::APP;

    #[test]
    fn test_seeds_follow_index() {
        let points = sweep(vec![MicroserviceParams::app_only().until(200.0); 4], 100).unwrap();
        let seeds: Vec<u64> = points.iter().map(|p| p.params.seed).collect();
        assert_eq!(seeds, vec![100, 101, 102, 103]);
        assert!(points.iter().enumerate().all(|(i, p)| p.index == i));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let scenarios: Vec<Scenario> = (0..6)
            .map(|seed| MicroserviceParams::with_database().seed(seed).until(500.0).to_scenario())
            .collect();
        let parallel = run_scenarios(scenarios.clone(), true).unwrap();
        let sequential = run_scenarios(scenarios, false).unwrap();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_slower_arrivals_mean_fewer_rejections() {
        let params = arrival_means(&MicroserviceParams::app_only().until(2000.0), 4.0, 4.0, 3);
        let points = sweep(params, 7).unwrap();
        let rates: Vec<f64> = points
            .iter()
            .map(|p| p.summary.generator("request").unwrap().rejection_rate)
            .collect();
        // mean gaps 4, 8, 12 against a service time of 10
        assert!(rates[0] > 0.4, "rates {rates:?}");
        assert!(rates[2] < 0.01, "rates {rates:?}");
        let app = &points[2].summary.resource(APP).unwrap();
        assert!(app.utilization < 0.95);
    }

    #[test]
    fn test_error_is_returned() {
        let bad = MicroserviceParams::app_only().until(-5.0);
        assert!(matches!(
            sweep(vec![MicroserviceParams::app_only().until(10.0), bad], 0),
            Err(ScenarioError::InvalidHorizon(_))
        ));
    }
}
