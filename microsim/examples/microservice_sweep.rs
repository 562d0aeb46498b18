//! Sweep the arrival rate of the app-only microservice and print how the
//! server saturates, then export the most loaded run.
//!
//! Usage: cargo run --example microservice_sweep [output_dir]

use microsim::metrics::{export_csv, export_json};
use microsim::prelude::*;
use microsim::{arrival_means, sweep};
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    microsim::core::init_simulation_logging();

    // mean gaps 4, 5, ... 33 against a service time of 10
    let params = arrival_means(&MicroserviceParams::app_only(), 4.0, 1.0, 30);
    let points = sweep(params, 1)?;

    println!("gap  arrivals  rejected  util   mean_queue  p95_flow");
    for point in &points {
        let request = point.summary.generator("request");
        let app = point.summary.resource("app");
        if let (Some(request), Some(app), Dist::Normal { mean, .. }) =
            (request, app, &point.params.arrival)
        {
            println!(
                "{:>3}  {:>8}  {:>8}  {:>5.3}  {:>10.2}  {:>8.1}",
                mean,
                request.arrivals,
                request.rejected,
                app.utilization,
                app.mean_queue,
                request.flow_time.p95
            );
        }
    }

    if let Some(dir) = std::env::args().nth(1).map(PathBuf::from) {
        std::fs::create_dir_all(&dir)?;
        let report = MicroserviceParams::overloaded().to_scenario().run()?;
        export_json(&report, dir.join("overloaded.json"), true)?;
        export_csv(&report, dir.join("overloaded.csv"))?;

        let series = OccupancySeries::from_monitor(&report.monitor, "app", 100.0, 0.2)?;
        std::fs::write(dir.join("overloaded_queue.json"), serde_json::to_string_pretty(&series)?)?;
        println!("wrote {}", dir.display());
    }
    Ok(())
}
