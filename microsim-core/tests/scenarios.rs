//! End-to-end runs of the microservice models: a single app server, an
//! overloaded app server, and an app server chained to a database.

use microsim_core::{
    Dist, GeneratorSpec, ResourceSpec, Simulation, SimulationConfig, StepSpec, TrajectorySpec,
};

fn app_only(arrival_mean: f64, arrival_sd: f64, seed: u64) -> SimulationConfig {
    SimulationConfig::new(seed)
        .resource(ResourceSpec::new("app", 1, Some(20)))
        .trajectory(TrajectorySpec::new(
            "request",
            vec![
                StepSpec::seize("app"),
                StepSpec::timeout(Dist::normal(10.0, 1.0)),
                StepSpec::release("app"),
            ],
        ))
        .generator(GeneratorSpec::new(
            "request",
            "request",
            Dist::normal(arrival_mean, arrival_sd),
        ))
}

#[test]
fn balanced_load_keeps_up() {
    let mut sim = Simulation::new(app_only(10.0, 2.0, 1)).unwrap();
    sim.run(4000.0).unwrap();

    let generated = sim.generators()[0].generated();
    assert!((370..=420).contains(&generated), "generated {generated}");

    let monitor = sim.monitor();
    assert_eq!(monitor.arrivals().len() + sim.in_system(), generated as usize);
    assert_eq!(monitor.rejected().count(), 0);

    // the queue never comes close to its bound
    let max_queue = monitor.occupancy_of("app").map(|s| s.queue).max().unwrap();
    assert!(max_queue < 20, "max queue {max_queue}");

    let completed = monitor.completed().count();
    assert!((370..=420).contains(&completed), "completed {completed}");
    assert_eq!(monitor.end_time(), 4000.0);
}

#[test]
fn overload_saturates_queue_and_rejects() {
    let mut sim = Simulation::new(app_only(5.0, 1.0, 1)).unwrap();
    sim.run(4000.0).unwrap();

    let monitor = sim.monitor();
    let max_queue = monitor.occupancy_of("app").map(|s| s.queue).max().unwrap();
    assert_eq!(max_queue, 20);

    // about 800 arrivals against a service capacity of about 400
    let rejected = monitor.rejected().count();
    assert!(rejected > 250, "rejected {rejected}");

    // the queue grows before the first rejection
    let first_rejection = monitor
        .rejected()
        .map(|a| a.start_time)
        .fold(f64::INFINITY, f64::min);
    let early_queue = monitor
        .occupancy_of("app")
        .filter(|s| s.time < first_rejection)
        .map(|s| s.queue)
        .max()
        .unwrap();
    assert_eq!(early_queue, 20);
}

#[test]
fn chained_database_adds_both_holds() {
    let config = SimulationConfig::new(5)
        .resource(ResourceSpec::new("app", 1, Some(20)))
        .resource(ResourceSpec::new("database", 1, Some(20)))
        .trajectory(TrajectorySpec::new(
            "request",
            vec![
                StepSpec::seize("app"),
                StepSpec::timeout(Dist::normal(5.0, 1.0)),
                StepSpec::release("app"),
                StepSpec::seize("database"),
                StepSpec::timeout(Dist::normal(4.0, 1.0)),
                StepSpec::release("database"),
            ],
        ))
        .generator(GeneratorSpec::new("request", "request", Dist::normal(10.0, 2.0)));
    let mut sim = Simulation::new(config).unwrap();
    sim.run(2000.0).unwrap();

    let monitor = sim.monitor();
    assert!(monitor.completed().count() > 150);
    for arrival in monitor.completed() {
        let app = monitor
            .usage()
            .iter()
            .find(|u| u.entity == arrival.entity && u.resource == "app")
            .unwrap();
        let db = monitor
            .usage()
            .iter()
            .find(|u| u.entity == arrival.entity && u.resource == "database")
            .unwrap();

        // the app is released at the instant the database seize is requested
        assert_eq!(app.released_at, Some(db.requested_at));
        assert_eq!(db.released_at, Some(arrival.end_time));

        let app_hold = app.released_at.unwrap() - app.granted_at.unwrap();
        let db_hold = db.released_at.unwrap() - db.granted_at.unwrap();
        let queueing = app.queueing_time().unwrap() + db.queueing_time().unwrap();
        assert!((arrival.flow_time() - (app_hold + db_hold + queueing)).abs() < 1e-6);
        assert!((arrival.activity_time - (app_hold + db_hold)).abs() < 1e-6);
    }
}

#[test]
fn zero_horizon_runs_nothing() {
    let mut sim = Simulation::new(app_only(10.0, 2.0, 1)).unwrap();
    assert_eq!(sim.run(0.0).unwrap(), 0);
    assert_eq!(sim.events_processed(), 0);
    assert!(sim.finish().is_empty());
}
