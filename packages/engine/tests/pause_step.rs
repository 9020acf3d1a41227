use std::thread;
use std::time::{Duration, Instant};

use rivulet_engine::{Simulation, SimulationSettings};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn settings() -> SimulationSettings {
    SimulationSettings { batch_budget_ms: 0.5, pause_poll_ms: 1, ..SimulationSettings::default() }
}

fn wait_for_timestep(sim: &Simulation, target: u64) -> bool {
    let start = Instant::now();
    while start.elapsed() < Duration::from_secs(10) {
        if sim.timestep() >= target {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    false
}

#[test]
fn new_engine_stays_paused() {
    init_logging();
    let sim = Simulation::new(1.0, 1.0, 12, 12, settings()).unwrap();
    thread::sleep(Duration::from_millis(30));
    assert_eq!(sim.timestep(), 0);
}

#[test]
fn steps_while_paused_advance_exactly() {
    init_logging();
    let sim = Simulation::new(1.0, 1.0, 12, 12, settings()).unwrap();
    sim.steps(5).unwrap();
    assert!(wait_for_timestep(&sim, 5));
    thread::sleep(Duration::from_millis(30));
    assert_eq!(sim.timestep(), 5);

    sim.steps(2).unwrap();
    assert!(wait_for_timestep(&sim, 7));
    thread::sleep(Duration::from_millis(30));
    assert_eq!(sim.timestep(), 7);
}

#[test]
fn pause_stops_a_running_engine() {
    init_logging();
    let sim = Simulation::new(1.0, 1.0, 12, 12, settings()).unwrap();
    sim.run().unwrap();
    assert!(wait_for_timestep(&sim, 3));
    sim.pause().unwrap();
    // Queued behind the pause, so answered once it has taken effect.
    sim.type_grid().unwrap();
    let frozen = sim.timestep();
    thread::sleep(Duration::from_millis(30));
    assert_eq!(sim.timestep(), frozen);
}

#[test]
fn dropping_a_running_engine_joins_its_thread() {
    init_logging();
    let sim = Simulation::new(1.0, 1.0, 12, 12, settings()).unwrap();
    sim.run().unwrap();
    assert!(wait_for_timestep(&sim, 1));
    drop(sim);
}
