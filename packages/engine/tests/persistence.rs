use std::io::Cursor;
use std::thread;
use std::time::{Duration, Instant};

use rivulet_engine::simulation::{FORMAT_VERSION, MAGIC};
use rivulet_engine::{
    CellType, Grid, Lattice, SimError, SimParams, Simulation, SimulationSettings, Snapshot,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn fast_settings() -> SimulationSettings {
    SimulationSettings { batch_budget_ms: 0.0, pause_poll_ms: 1, ..SimulationSettings::default() }
}

fn stepped(steps: u64) -> Simulation {
    let sim = Simulation::new(1.5, 1.0, 24, 16, fast_settings()).unwrap();
    sim.steps(steps).unwrap();
    let start = Instant::now();
    while sim.timestep() < steps && start.elapsed() < Duration::from_secs(10) {
        thread::sleep(Duration::from_millis(1));
    }
    assert_eq!(sim.timestep(), steps);
    sim
}

#[test]
fn save_starts_with_magic_and_version() {
    init_logging();
    let sim = stepped(0);
    let text = sim.save_to_string().unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some(MAGIC));
    assert_eq!(lines.next(), Some(FORMAT_VERSION));
}

#[test]
fn load_reproduces_saved_state() {
    init_logging();
    let original = stepped(4);
    let text = original.save_to_string().unwrap();

    let fresh = Simulation::new(1.0, 1.0, 8, 8, fast_settings()).unwrap();
    fresh.load_from_str(&text).unwrap();
    assert_eq!(fresh.timestep(), 4);
    assert_eq!(fresh.grid_width(), 24);
    assert_eq!(fresh.grid_height(), 16);
    assert_eq!(fresh.width(), 1.5);
    assert_eq!(fresh.density_grid().unwrap(), original.density_grid().unwrap());
    assert_eq!(fresh.velocity_grid().unwrap(), original.velocity_grid().unwrap());
    assert_eq!(fresh.save_to_string().unwrap(), text);
}

#[test]
fn from_saved_and_reader_writer_helpers() {
    init_logging();
    let original = stepped(2);
    let mut buffer = Vec::new();
    original.save(&mut buffer).unwrap();

    let resumed = Simulation::from_saved(
        std::str::from_utf8(&buffer).unwrap(),
        SimulationSettings::default(),
    )
    .unwrap();
    assert_eq!(resumed.timestep(), 2);
    assert_eq!(resumed.type_grid().unwrap(), original.type_grid().unwrap());

    let other = Simulation::new(1.0, 1.0, 8, 8, fast_settings()).unwrap();
    other.load(Cursor::new(buffer)).unwrap();
    assert_eq!(other.density_grid().unwrap(), original.density_grid().unwrap());
}

#[test]
fn exact_float_bits_survive_the_text_format() {
    init_logging();
    let mut src = Lattice::new(5, 4).unwrap().src().clone();
    src[(1, 1)].f[0] = -0.0;
    src[(2, 1)].f[3] = f32::MIN_POSITIVE / 8.0;
    src[(3, 2)].f[8] = 1.0 / 3.0;
    src[(2, 2)].kind = CellType::Obstacle;
    let dest = src.clone();
    let snapshot = Snapshot {
        params: SimParams {
            width: 0.5,
            height: 0.4,
            grid_width: 5,
            grid_height: 4,
            kinematic_viscosity: 0.001,
            density: 998.2,
            speed: 0.25,
        },
        timestep: 17,
        lattice: Lattice::from_buffers(src, dest).unwrap(),
    };
    let text = snapshot.to_text();

    let sim = Simulation::new(1.0, 1.0, 8, 8, fast_settings()).unwrap();
    sim.load_from_str(&text).unwrap();
    let saved = sim.save_to_string().unwrap();
    assert_eq!(saved, text);

    let back = Snapshot::from_text(&saved).unwrap();
    let cell = &back.lattice.src()[(1, 1)];
    assert!(cell.f[0] == 0.0 && cell.f[0].is_sign_negative());
    assert_eq!(
        back.lattice.src()[(2, 1)].f[3].to_bits(),
        (f32::MIN_POSITIVE / 8.0).to_bits()
    );
    assert_eq!(back.params.density, 998.2);
}

#[test]
fn version_mismatch_fails_loudly_and_keeps_state() {
    init_logging();
    let sim = stepped(1);
    let before = sim.save_to_string().unwrap();
    let future = before.replacen(&format!("\n{}\n", FORMAT_VERSION), "\n99\n", 1);

    match sim.load_from_str(&future) {
        Err(SimError::VersionMismatch { found, expected }) => {
            assert_eq!(found, "99");
            assert_eq!(expected, FORMAT_VERSION);
        }
        other => panic!("expected a version mismatch, got {:?}", other),
    }
    assert_eq!(sim.save_to_string().unwrap(), before);
}

#[test]
fn foreign_files_are_rejected() {
    init_logging();
    let sim = stepped(0);
    assert!(matches!(sim.load_from_str("P5\n10 10\n255\n"), Err(SimError::BadMagic(_))));
    let truncated = format!("{}\n{}\n1.0\n", MAGIC, FORMAT_VERSION);
    assert!(matches!(sim.load_from_str(&truncated), Err(SimError::Format(_))));
    assert!(matches!(
        Simulation::from_saved("", SimulationSettings::default()),
        Err(SimError::BadMagic(_))
    ));
    let grid: Grid<f32> = Grid::new(2, 2);
    assert!(matches!(sim.load_from_str(&grid.to_text()), Err(SimError::BadMagic(_))));
}
