//! Thread-owning handle around [`SimulationCore`].
//!
//! The engine thread owns the core outright. Callers push boxed jobs onto a
//! mutex-guarded FIFO; the thread drains the whole queue between
//! macro-steps, so every job sees a lattice that is not mid-iteration.
//! Scalar state (parameters and timestep) is republished on each drain and
//! can be read without waiting on the engine.

use std::collections::VecDeque;
use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::core::error::{Result, SimError};
use crate::core::grid::Grid;
use crate::core::vec2::Vec2;
use crate::domain::{CellType, SharedMask};

use super::init::{bitmap_obstacles, grid_for_height, grid_for_total_points, grid_for_width, METERS_PER_PIXEL};
use super::perf_stats::PerfStats;
use super::persist::{self, Snapshot};
use super::request::{Action, Command, DrawData, Payload, Query, Reply};
use super::settings::SimulationSettings;
use super::{PerfTimer, SimParams, SimulationCore};

type Job = Box<dyn FnOnce(&mut SimulationCore) + Send + 'static>;

struct Inbox {
    jobs: VecDeque<Job>,
    params: SimParams,
    timestep: u64,
    /// Cleared when the engine thread exits; no job is accepted afterwards.
    open: bool,
}

struct Shared {
    inbox: Mutex<Inbox>,
    terminate: AtomicBool,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inbox> {
        self.inbox.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Reply that the engine fills in at its next queue drain.
pub struct Pending<T> {
    rx: mpsc::Receiver<T>,
}

impl<T> Pending<T> {
    fn ready(value: T) -> Self {
        let (tx, rx) = mpsc::channel();
        let _ = tx.send(value);
        Pending { rx }
    }

    /// Blocks until the engine has answered.
    pub fn wait(self) -> Result<T> {
        self.rx.recv().map_err(|_| SimError::EngineStopped)
    }
}

/// Handle to a running engine. Dropping it stops and joins the engine
/// thread.
///
/// ```no_run
/// use rivulet_engine::{Simulation, SimulationSettings};
///
/// let sim = Simulation::new(2.0, 1.0, 80, 40, SimulationSettings::default())?;
/// sim.run()?;
/// let velocities = sim.velocity_grid()?;
/// assert_eq!(velocities.width(), 80);
/// # Ok::<(), rivulet_engine::SimError>(())
/// ```
pub struct Simulation {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl Simulation {
    /// Physical size `width x height` (meters) on a `grid_width x grid_height`
    /// lattice.
    pub fn new(
        width: f64,
        height: f64,
        grid_width: usize,
        grid_height: usize,
        settings: SimulationSettings,
    ) -> Result<Self> {
        let params = params_from(width, height, grid_width, grid_height, &settings);
        Self::spawn(SimulationCore::new(params, settings)?)
    }

    /// Resolution chosen to hold about `total_points` cells.
    pub fn from_total_points(
        width: f64,
        height: f64,
        total_points: usize,
        settings: SimulationSettings,
    ) -> Result<Self> {
        let (gw, gh) = grid_for_total_points(width, height, total_points)?;
        Self::new(width, height, gw, gh, settings)
    }

    pub fn from_grid_width(
        width: f64,
        height: f64,
        grid_width: usize,
        settings: SimulationSettings,
    ) -> Result<Self> {
        let (gw, gh) = grid_for_width(width, height, grid_width)?;
        Self::new(width, height, gw, gh, settings)
    }

    pub fn from_grid_height(
        width: f64,
        height: f64,
        grid_height: usize,
        settings: SimulationSettings,
    ) -> Result<Self> {
        let (gw, gh) = grid_for_height(width, height, grid_height)?;
        Self::new(width, height, gw, gh, settings)
    }

    /// Obstacle geometry from a single-channel bitmap, one cell per pixel.
    /// The geometry is re-applied by every `clear`.
    pub fn from_obstacle_bitmap(
        pixels: &[u8],
        pixel_width: usize,
        pixel_height: usize,
        settings: SimulationSettings,
    ) -> Result<Self> {
        let obstacles = bitmap_obstacles(pixels, pixel_width, pixel_height)?;
        let params = params_from(
            pixel_width as f64 * METERS_PER_PIXEL,
            pixel_height as f64 * METERS_PER_PIXEL,
            pixel_width,
            pixel_height,
            &settings,
        );
        Self::spawn(SimulationCore::with_obstacles(params, settings, obstacles)?)
    }

    /// Engine resumed from a save file. Starts paused.
    pub fn from_saved(text: &str, settings: SimulationSettings) -> Result<Self> {
        let snapshot = persist::decode(text)?;
        let mut core = SimulationCore::new(snapshot.params.clone(), settings)?;
        core.restore(snapshot);
        Self::spawn(core)
    }

    fn spawn(core: SimulationCore) -> Result<Self> {
        let shared = Arc::new(Shared {
            inbox: Mutex::new(Inbox {
                jobs: VecDeque::new(),
                params: core.params().clone(),
                timestep: core.timestep(),
                open: true,
            }),
            terminate: AtomicBool::new(false),
        });
        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name("rivulet-engine".into())
            .spawn(move || engine_loop(worker_shared, core))?;
        Ok(Simulation { shared, worker: Some(worker) })
    }

    // === ACTIONS ===

    pub fn action(&self, action: Action) -> Result<()> {
        action.validate()?;
        push_job(&mut self.shared.lock(), Box::new(move |core| core.apply(action)))
    }

    /// Untyped entry point: `command` plus a payload checked against it.
    pub fn submit(&self, command: Command, payload: Payload) -> Result<()> {
        self.action(Action::new(command, payload)?)
    }

    pub fn pause(&self) -> Result<()> {
        self.action(Action::Pause)
    }

    pub fn run(&self) -> Result<()> {
        self.action(Action::Run)
    }

    pub fn clear(&self) -> Result<()> {
        self.action(Action::Clear)
    }

    pub fn draw(&self, x: i64, y: i64, mask: SharedMask, kind: CellType) -> Result<()> {
        self.action(Action::Draw(DrawData { x, y, mask, kind }))
    }

    /// Queues `n` macro-steps to run even while paused.
    pub fn steps(&self, n: u64) -> Result<()> {
        self.action(Action::Steps(n))
    }

    // === QUERIES ===

    /// Scalar queries return at once; grid and perf queries block until the
    /// engine's next drain.
    pub fn query(&self, query: Query) -> Result<Reply> {
        let pending = request(&mut self.shared.lock(), query)?;
        pending.wait()
    }

    pub fn width(&self) -> f64 {
        self.shared.lock().params.width
    }

    pub fn height(&self) -> f64 {
        self.shared.lock().params.height
    }

    pub fn grid_width(&self) -> usize {
        self.shared.lock().params.grid_width
    }

    pub fn grid_height(&self) -> usize {
        self.shared.lock().params.grid_height
    }

    /// Macro-steps completed as of the engine's last drain.
    pub fn timestep(&self) -> u64 {
        self.shared.lock().timestep
    }

    pub fn velocity_grid(&self) -> Result<Grid<Vec2>> {
        self.query(Query::VelocityGrid)?.into_velocity()
    }

    pub fn density_grid(&self) -> Result<Grid<f32>> {
        self.query(Query::DensityGrid)?.into_density()
    }

    pub fn type_grid(&self) -> Result<Grid<CellType>> {
        self.query(Query::TypeGrid)?.into_types()
    }

    pub fn perf_stats(&self) -> Result<PerfStats> {
        self.query(Query::PerfStats)?.into_perf()
    }

    /// Holds the queue for a batch of requests so they are all executed in
    /// the same drain. Wait on the returned `Pending`s after dropping the
    /// scope; waiting inside it deadlocks.
    pub fn multiple(&self) -> Multiple<'_> {
        Multiple { inbox: self.shared.lock() }
    }

    // === PERSISTENCE ===

    pub fn save_to_string(&self) -> Result<String> {
        let (tx, rx) = mpsc::channel();
        push_job(
            &mut self.shared.lock(),
            Box::new(move |core| {
                let _ = tx.send(core.to_text());
            }),
        )?;
        Pending { rx }.wait()
    }

    pub fn save<W: Write>(&self, mut writer: W) -> Result<()> {
        let text = self.save_to_string()?;
        writer.write_all(text.as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    /// Replaces the lattice, parameters and timestep with a save file's
    /// contents. Returns once the engine has installed them.
    pub fn load_from_str(&self, text: &str) -> Result<()> {
        let snapshot = persist::decode(text)?;
        self.install(snapshot)
    }

    pub fn load<R: Read>(&self, mut reader: R) -> Result<()> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        self.load_from_str(&text)
    }

    fn install(&self, snapshot: Snapshot) -> Result<()> {
        let (tx, rx) = mpsc::channel();
        let shared = Arc::clone(&self.shared);
        push_job(
            &mut self.shared.lock(),
            Box::new(move |core| {
                core.restore(snapshot);
                publish(&shared, core);
                let _ = tx.send(());
            }),
        )?;
        Pending { rx }.wait()
    }
}

impl Drop for Simulation {
    fn drop(&mut self) {
        self.shared.terminate.store(true, Ordering::Release);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("engine thread panicked");
            }
        }
    }
}

/// Exclusive access to the queue; see [`Simulation::multiple`].
pub struct Multiple<'a> {
    inbox: MutexGuard<'a, Inbox>,
}

impl Multiple<'_> {
    pub fn action(&mut self, action: Action) -> Result<()> {
        action.validate()?;
        push_job(&mut self.inbox, Box::new(move |core| core.apply(action)))
    }

    pub fn query(&mut self, query: Query) -> Result<Pending<Reply>> {
        request(&mut self.inbox, query)
    }
}

fn params_from(
    width: f64,
    height: f64,
    grid_width: usize,
    grid_height: usize,
    settings: &SimulationSettings,
) -> SimParams {
    SimParams {
        width,
        height,
        grid_width,
        grid_height,
        kinematic_viscosity: settings.kinematic_viscosity,
        density: settings.density,
        speed: settings.speed,
    }
}

fn push_job(inbox: &mut Inbox, job: Job) -> Result<()> {
    if !inbox.open {
        return Err(SimError::EngineStopped);
    }
    inbox.jobs.push_back(job);
    Ok(())
}

fn request(inbox: &mut Inbox, query: Query) -> Result<Pending<Reply>> {
    if query.is_immediate() {
        let reply = match query {
            Query::Width => Reply::Length(inbox.params.width),
            Query::Height => Reply::Length(inbox.params.height),
            Query::GridWidth => Reply::Count(inbox.params.grid_width as u64),
            Query::GridHeight => Reply::Count(inbox.params.grid_height as u64),
            _ => Reply::Count(inbox.timestep),
        };
        return Ok(Pending::ready(reply));
    }
    let (tx, rx) = mpsc::channel();
    push_job(
        inbox,
        Box::new(move |core| {
            let _ = tx.send(core.answer(query));
        }),
    )?;
    Ok(Pending { rx })
}

// === ENGINE THREAD ===

fn engine_loop(shared: Arc<Shared>, mut core: SimulationCore) {
    let _closer = CloseOnExit(&shared);
    log::info!(
        "engine started on a {}x{} lattice",
        core.params().grid_width,
        core.params().grid_height
    );

    while !shared.terminate.load(Ordering::Acquire) {
        if core.wants_step() {
            let timer = PerfTimer::start();
            if let Err(err) = core.macro_step() {
                log::error!("macro-step failed: {}", err);
                break;
            }
            drain(&shared, &mut core);
            let budget = core.settings().budget_ms(core.params().speed);
            let remaining = budget - timer.elapsed_ms();
            if remaining > 0.0 {
                nap(&shared, &core, remaining);
            }
        } else {
            drain(&shared, &mut core);
            if !core.wants_step() {
                let poll = core.settings().pause_poll_ms;
                thread::sleep(Duration::from_millis(poll));
            }
        }
    }

    log::info!("engine stopped at timestep {}", core.timestep());
}

/// Closes the inbox when the engine thread exits, including by unwinding.
/// Jobs left behind drop their reply senders, so waiters see EngineStopped.
struct CloseOnExit<'a>(&'a Shared);

impl Drop for CloseOnExit<'_> {
    fn drop(&mut self) {
        let leftover = {
            let mut inbox = self.0.lock();
            inbox.open = false;
            std::mem::take(&mut inbox.jobs)
        };
        drop(leftover);
    }
}

/// Runs every queued job in arrival order, then republishes scalar state.
fn drain(shared: &Shared, core: &mut SimulationCore) {
    let jobs = {
        let mut inbox = shared.lock();
        inbox.timestep = core.timestep();
        std::mem::take(&mut inbox.jobs)
    };
    if jobs.is_empty() {
        return;
    }
    for job in jobs {
        job(core);
    }
    publish(shared, core);
}

fn publish(shared: &Shared, core: &SimulationCore) {
    let mut inbox = shared.lock();
    inbox.params = core.params().clone();
    inbox.timestep = core.timestep();
}

/// Sleeps for `ms`, waking every poll interval to honour termination.
fn nap(shared: &Shared, core: &SimulationCore, ms: f64) {
    let slice = Duration::from_millis(core.settings().pause_poll_ms.max(1));
    let mut left = Duration::try_from_secs_f64(ms / 1000.0).unwrap_or(Duration::MAX);
    while !left.is_zero() && !shared.terminate.load(Ordering::Acquire) {
        let chunk = left.min(slice);
        thread::sleep(chunk);
        left -= chunk;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_settings() -> SimulationSettings {
        SimulationSettings { batch_budget_ms: 0.0, pause_poll_ms: 1, ..SimulationSettings::default() }
    }

    #[test]
    fn immediate_queries_skip_the_queue() {
        let sim = Simulation::new(2.0, 1.0, 8, 6, quick_settings()).unwrap();
        let mut scope = sim.multiple();
        let width = scope.query(Query::GridWidth).unwrap();
        let types = scope.query(Query::TypeGrid).unwrap();
        assert_eq!(scope.inbox.jobs.len(), 1);
        drop(scope);
        assert_eq!(width.wait().unwrap(), Reply::Count(8));
        assert_eq!(types.wait().unwrap().into_types().unwrap().width(), 8);
    }

    #[test]
    fn panicking_job_stops_the_engine_cleanly() {
        let sim = Simulation::new(1.0, 1.0, 8, 8, quick_settings()).unwrap();
        push_job(&mut sim.shared.lock(), Box::new(|_| panic!("job failed"))).unwrap();
        // Either rejected outright or dropped unanswered; never left hanging.
        assert!(matches!(sim.velocity_grid(), Err(SimError::EngineStopped)));
        assert!(matches!(sim.density_grid(), Err(SimError::EngineStopped)));
    }
}
