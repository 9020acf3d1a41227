use crate::core::error::Result;
use crate::systems::{collide, stream};

use super::{PerfTimer, SimulationCore};

pub(super) fn iterate(core: &mut SimulationCore) -> Result<()> {
    let omega = core.settings.omega;
    let (src, dest) = core.lattice.buffers_mut();
    collide(src, omega);
    stream(src, dest);
    core.lattice.swap_buffers()
}

pub(super) fn macro_step(core: &mut SimulationCore) -> Result<()> {
    let perf_on = core.settings.perf_metrics;
    let timer = if perf_on { Some(PerfTimer::start()) } else { None };

    let iterations = core.settings.batch_iterations;
    for _ in 0..iterations {
        iterate(core)?;
    }
    core.timestep += 1;

    // Queued single steps are only consumed while paused; a running engine
    // leaves them for the next pause.
    if !core.running && core.steps_to_do > 0 {
        core.steps_to_do -= 1;
    }

    if let Some(timer) = timer {
        let cells = core.lattice.width() * core.lattice.height();
        core.perf_stats.record(timer.elapsed_ms(), iterations, cells);
    }
    Ok(())
}
