//! Simulation engine.
//!
//! `SimulationCore` owns the lattice and every piece of mutable engine state.
//! It is only ever touched by the engine thread; callers talk to it through
//! the [`Simulation`] handle, which turns actions and queries into jobs on a
//! single FIFO queue drained once per macro-step.

use crate::core::error::Result;
use crate::core::grid::Grid;
use crate::domain::Lattice;

#[path = "perf/perf_timer.rs"]
mod perf_timer;
#[path = "perf/perf_stats.rs"]
mod perf_stats;
#[path = "init/init.rs"]
mod init;
#[path = "init/settings.rs"]
mod settings;
#[path = "commands/commands.rs"]
mod commands;
#[path = "commands/request.rs"]
mod request;
#[path = "step/step.rs"]
mod step;
#[path = "persist/persist.rs"]
mod persist;
mod facade;

pub use facade::{Multiple, Pending, Simulation};
pub use init::{
    bitmap_obstacles, grid_for_height, grid_for_total_points, grid_for_width, METERS_PER_PIXEL,
};
pub use perf_stats::PerfStats;
pub use persist::{Snapshot, FORMAT_VERSION, MAGIC};
pub use request::{Action, Command, DrawData, Payload, Query, Reply};
pub use settings::SimulationSettings;

use perf_timer::PerfTimer;

/// Persisted parameter block: physical extent, resolution and the
/// user-facing flow parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct SimParams {
    /// Physical width in meters.
    pub width: f64,
    /// Physical height in meters.
    pub height: f64,
    pub grid_width: usize,
    pub grid_height: usize,
    pub kinematic_viscosity: f64,
    pub density: f64,
    pub speed: f64,
}

pub(crate) struct SimulationCore {
    params: SimParams,
    settings: SimulationSettings,
    lattice: Lattice,
    obstacles: Option<Grid<bool>>,

    // State
    running: bool,
    steps_to_do: u64,
    timestep: u64,

    // Perf metrics
    perf_stats: PerfStats,
}

impl SimulationCore {
    pub(crate) fn new(params: SimParams, settings: SimulationSettings) -> Result<Self> {
        init::create_core(params, settings, None)
    }

    /// Same as `new`, with an obstacle mask re-applied on every clear.
    pub(crate) fn with_obstacles(
        params: SimParams,
        settings: SimulationSettings,
        obstacles: Grid<bool>,
    ) -> Result<Self> {
        init::create_core(params, settings, Some(obstacles))
    }

    pub(crate) fn params(&self) -> &SimParams {
        &self.params
    }

    pub(crate) fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    pub(crate) fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub(crate) fn timestep(&self) -> u64 {
        self.timestep
    }

    /// True when the next loop turn should execute a macro-step.
    pub(crate) fn wants_step(&self) -> bool {
        self.running || self.steps_to_do > 0
    }

    pub(crate) fn apply(&mut self, action: Action) {
        commands::apply(self, action);
    }

    pub(crate) fn answer(&self, query: Query) -> Reply {
        request::answer(self, query)
    }

    /// `batch_iterations` iterations followed by a timestep increment.
    pub(crate) fn macro_step(&mut self) -> Result<()> {
        step::macro_step(self)
    }

    pub(crate) fn perf_stats(&self) -> PerfStats {
        self.perf_stats.clone()
    }

    pub(crate) fn to_text(&self) -> String {
        persist::encode(&self.params, self.timestep, &self.lattice)
    }

    pub(crate) fn restore(&mut self, snapshot: Snapshot) {
        persist::restore(self, snapshot);
    }
}

#[cfg(test)]
#[path = "tests/tests.rs"]
mod tests;
