//! Rivulet Engine - real-time 2D lattice-Boltzmann wind tunnel
//!
//! A D2Q9 multiple-relaxation-time solver running on its own thread.
//! Callers drive it through [`Simulation`]: actions (pause, run, clear,
//! draw, steps) and queries (scalars, velocity/density/type grids) travel
//! through a single FIFO queue drained between macro-steps.
//!
//! Layout:
//! - core/        - grid container, text codec, errors, macros
//! - domain/      - cells, presets, masks, the double-buffered lattice
//! - systems/     - collision, streaming, derived-field extraction
//! - simulation/  - engine core, actor handle, persistence

// Utils with safety macros (must be first for macro export!)
#[macro_use]
pub mod core;
pub mod domain;
pub mod systems;
pub mod simulation;

pub use crate::core::{Grid, Result, SimError, Vec2};
pub use domain::{circle_mask, Cell, CellType, Direction, Lattice, Mask, MaskValue, SharedMask};
pub use simulation::{
    Action, Command, DrawData, Multiple, Payload, Pending, PerfStats, Query, Reply, SimParams,
    Simulation, SimulationSettings, Snapshot,
};

/// Initialize the engine
pub fn init() {
    log::info!("Rivulet engine {} initialized", version());
}

/// Get engine version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
