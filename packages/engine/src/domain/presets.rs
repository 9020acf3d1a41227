//! Fixed population vectors written by `clear`.
//!
//! The source column carries an over-dense rest state and the drain column an
//! under-dense one with a heavy rest population; the pressure difference
//! between them drives the flow through the tunnel.

use super::cell::{Cell, CellType};

const D: f32 = 1.0 / 36.0;
const A: f32 = 1.0 / 9.0;

/// Equilibrium at rest with unit density.
pub const FLUID: Cell = Cell::new(
    [D, A, D, A, 4.0 * A, A, D, A, D],
    CellType::Fluid,
);

pub const SOURCE: Cell = Cell::new(
    [1.6 * D, 1.6 * A, 1.6 * D, 1.6 * A, 1.6 * A, 1.6 * A, 1.6 * D, 1.6 * A, 1.6 * D],
    CellType::Constant,
);

pub const DRAIN: Cell = Cell::new(
    [0.55 * D, 0.55 * A, 0.55 * D, 0.55 * A, 5.75 * A, 0.55 * A, 0.55 * D, 0.55 * A, 0.55 * D],
    CellType::Constant,
);

/// Wall cell; populations get overwritten by bounce-back.
pub const OBSTACLE: Cell = Cell::new(FLUID.f, CellType::Obstacle);
