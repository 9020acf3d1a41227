//! Domain model: lattice cells, fixed population presets, drawing masks and
//! the double-buffered lattice.

pub mod cell;
pub mod lattice;
pub mod mask;
pub mod presets;

pub use cell::{Cell, CellType, Direction};
pub use lattice::Lattice;
pub use mask::{circle_mask, Mask, MaskValue, SharedMask};
