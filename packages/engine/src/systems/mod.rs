//! Numerical kernels operating on lattice buffers.

pub mod collision;
pub mod extract;
pub mod streaming;

pub use collision::collide;
pub use streaming::stream;
