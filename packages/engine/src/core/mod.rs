//! Core building blocks: the generic grid, text codec, errors and the
//! indexing macro used by the hot loops.

#[macro_use]
#[path = "utils/safety.rs"]
pub mod safety;
pub mod codec;
pub mod error;
pub mod grid;
pub mod vec2;

pub use error::{Result, SimError};
pub use grid::Grid;
pub use vec2::Vec2;
