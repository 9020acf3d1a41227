//! Grid - owning dense 2D buffer, row-major
//!
//! Element `(x, y)` lives at `y * width + x`. Grids have value semantics:
//! `clone` is a deep copy, [`Grid::take`] moves the storage out and leaves an
//! empty grid behind, and [`Grid::swap`] exchanges storage in O(1) between
//! two grids of identical dimensions (the lattice ping-pong relies on it).

use super::error::{Result, SimError};

mod indexing;
mod text;

pub use text::GRID_TAG;

#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T> Default for Grid<T> {
    fn default() -> Self {
        Self { width: 0, height: 0, data: Vec::new() }
    }
}

impl<T: Clone + Default> Grid<T> {
    /// Allocates `width * height` default-valued elements.
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, T::default())
    }
}

impl<T: Clone> Grid<T> {
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self { width, height, data: vec![value; width * height] }
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Dimension-checked element-wise copy; keeps this grid's allocation.
    pub fn copy_from(&mut self, other: &Grid<T>) -> Result<()> {
        self.check_same_dimensions(other)?;
        self.data.clone_from_slice(&other.data);
        Ok(())
    }
}

impl<T> Grid<T> {
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Result<Self> {
        if data.len() != width * height {
            return Err(SimError::InvalidDimensions(format!(
                "{} elements cannot fill a {}x{} grid",
                data.len(),
                width,
                height
            )));
        }
        Ok(Self { width, height, data })
    }

    /// Moves the storage out, leaving a 0x0 grid in its place.
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    /// Exchanges the backing storage of two grids with identical dimensions.
    pub fn swap(a: &mut Grid<T>, b: &mut Grid<T>) -> Result<()> {
        a.check_same_dimensions(b)?;
        std::mem::swap(&mut a.data, &mut b.data);
        Ok(())
    }

    pub fn map<U, F: FnMut(&T) -> U>(&self, f: F) -> Grid<U> {
        Grid {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(f).collect(),
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    fn check_same_dimensions<U>(&self, other: &Grid<U>) -> Result<()> {
        if self.width != other.width || self.height != other.height {
            return Err(SimError::DimensionMismatch {
                left_width: self.width,
                left_height: self.height,
                right_width: other.width,
                right_height: other.height,
            });
        }
        Ok(())
    }
}
