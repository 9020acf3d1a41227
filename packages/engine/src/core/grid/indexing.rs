use std::ops::{Index, IndexMut};

use super::Grid;

impl<T> Grid<T> {
    // === Dimensions ===
    #[inline]
    pub fn width(&self) -> usize { self.width }

    #[inline]
    pub fn height(&self) -> usize { self.height }

    #[inline]
    pub fn len(&self) -> usize { self.data.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.data.is_empty() }
}

/// `grid[(x, y)]` - coordinates are the caller's responsibility; only the
/// flat index is range-checked, and only in debug builds is `x < width` asserted.
impl<T> Index<(usize, usize)> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, (x, y): (usize, usize)) -> &T {
        debug_assert!(
            x < self.width && y < self.height,
            "grid index ({}, {}) out of bounds for {}x{} grid",
            x,
            y,
            self.width,
            self.height
        );
        &self.data[y * self.width + x]
    }
}

impl<T> IndexMut<(usize, usize)> for Grid<T> {
    #[inline]
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut T {
        debug_assert!(
            x < self.width && y < self.height,
            "grid index ({}, {}) out of bounds for {}x{} grid",
            x,
            y,
            self.width,
            self.height
        );
        let width = self.width;
        &mut self.data[y * width + x]
    }
}
