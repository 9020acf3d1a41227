//! Double-buffered D2Q9 lattice.
//!
//! `src` and `dest` are one evolving field accessed by ping-pong: an iteration
//! collides `src` in place, streams `src` into `dest`, then swaps the two
//! buffers. Both buffers always share dimensions. Row 0, row `h - 1`,
//! column 0 and column `w - 1` form the tunnel boundary (walls, source,
//! drain); they are written by `clear` only.

use crate::core::error::{Result, SimError};
use crate::core::grid::Grid;

use super::cell::{Cell, CellType};
use super::mask::{Mask, MaskValue};
use super::presets;

/// Smallest grid with at least one interior cell.
pub const MIN_GRID_SIZE: usize = 3;

#[derive(Clone, Debug, PartialEq)]
pub struct Lattice {
    src: Grid<Cell>,
    dest: Grid<Cell>,
}

impl Lattice {
    /// Allocates both buffers and initialises them with [`Lattice::clear`].
    pub fn new(width: usize, height: usize) -> Result<Self> {
        check_grid_size(width, height)?;
        let mut lattice = Self {
            src: Grid::new(width, height),
            dest: Grid::new(width, height),
        };
        lattice.clear(None);
        Ok(lattice)
    }

    pub fn from_buffers(src: Grid<Cell>, dest: Grid<Cell>) -> Result<Self> {
        check_grid_size(src.width(), src.height())?;
        if src.width() != dest.width() || src.height() != dest.height() {
            return Err(SimError::DimensionMismatch {
                left_width: src.width(),
                left_height: src.height(),
                right_width: dest.width(),
                right_height: dest.height(),
            });
        }
        Ok(Self { src, dest })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.src.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.src.height()
    }

    /// The live buffer (state after the last completed iteration).
    #[inline]
    pub fn src(&self) -> &Grid<Cell> {
        &self.src
    }

    #[inline]
    pub fn dest(&self) -> &Grid<Cell> {
        &self.dest
    }

    #[inline]
    pub(crate) fn buffers_mut(&mut self) -> (&mut Grid<Cell>, &mut Grid<Cell>) {
        (&mut self.src, &mut self.dest)
    }

    pub fn swap_buffers(&mut self) -> Result<()> {
        Grid::swap(&mut self.src, &mut self.dest)
    }

    /// Resets both buffers to the wind tunnel: fluid at rest inside, walls
    /// along the top and bottom rows, source in the left column, drain in the
    /// right column. `obstacles` (same size as the lattice) then marks extra
    /// interior obstacle cells.
    pub fn clear(&mut self, obstacles: Option<&Grid<bool>>) {
        let (w, h) = (self.width(), self.height());
        for grid in [&mut self.src, &mut self.dest] {
            grid.fill(presets::FLUID);
            for x in 0..w {
                grid[(x, 0)] = presets::OBSTACLE;
                grid[(x, h - 1)] = presets::OBSTACLE;
            }
            for y in 0..h {
                grid[(0, y)] = presets::SOURCE;
                grid[(w - 1, y)] = presets::DRAIN;
            }
            if let Some(bitmap) = obstacles {
                if bitmap.width() == w && bitmap.height() == h {
                    for y in 1..h - 1 {
                        for x in 1..w - 1 {
                            if bitmap[(x, y)] {
                                grid[(x, y)].kind = CellType::Obstacle;
                            }
                        }
                    }
                }
            }
        }
    }

    /// Applies a masked type edit centred at `(cx, cy)`.
    ///
    /// Only interior FLUID/OBSTACLE cells are touched; anything outside
    /// `1..w-1 × 1..h-1` or of type CONSTANT is skipped. Cells that become
    /// fluid restart from the rest state. Returns the number of cells changed.
    pub fn draw(&mut self, cx: i64, cy: i64, mask: &Mask, kind: CellType) -> usize {
        if kind == CellType::Constant {
            return 0;
        }
        let (w, h) = (self.width() as i64, self.height() as i64);
        let left = cx - (mask.width() / 2) as i64;
        let top = cy - (mask.height() / 2) as i64;
        let mut changed = 0;
        for my in 0..mask.height() {
            for mx in 0..mask.width() {
                if mask[(mx, my)] == MaskValue::Ignore {
                    continue;
                }
                let sx = left + mx as i64;
                let sy = top + my as i64;
                if sx < 1 || sx >= w - 1 || sy < 1 || sy >= h - 1 {
                    continue;
                }
                let (x, y) = (sx as usize, sy as usize);
                let current = self.src[(x, y)].kind;
                if current == CellType::Constant || current == kind {
                    continue;
                }
                for grid in [&mut self.src, &mut self.dest] {
                    let cell = &mut grid[(x, y)];
                    if kind == CellType::Fluid {
                        *cell = presets::FLUID;
                    } else {
                        cell.kind = kind;
                    }
                }
                changed += 1;
            }
        }
        changed
    }
}

pub(crate) fn check_grid_size(width: usize, height: usize) -> Result<()> {
    if width < MIN_GRID_SIZE || height < MIN_GRID_SIZE {
        return Err(SimError::InvalidDimensions(format!(
            "grid must be at least {0}x{0}, got {1}x{2}",
            MIN_GRID_SIZE, width, height
        )));
    }
    Ok(())
}
