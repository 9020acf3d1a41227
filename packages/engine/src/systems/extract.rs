//! Derived fields read from the live lattice buffer.
//!
//! Velocity is the raw first moment (`m3`, `m5`), density the zeroth. Values
//! for non-FLUID cells come straight from whatever populations they hold.
//! The y component is positive toward row 0 (north).

use crate::core::grid::Grid;
use crate::core::vec2::Vec2;
use crate::domain::cell::{Cell, CellType};

pub fn velocity_grid(src: &Grid<Cell>) -> Grid<Vec2> {
    src.map(velocity)
}

pub fn density_grid(src: &Grid<Cell>) -> Grid<f32> {
    src.map(Cell::density)
}

pub fn type_grid(src: &Grid<Cell>) -> Grid<CellType> {
    src.map(|cell| cell.kind)
}

#[inline]
pub fn velocity(cell: &Cell) -> Vec2 {
    let [nw, n, ne, w, _, e, sw, s, se] = cell.f;
    Vec2::new(-nw + ne - w + e - sw + se, nw + n + ne - sw - s - se)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cell::Direction;
    use crate::domain::presets;

    #[test]
    fn rest_state_has_no_velocity() {
        assert!(velocity(&presets::FLUID).length() < 1e-7);
    }

    #[test]
    fn east_and_north_are_positive() {
        let mut cell = presets::FLUID;
        cell[Direction::E] += 0.1;
        cell[Direction::N] += 0.2;
        let v = velocity(&cell);
        assert!((v.x - 0.1).abs() < 1e-6);
        assert!((v.y - 0.2).abs() < 1e-6);
    }

    #[test]
    fn grids_match_lattice_dimensions() {
        let src = Grid::filled(3, 2, presets::DRAIN);
        let d = density_grid(&src);
        assert_eq!((d.width(), d.height()), (3, 2));
        assert!((d[(2, 1)] - presets::DRAIN.density()).abs() < 1e-6);
        assert_eq!(type_grid(&src)[(0, 0)], CellType::Constant);
        assert_eq!(velocity_grid(&src).len(), 6);
    }
}
