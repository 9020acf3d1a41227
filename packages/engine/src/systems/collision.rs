//! MRT collision
//!
//! Each FLUID cell is transformed into nine moments, the non-conserved ones
//! relax toward their quadratic equilibrium at individual rates, and the
//! inverse transform yields the post-collision populations.
//!
//! Moments: `m0` density, `m1` energy, `m2` energy squared, `m3`/`m5`
//! x/y momentum, `m4`/`m6` x/y heat flux, `m7`/`m8` diagonal and
//! off-diagonal stress. Equilibria are taken with the momentum as velocity
//! (incompressible formulation).

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::core::grid::Grid;
use crate::domain::cell::Cell;

/// Relaxation rate of the energy moment `m1`.
pub const P1: f32 = 1.63;
/// Relaxation rate of the energy-squared moment `m2`.
pub const P2: f32 = 1.14;
/// Relaxation rate of the x heat flux `m4`.
pub const P4: f32 = 1.9;
/// Relaxation rate of the y heat flux `m6`.
pub const P6: f32 = 1.92;
/// Default viscosity-linked rate used for both stress moments.
pub const DEFAULT_OMEGA: f32 = 1.6;

/// Populations above this are halved until they are not.
pub const POPULATION_LIMIT: f32 = 1.0e5;

/// Collides every interior FLUID cell of `grid` in place.
///
/// Boundary rows/columns and non-FLUID cells are skipped.
pub fn collide(grid: &mut Grid<Cell>, omega: f32) {
    let (w, h) = (grid.width(), grid.height());
    if w < 3 || h < 3 {
        return;
    }
    let interior = &mut grid.as_mut_slice()[w..(h - 1) * w];

    #[cfg(feature = "parallel")]
    interior
        .par_chunks_mut(w)
        .for_each(|row| collide_row(row, omega));

    #[cfg(not(feature = "parallel"))]
    interior
        .chunks_mut(w)
        .for_each(|row| collide_row(row, omega));
}

#[inline]
fn collide_row(row: &mut [Cell], omega: f32) {
    let last = row.len() - 1;
    for cell in &mut row[1..last] {
        if cell.is_fluid() {
            relax(cell, omega);
        }
    }
}

/// Moment transform, relaxation and back transform for one cell.
#[inline]
pub fn relax(cell: &mut Cell, omega: f32) {
    let [nw, n, ne, w, c, e, sw, s, se] = cell.f;

    let m0 = nw + n + ne + w + c + e + sw + s + se;
    let mut m1 = 2.0 * nw - n + 2.0 * ne - w - 4.0 * c - e + 2.0 * sw - s + 2.0 * se;
    let mut m2 = nw - 2.0 * n + ne - 2.0 * w + 4.0 * c - 2.0 * e + sw - 2.0 * s + se;
    let m3 = -nw + ne - w + e - sw + se;
    let mut m4 = -nw + ne + 2.0 * w - 2.0 * e - sw + se;
    let m5 = nw + n + ne - sw - s - se;
    let mut m6 = nw - 2.0 * n + ne - sw + 2.0 * s - se;
    let mut m7 = -n + w + e - s;
    let mut m8 = -nw + ne + sw - se;

    let v_squared = m3 * m3 + m5 * m5;

    m1 -= P1 * (m1 + (2.0 * m0 - 3.0 * v_squared));
    m2 -= P2 * (m2 - (m0 - 3.0 * v_squared));
    m4 -= P4 * (m4 + m3);
    m6 -= P6 * (m6 + m5);
    m7 -= omega * (m7 - (m3 * m3 - m5 * m5));
    m8 -= omega * (m8 - m3 * m5);

    // Scale by the squared norms of the basis vectors.
    let m0 = 4.0 * m0;
    let m3 = 6.0 * m3;
    let m4 = 3.0 * m4;
    let m5 = 6.0 * m5;
    let m6 = 3.0 * m6;
    let m7 = 9.0 * m7;
    let m8 = 9.0 * m8;

    cell.f = [
        (m0 + 2.0 * m1 + m2 - m3 - m4 + m5 + m6 - m8) / 36.0,
        (m0 - m1 - 2.0 * m2 + m5 - 2.0 * m6 - m7) / 36.0,
        (m0 + 2.0 * m1 + m2 + m3 + m4 + m5 + m6 + m8) / 36.0,
        (m0 - m1 - 2.0 * m2 - m3 + 2.0 * m4 + m7) / 36.0,
        (m0 - 4.0 * m1 + 4.0 * m2) / 36.0,
        (m0 - m1 - 2.0 * m2 + m3 - 2.0 * m4 + m7) / 36.0,
        (m0 + 2.0 * m1 + m2 - m3 - m4 - m5 - m6 + m8) / 36.0,
        (m0 - m1 - 2.0 * m2 - m5 + 2.0 * m6 - m7) / 36.0,
        (m0 + 2.0 * m1 + m2 + m3 + m4 - m5 - m6 - m8) / 36.0,
    ];

    for v in cell.f.iter_mut() {
        *v = stabilize(*v);
    }
}

/// Soft correction applied to every post-collision population: negative
/// (or NaN) values become zero, values above [`POPULATION_LIMIT`] are halved
/// until they fit.
#[inline]
pub fn stabilize(v: f32) -> f32 {
    if !(v >= 0.0) {
        return 0.0;
    }
    if v <= POPULATION_LIMIT {
        return v;
    }
    if !v.is_finite() {
        return POPULATION_LIMIT;
    }
    let mut halved = v * 0.5;
    while halved > POPULATION_LIMIT {
        halved *= 0.5;
    }
    halved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cell::{CellType, Direction};
    use crate::domain::presets;

    #[test]
    fn equilibrium_at_rest_is_a_fixed_point() {
        let mut grid = Grid::filled(4, 4, presets::FLUID);
        collide(&mut grid, DEFAULT_OMEGA);
        for y in 1..3 {
            for x in 1..3 {
                let cell = grid[(x, y)];
                for d in Direction::ALL {
                    assert!(
                        (cell[d] - presets::FLUID[d]).abs() < 1e-6,
                        "{:?} drifted to {} at ({}, {})",
                        d,
                        cell[d],
                        x,
                        y
                    );
                }
            }
        }
    }

    #[test]
    fn collision_conserves_mass_and_momentum() {
        let mut cell = presets::FLUID;
        cell[Direction::E] += 0.02;
        cell[Direction::NE] += 0.01;
        let before = cell;
        relax(&mut cell, DEFAULT_OMEGA);
        let jx = |c: &Cell| -c.f[0] + c.f[2] - c.f[3] + c.f[5] - c.f[6] + c.f[8];
        let jy = |c: &Cell| c.f[0] + c.f[1] + c.f[2] - c.f[6] - c.f[7] - c.f[8];
        assert!((cell.density() - before.density()).abs() < 1e-5);
        assert!((jx(&cell) - jx(&before)).abs() < 1e-5);
        assert!((jy(&cell) - jy(&before)).abs() < 1e-5);
    }

    #[test]
    fn non_fluid_and_boundary_cells_are_skipped() {
        let mut grid = Grid::filled(3, 3, presets::SOURCE);
        grid[(1, 1)] = presets::OBSTACLE;
        grid[(1, 1)].f[4] = 7.0;
        let before = grid.clone();
        collide(&mut grid, DEFAULT_OMEGA);
        assert_eq!(grid, before);
        assert_eq!(grid[(1, 1)].kind, CellType::Obstacle);
    }

    #[test]
    fn stabilize_clamps_and_halves() {
        assert_eq!(stabilize(-0.5), 0.0);
        assert_eq!(stabilize(f32::NAN), 0.0);
        assert_eq!(stabilize(0.25), 0.25);
        assert_eq!(stabilize(1.5e5), 0.75e5);
        assert!(stabilize(9.0e9) <= POPULATION_LIMIT);
        assert_eq!(stabilize(f32::INFINITY), POPULATION_LIMIT);
    }

    #[test]
    fn wild_populations_stay_in_range() {
        let mut cell = Cell::new([5.0e4, 0.0, 9.0e4, 3.0e3, 0.0, 2.0e4, 1.0, 8.0e4, 0.0], CellType::Fluid);
        relax(&mut cell, 1.99);
        assert!(cell.f.iter().all(|&v| (0.0..=POPULATION_LIMIT).contains(&v)));
    }
}
