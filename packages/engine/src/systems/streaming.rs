//! Streaming with bounce-back
//!
//! Two full sweeps over the interior FLUID cells:
//! 1. bounce-back: for every obstacle neighbour in direction `d`, write the
//!    cell's `d` population into the obstacle's `opposite(d)` slot;
//! 2. exchange: `dest(x, y)[d] = src(x - dx, y - dy)[d]` for all nine
//!    directions, i.e. each population arrives from the cell behind it.
//!
//! After pass 1 an obstacle slot holds exactly the value the exchange pass
//! needs to reflect it back, so the exchange loop has no wall branches. The
//! passes must stay separate: pass 2 reads slots pass 1 writes.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::core::grid::Grid;
use crate::domain::cell::{Cell, CellType, Direction};

pub fn stream(src: &mut Grid<Cell>, dest: &mut Grid<Cell>) {
    let (w, h) = (src.width(), src.height());
    debug_assert_eq!((w, h), (dest.width(), dest.height()));
    if w < 3 || h < 3 {
        return;
    }
    bounce_back(src);
    exchange(src, dest);
}

fn bounce_back(src: &mut Grid<Cell>) {
    let (w, h) = (src.width(), src.height());
    let cells = src.as_mut_slice();
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let idx = y * w + x;
            if fast!(cells, [idx]).kind != CellType::Fluid {
                continue;
            }
            let centre = *fast!(cells, [idx]);
            for d in Direction::MOVING {
                let (dx, dy) = d.offset();
                let nidx = neighbour(idx, w, dx, dy);
                let other = &mut cells[nidx];
                if other.kind == CellType::Obstacle {
                    other[d.opposite()] = centre[d];
                }
            }
        }
    }
}

fn exchange(src: &Grid<Cell>, dest: &mut Grid<Cell>) {
    let (w, h) = (src.width(), src.height());
    let cells = src.as_slice();
    let interior = &mut dest.as_mut_slice()[w..(h - 1) * w];

    #[cfg(feature = "parallel")]
    interior
        .par_chunks_mut(w)
        .enumerate()
        .for_each(|(row, out)| exchange_row(cells, out, w, row + 1));

    #[cfg(not(feature = "parallel"))]
    interior
        .chunks_mut(w)
        .enumerate()
        .for_each(|(row, out)| exchange_row(cells, out, w, row + 1));
}

#[inline]
fn exchange_row(cells: &[Cell], out: &mut [Cell], w: usize, y: usize) {
    for x in 1..w - 1 {
        let idx = y * w + x;
        if fast!(cells, [idx]).kind != CellType::Fluid {
            continue;
        }
        let target = &mut out[x];
        for d in Direction::ALL {
            let (dx, dy) = d.offset();
            let from = neighbour(idx, w, -dx, -dy);
            target[d] = fast!(cells, [from])[d];
        }
    }
}

/// Flat index of the cell at offset `(dx, dy)`; valid for interior `idx`.
#[inline(always)]
fn neighbour(idx: usize, w: usize, dx: isize, dy: isize) -> usize {
    (idx as isize + dy * w as isize + dx) as usize
}
