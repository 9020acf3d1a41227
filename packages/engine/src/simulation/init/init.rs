use crate::core::error::{Result, SimError};
use crate::core::grid::Grid;
use crate::domain::lattice::{check_grid_size, MIN_GRID_SIZE};
use crate::domain::Lattice;

use super::perf_stats::PerfStats;
use super::settings::{check_speed, SimulationSettings};
use super::{SimParams, SimulationCore};

/// Physical size of one bitmap pixel, in meters.
pub const METERS_PER_PIXEL: f64 = 0.01;

pub(super) fn create_core(
    params: SimParams,
    settings: SimulationSettings,
    obstacles: Option<Grid<bool>>,
) -> Result<SimulationCore> {
    settings.validate()?;
    check_params(&params)?;
    if let Some(mask) = &obstacles {
        if mask.width() != params.grid_width || mask.height() != params.grid_height {
            return Err(SimError::DimensionMismatch {
                left_width: params.grid_width,
                left_height: params.grid_height,
                right_width: mask.width(),
                right_height: mask.height(),
            });
        }
    }

    let mut lattice = Lattice::new(params.grid_width, params.grid_height)?;
    if obstacles.is_some() {
        lattice.clear(obstacles.as_ref());
    }

    log::debug!(
        "created {}x{} lattice for a {}m x {}m domain",
        params.grid_width,
        params.grid_height,
        params.width,
        params.height
    );

    Ok(SimulationCore {
        params,
        settings,
        lattice,
        obstacles,
        running: false,
        steps_to_do: 0,
        timestep: 0,
        perf_stats: PerfStats::default(),
    })
}

pub(crate) fn check_params(params: &SimParams) -> Result<()> {
    check_extent(params.width, params.height)?;
    check_grid_size(params.grid_width, params.grid_height)?;
    check_speed(params.speed)
}

fn check_extent(width: f64, height: f64) -> Result<()> {
    if !(width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0) {
        return Err(SimError::InvalidDimensions(format!(
            "physical size must be finite and positive, got {} x {}",
            width, height
        )));
    }
    Ok(())
}

/// Grid resolution holding roughly `total_points` cells with the aspect
/// ratio of `width x height`. Each side is rounded up.
pub fn grid_for_total_points(width: f64, height: f64, total_points: usize) -> Result<(usize, usize)> {
    check_extent(width, height)?;
    if total_points == 0 {
        return Err(SimError::InvalidDimensions("total point count must be positive".into()));
    }
    let total = total_points as f64;
    let grid_width = ((width / height) * total).sqrt().ceil() as usize;
    let grid_height = ((height / width) * total).sqrt().ceil() as usize;
    check_grid_size(grid_width, grid_height)?;
    Ok((grid_width, grid_height))
}

/// Grid resolution with the given column count; rows follow the aspect ratio.
pub fn grid_for_width(width: f64, height: f64, grid_width: usize) -> Result<(usize, usize)> {
    check_extent(width, height)?;
    let grid_height = (grid_width as f64 * height / width).round() as usize;
    check_grid_size(grid_width, grid_height)?;
    Ok((grid_width, grid_height))
}

/// Grid resolution with the given row count; columns follow the aspect ratio.
pub fn grid_for_height(width: f64, height: f64, grid_height: usize) -> Result<(usize, usize)> {
    check_extent(width, height)?;
    let grid_width = (grid_height as f64 * width / height).round() as usize;
    check_grid_size(grid_width, grid_height)?;
    Ok((grid_width, grid_height))
}

/// Decodes a single-channel bitmap, row-major with row 0 at the top.
/// Any non-zero pixel marks an obstacle.
pub fn bitmap_obstacles(pixels: &[u8], width: usize, height: usize) -> Result<Grid<bool>> {
    if width < MIN_GRID_SIZE || height < MIN_GRID_SIZE {
        return Err(SimError::InvalidDimensions(format!(
            "bitmap must be at least {0}x{0}, got {1}x{2}",
            MIN_GRID_SIZE, width, height
        )));
    }
    if width.checked_mul(height) != Some(pixels.len()) {
        return Err(SimError::InvalidParameter(format!(
            "bitmap of {}x{} needs {} bytes, got {}",
            width,
            height,
            width.saturating_mul(height),
            pixels.len()
        )));
    }
    Grid::from_vec(width, height, pixels.iter().map(|&p| p != 0).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_points_preserves_aspect() {
        assert_eq!(grid_for_total_points(2.0, 1.0, 200).unwrap(), (20, 10));
        assert_eq!(grid_for_total_points(1.0, 1.0, 10).unwrap(), (4, 4));
    }

    #[test]
    fn total_points_rejects_degenerate_input() {
        assert!(grid_for_total_points(1.0, 1.0, 0).is_err());
        assert!(grid_for_total_points(0.0, 1.0, 100).is_err());
        assert!(grid_for_total_points(100.0, 1.0, 100).is_err());
    }

    #[test]
    fn width_and_height_factories_round() {
        assert_eq!(grid_for_width(3.0, 1.0, 30).unwrap(), (30, 10));
        assert_eq!(grid_for_height(3.0, 1.0, 10).unwrap(), (30, 10));
        assert_eq!(grid_for_width(1.0, 1.6, 10).unwrap(), (10, 16));
        assert!(grid_for_width(10.0, 1.0, 10).is_err());
    }

    #[test]
    fn bitmap_nonzero_is_obstacle() {
        let pixels = [0, 0, 0, 0, 255, 0, 0, 1, 0];
        let mask = bitmap_obstacles(&pixels, 3, 3).unwrap();
        assert!(mask[(1, 1)]);
        assert!(mask[(1, 2)]);
        assert!(!mask[(0, 0)]);
    }

    #[test]
    fn bitmap_length_must_match() {
        assert!(matches!(
            bitmap_obstacles(&[0; 8], 3, 3),
            Err(SimError::InvalidParameter(_))
        ));
    }
}
