//! Versioned plain-text save format.
//!
//! ```text
//! Rivulet Simulation
//! 1
//! <width> <height> <grid width> <grid height>
//! <kinematic viscosity> <density> <speed>
//! <timestep>
//! <src grid>
//! <dest grid>
//! ```
//!
//! Every value sits on its own line. Grids use the `Grid` text layout with
//! one cell (nine populations and a type code) per line.

use crate::core::codec::{TextCodec, Tokens};
use crate::core::error::{Result, SimError};
use crate::core::grid::Grid;
use crate::domain::{Cell, Lattice};

use super::init::check_params;
use super::{SimParams, SimulationCore};

pub const MAGIC: &str = "Rivulet Simulation";
pub const FORMAT_VERSION: &str = "1";

/// A decoded save file, ready to be installed into an engine.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub params: SimParams,
    pub timestep: u64,
    pub lattice: Lattice,
}

impl Snapshot {
    pub fn to_text(&self) -> String {
        encode(&self.params, self.timestep, &self.lattice)
    }

    pub fn from_text(text: &str) -> Result<Self> {
        decode(text)
    }
}

pub(super) fn encode(params: &SimParams, timestep: u64, lattice: &Lattice) -> String {
    let mut out = String::new();
    out.push_str(MAGIC);
    out.push('\n');
    out.push_str(FORMAT_VERSION);
    out.push('\n');
    for value in [params.width, params.height] {
        value.encode(&mut out);
        out.push('\n');
    }
    for value in [params.grid_width, params.grid_height] {
        out.push_str(&value.to_string());
        out.push('\n');
    }
    for value in [params.kinematic_viscosity, params.density, params.speed] {
        value.encode(&mut out);
        out.push('\n');
    }
    out.push_str(&timestep.to_string());
    out.push('\n');
    lattice.src().write_text(&mut out);
    lattice.dest().write_text(&mut out);
    out
}

pub(super) fn decode(text: &str) -> Result<Snapshot> {
    let (header, body) = text.split_once('\n').unwrap_or((text, ""));
    let header = header.trim_end_matches('\r');
    if header != MAGIC {
        return Err(SimError::BadMagic(header.to_string()));
    }

    let mut tokens = Tokens::new(body);
    let version = tokens.next_token("format version")?;
    if version != FORMAT_VERSION {
        return Err(SimError::VersionMismatch {
            found: version.to_string(),
            expected: FORMAT_VERSION.to_string(),
        });
    }

    let params = SimParams {
        width: f64::decode(&mut tokens)?,
        height: f64::decode(&mut tokens)?,
        grid_width: tokens.parse("grid width")?,
        grid_height: tokens.parse("grid height")?,
        kinematic_viscosity: f64::decode(&mut tokens)?,
        density: f64::decode(&mut tokens)?,
        speed: f64::decode(&mut tokens)?,
    };
    check_params(&params)?;
    let timestep: u64 = tokens.parse("timestep")?;

    let mut src: Grid<Cell> = Grid::default();
    src.read_text(&mut tokens)?;
    let mut dest: Grid<Cell> = Grid::default();
    dest.read_text(&mut tokens)?;
    if src.width() != params.grid_width || src.height() != params.grid_height {
        return Err(SimError::Format(format!(
            "header declares a {}x{} grid, body holds {}x{}",
            params.grid_width,
            params.grid_height,
            src.width(),
            src.height()
        )));
    }
    if !tokens.is_empty() {
        return Err(SimError::Format("trailing data after the dest grid".into()));
    }

    Ok(Snapshot { params, timestep, lattice: Lattice::from_buffers(src, dest)? })
}

pub(super) fn restore(core: &mut SimulationCore, snapshot: Snapshot) {
    let resized = snapshot.params.grid_width != core.params.grid_width
        || snapshot.params.grid_height != core.params.grid_height;
    if resized && core.obstacles.take().is_some() {
        log::debug!("dropping obstacle bitmap after resize");
    }
    core.params = snapshot.params;
    core.lattice = snapshot.lattice;
    core.timestep = snapshot.timestep;
    core.perf_stats.reset();
    log::debug!(
        "loaded {}x{} lattice at timestep {}",
        core.params.grid_width,
        core.params.grid_height,
        core.timestep
    );
}
