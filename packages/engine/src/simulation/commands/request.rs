//! Messages accepted by the engine: actions mutate, queries observe.

use std::fmt;

use crate::core::error::{Result, SimError};
use crate::core::grid::Grid;
use crate::core::vec2::Vec2;
use crate::domain::{CellType, SharedMask};
use crate::systems::extract;

use super::perf_stats::PerfStats;
use super::SimulationCore;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    Pause,
    Run,
    Clear,
    Draw,
    Steps,
}

impl Command {
    pub fn name(self) -> &'static str {
        match self {
            Command::Pause => "pause",
            Command::Run => "run",
            Command::Clear => "clear",
            Command::Draw => "draw",
            Command::Steps => "steps",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Region edit: `mask` is centred on `(x, y)` in lattice coordinates.
#[derive(Clone, Debug)]
pub struct DrawData {
    pub x: i64,
    pub y: i64,
    pub mask: SharedMask,
    pub kind: CellType,
}

/// Untyped argument of a [`Command`], checked by [`Action::new`].
#[derive(Clone, Debug)]
pub enum Payload {
    None,
    Draw(DrawData),
    Steps(u64),
}

/// A validated engine mutation.
#[derive(Clone, Debug)]
pub enum Action {
    Pause,
    Run,
    Clear,
    Draw(DrawData),
    Steps(u64),
}

impl Action {
    /// Pairs a command with its payload, rejecting mismatches and draws
    /// that would create CONSTANT cells.
    pub fn new(command: Command, payload: Payload) -> Result<Action> {
        let action = match (command, payload) {
            (Command::Pause, Payload::None) => Action::Pause,
            (Command::Run, Payload::None) => Action::Run,
            (Command::Clear, Payload::None) => Action::Clear,
            (Command::Steps, Payload::Steps(n)) => Action::Steps(n),
            (Command::Draw, Payload::Draw(data)) => Action::Draw(data),
            (command, payload) => {
                return Err(SimError::InvalidAction(format!(
                    "{} does not accept payload {:?}",
                    command,
                    payload_name(&payload)
                )))
            }
        };
        action.validate()?;
        Ok(action)
    }

    pub fn command(&self) -> Command {
        match self {
            Action::Pause => Command::Pause,
            Action::Run => Command::Run,
            Action::Clear => Command::Clear,
            Action::Draw(_) => Command::Draw,
            Action::Steps(_) => Command::Steps,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if let Action::Draw(data) = self {
            if data.kind == CellType::Constant {
                return Err(SimError::InvalidAction(
                    "draw cannot create constant cells".into(),
                ));
            }
        }
        Ok(())
    }
}

fn payload_name(payload: &Payload) -> &'static str {
    match payload {
        Payload::None => "none",
        Payload::Draw(_) => "draw",
        Payload::Steps(_) => "steps",
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Query {
    Width,
    Height,
    GridWidth,
    GridHeight,
    Timestep,
    VelocityGrid,
    DensityGrid,
    TypeGrid,
    PerfStats,
}

impl Query {
    pub fn name(self) -> &'static str {
        match self {
            Query::Width => "width",
            Query::Height => "height",
            Query::GridWidth => "grid_width",
            Query::GridHeight => "grid_height",
            Query::Timestep => "timestep",
            Query::VelocityGrid => "velocity_grid",
            Query::DensityGrid => "density_grid",
            Query::TypeGrid => "type_grid",
            Query::PerfStats => "perf_stats",
        }
    }

    /// Scalar queries are answered from the published snapshot without
    /// waiting for the engine; the rest are queued.
    pub fn is_immediate(self) -> bool {
        matches!(
            self,
            Query::Width | Query::Height | Query::GridWidth | Query::GridHeight | Query::Timestep
        )
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
    Length(f64),
    Count(u64),
    Velocity(Grid<Vec2>),
    Density(Grid<f32>),
    Types(Grid<CellType>),
    Perf(PerfStats),
}

impl Reply {
    fn kind(&self) -> &'static str {
        match self {
            Reply::Length(_) => "length",
            Reply::Count(_) => "count",
            Reply::Velocity(_) => "velocity grid",
            Reply::Density(_) => "density grid",
            Reply::Types(_) => "type grid",
            Reply::Perf(_) => "perf stats",
        }
    }

    fn mismatch(&self, wanted: &str) -> SimError {
        SimError::InvalidQuery(format!("expected {}, reply holds {}", wanted, self.kind()))
    }

    pub fn into_length(self) -> Result<f64> {
        match self {
            Reply::Length(v) => Ok(v),
            other => Err(other.mismatch("length")),
        }
    }

    pub fn into_count(self) -> Result<u64> {
        match self {
            Reply::Count(v) => Ok(v),
            other => Err(other.mismatch("count")),
        }
    }

    pub fn into_velocity(self) -> Result<Grid<Vec2>> {
        match self {
            Reply::Velocity(g) => Ok(g),
            other => Err(other.mismatch("velocity grid")),
        }
    }

    pub fn into_density(self) -> Result<Grid<f32>> {
        match self {
            Reply::Density(g) => Ok(g),
            other => Err(other.mismatch("density grid")),
        }
    }

    pub fn into_types(self) -> Result<Grid<CellType>> {
        match self {
            Reply::Types(g) => Ok(g),
            other => Err(other.mismatch("type grid")),
        }
    }

    pub fn into_perf(self) -> Result<PerfStats> {
        match self {
            Reply::Perf(p) => Ok(p),
            other => Err(other.mismatch("perf stats")),
        }
    }
}

pub(super) fn answer(core: &SimulationCore, query: Query) -> Reply {
    let params = core.params();
    match query {
        Query::Width => Reply::Length(params.width),
        Query::Height => Reply::Length(params.height),
        Query::GridWidth => Reply::Count(params.grid_width as u64),
        Query::GridHeight => Reply::Count(params.grid_height as u64),
        Query::Timestep => Reply::Count(core.timestep()),
        Query::VelocityGrid => Reply::Velocity(extract::velocity_grid(core.lattice().src())),
        Query::DensityGrid => Reply::Density(extract::density_grid(core.lattice().src())),
        Query::TypeGrid => Reply::Types(extract::type_grid(core.lattice().src())),
        Query::PerfStats => Reply::Perf(core.perf_stats()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::circle_mask;
    use std::sync::Arc;

    fn draw_payload(kind: CellType) -> Payload {
        Payload::Draw(DrawData { x: 2, y: 2, mask: Arc::new(circle_mask(3)), kind })
    }

    #[test]
    fn matching_payloads_build_actions() {
        assert!(matches!(Action::new(Command::Pause, Payload::None), Ok(Action::Pause)));
        assert!(matches!(Action::new(Command::Steps, Payload::Steps(3)), Ok(Action::Steps(3))));
        let draw = Action::new(Command::Draw, draw_payload(CellType::Obstacle)).unwrap();
        assert_eq!(draw.command(), Command::Draw);
    }

    #[test]
    fn mismatched_payload_is_invalid() {
        assert!(matches!(
            Action::new(Command::Steps, Payload::None),
            Err(SimError::InvalidAction(_))
        ));
        assert!(matches!(
            Action::new(Command::Clear, Payload::Steps(1)),
            Err(SimError::InvalidAction(_))
        ));
    }

    #[test]
    fn drawing_constant_is_invalid() {
        assert!(matches!(
            Action::new(Command::Draw, draw_payload(CellType::Constant)),
            Err(SimError::InvalidAction(_))
        ));
    }

    #[test]
    fn reply_type_mismatch_is_invalid_query() {
        assert_eq!(Reply::Count(4).into_count().unwrap(), 4);
        assert!(matches!(Reply::Length(1.0).into_count(), Err(SimError::InvalidQuery(_))));
        assert!(matches!(Reply::Count(1).into_types(), Err(SimError::InvalidQuery(_))));
    }

    #[test]
    fn only_scalars_are_immediate() {
        assert!(Query::Timestep.is_immediate());
        assert!(Query::Width.is_immediate());
        assert!(!Query::VelocityGrid.is_immediate());
        assert!(!Query::PerfStats.is_immediate());
        assert_eq!(Query::GridWidth.to_string(), "grid_width");
        assert_eq!(Command::Steps.to_string(), "steps");
    }
}
