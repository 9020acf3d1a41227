use crate::domain::{CellType, Mask};

use super::request::Action;
use super::SimulationCore;

pub(super) fn apply(core: &mut SimulationCore, action: Action) {
    log::trace!("applying {}", action.command());
    match action {
        Action::Pause => pause(core),
        Action::Run => run(core),
        Action::Clear => clear(core),
        Action::Draw(data) => {
            draw(core, data.x, data.y, &data.mask, data.kind);
        }
        Action::Steps(n) => add_steps(core, n),
    }
}

pub(super) fn pause(core: &mut SimulationCore) {
    core.running = false;
}

pub(super) fn run(core: &mut SimulationCore) {
    core.running = true;
}

pub(super) fn add_steps(core: &mut SimulationCore, n: u64) {
    core.steps_to_do = core.steps_to_do.saturating_add(n);
}

pub(super) fn clear(core: &mut SimulationCore) {
    core.lattice.clear(core.obstacles.as_ref());
    log::debug!("lattice cleared at timestep {}", core.timestep);
}

pub(super) fn draw(core: &mut SimulationCore, x: i64, y: i64, mask: &Mask, kind: CellType) -> usize {
    if kind == CellType::Constant {
        log::warn!("ignoring draw of constant cells at ({}, {})", x, y);
        return 0;
    }
    core.lattice.draw(x, y, mask, kind)
}
