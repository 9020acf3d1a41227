//! Drawing stencils.

use std::fmt::Write as _;
use std::sync::Arc;

use crate::core::codec::{TextCodec, Tokens};
use crate::core::error::{Result, SimError};
use crate::core::grid::Grid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MaskValue {
    Modify,
    #[default]
    Ignore,
}

/// Stencil centred on the draw position; `Modify` cells get edited.
pub type Mask = Grid<MaskValue>;

/// A mask shared with the engine for the lifetime of one draw request.
pub type SharedMask = Arc<Mask>;

impl TextCodec for MaskValue {
    fn encode(&self, out: &mut String) {
        let _ = write!(out, "{}", if *self == MaskValue::Modify { 'M' } else { 'I' });
    }

    fn decode(tokens: &mut Tokens<'_>) -> Result<Self> {
        match tokens.next_token("mask value")? {
            "M" => Ok(MaskValue::Modify),
            "I" => Ok(MaskValue::Ignore),
            other => Err(SimError::Format(format!("bad mask token {:?}", other))),
        }
    }
}

/// Disk of the given diameter: `Modify` where `dx² + dy² <= r²`, `r = diameter / 2`.
pub fn circle_mask(diameter: usize) -> Mask {
    let r = (diameter / 2) as i64;
    let mut mask = Mask::new(diameter, diameter);
    for iy in 0..diameter {
        for ix in 0..diameter {
            let a = ix as i64 - r;
            let b = iy as i64 - r;
            if a * a + b * b <= r * r {
                mask[(ix, iy)] = MaskValue::Modify;
            }
        }
    }
    mask
}

/// Full rectangle of `Modify` cells.
pub fn solid_mask(width: usize, height: usize) -> Mask {
    Mask::filled(width, height, MaskValue::Modify)
}
