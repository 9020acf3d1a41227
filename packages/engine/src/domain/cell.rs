//! Lattice cell - nine D2Q9 populations plus a type tag
//!
//! Layout of the populations (row 0 of the lattice is the north edge):
//! ```text
//!   NW  N  NE        (-1,-1) (0,-1) (1,-1)
//!   W   C  E    ->   (-1, 0) (0, 0) (1, 0)
//!   SW  S  SE        (-1, 1) (0, 1) (1, 1)
//! ```
//! A population in direction `d` travels by `d.offset()` during streaming.

use std::fmt::{self, Write as _};
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::core::codec::{TextCodec, Tokens};
use crate::core::error::{Result, SimError};

/// Cell type tag. The integer codes are part of the save format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum CellType {
    Obstacle = 0,
    #[default]
    Fluid = 1,
    Constant = 2,
}

impl CellType {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(CellType::Obstacle),
            1 => Some(CellType::Fluid),
            2 => Some(CellType::Constant),
            _ => None,
        }
    }
}

impl From<CellType> for u8 {
    fn from(kind: CellType) -> u8 {
        kind.code()
    }
}

impl TryFrom<u8> for CellType {
    type Error = String;

    fn try_from(code: u8) -> std::result::Result<Self, Self::Error> {
        CellType::from_code(code).ok_or_else(|| format!("unknown cell type code {}", code))
    }
}

impl fmt::Display for CellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CellType::Obstacle => "obstacle",
            CellType::Fluid => "fluid",
            CellType::Constant => "constant",
        })
    }
}

impl TextCodec for CellType {
    fn encode(&self, out: &mut String) {
        let _ = write!(out, "{}", self.code());
    }

    fn decode(tokens: &mut Tokens<'_>) -> Result<Self> {
        let code: u8 = tokens.parse("cell type")?;
        CellType::from_code(code)
            .ok_or_else(|| SimError::Format(format!("unknown cell type code {}", code)))
    }
}

/// The nine lattice directions, in storage order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum Direction {
    NW = 0,
    N = 1,
    NE = 2,
    W = 3,
    C = 4,
    E = 5,
    SW = 6,
    S = 7,
    SE = 8,
}

impl Direction {
    pub const ALL: [Direction; 9] = [
        Direction::NW,
        Direction::N,
        Direction::NE,
        Direction::W,
        Direction::C,
        Direction::E,
        Direction::SW,
        Direction::S,
        Direction::SE,
    ];

    /// Every direction except the rest population.
    pub const MOVING: [Direction; 8] = [
        Direction::NW,
        Direction::N,
        Direction::NE,
        Direction::W,
        Direction::E,
        Direction::SW,
        Direction::S,
        Direction::SE,
    ];

    /// Lattice displacement `(dx, dy)`; `dy = -1` is north.
    #[inline]
    pub const fn offset(self) -> (isize, isize) {
        let i = self as isize;
        (i % 3 - 1, i / 3 - 1)
    }

    #[inline]
    pub const fn opposite(self) -> Direction {
        Direction::ALL[8 - self as usize]
    }
}

pub const POPULATIONS: usize = 9;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Cell {
    /// Populations indexed by [`Direction`].
    pub f: [f32; POPULATIONS],
    pub kind: CellType,
}

impl Cell {
    pub const fn new(f: [f32; POPULATIONS], kind: CellType) -> Self {
        Self { f, kind }
    }

    pub fn with_kind(mut self, kind: CellType) -> Self {
        self.kind = kind;
        self
    }

    /// Zeroth moment.
    #[inline]
    pub fn density(&self) -> f32 {
        self.f.iter().sum()
    }

    #[inline]
    pub fn is_fluid(&self) -> bool {
        self.kind == CellType::Fluid
    }
}

impl Index<Direction> for Cell {
    type Output = f32;

    #[inline]
    fn index(&self, d: Direction) -> &f32 {
        &self.f[d as usize]
    }
}

impl IndexMut<Direction> for Cell {
    #[inline]
    fn index_mut(&mut self, d: Direction) -> &mut f32 {
        &mut self.f[d as usize]
    }
}

impl TextCodec for Cell {
    fn encode(&self, out: &mut String) {
        for v in &self.f {
            v.encode(out);
            out.push(' ');
        }
        self.kind.encode(out);
    }

    fn decode(tokens: &mut Tokens<'_>) -> Result<Self> {
        let mut f = [0.0f32; POPULATIONS];
        for slot in f.iter_mut() {
            *slot = tokens.parse("population")?;
        }
        let kind = CellType::decode(tokens)?;
        Ok(Self { f, kind })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_follow_storage_layout() {
        assert_eq!(Direction::NW.offset(), (-1, -1));
        assert_eq!(Direction::N.offset(), (0, -1));
        assert_eq!(Direction::C.offset(), (0, 0));
        assert_eq!(Direction::E.offset(), (1, 0));
        assert_eq!(Direction::SE.offset(), (1, 1));
    }

    #[test]
    fn opposite_negates_offset() {
        for d in Direction::ALL {
            let (dx, dy) = d.offset();
            assert_eq!(d.opposite().offset(), (-dx, -dy));
            assert_eq!(d.opposite().opposite(), d);
        }
    }

    #[test]
    fn cell_text_is_nine_floats_then_type_code() {
        let cell = Cell::new([0.0, 1.0, 0.0, 0.0, -0.0, 0.0, 0.0, 0.0, 2.5], CellType::Constant);
        let mut s = String::new();
        cell.encode(&mut s);
        assert_eq!(s, "0 1 0 0 -0 0 0 0 2.5 2");
        let back = Cell::decode(&mut Tokens::new(&s)).unwrap();
        assert_eq!(back.kind, CellType::Constant);
        assert_eq!(back.f[4].to_bits(), (-0.0f32).to_bits());
    }

    #[test]
    fn unknown_type_code_is_a_format_error() {
        let err = Cell::decode(&mut Tokens::new("0 0 0 0 0 0 0 0 0 7")).unwrap_err();
        assert!(matches!(err, SimError::Format(_)));
    }

    #[test]
    fn cell_type_serializes_as_code() {
        assert_eq!(serde_json::to_string(&CellType::Constant).unwrap(), "2");
        let kind: CellType = serde_json::from_str("0").unwrap();
        assert_eq!(kind, CellType::Obstacle);
    }
}
