use std::fmt::Write as _;

use super::codec::{TextCodec, Tokens};
use super::error::Result;

/// 2D vector for velocity readouts
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

impl TextCodec for Vec2 {
    fn encode(&self, out: &mut String) {
        let _ = write!(out, "{} {}", self.x, self.y);
    }

    fn decode(tokens: &mut Tokens<'_>) -> Result<Self> {
        let x = tokens.parse("vec2.x")?;
        let y = tokens.parse("vec2.y")?;
        Ok(Self { x, y })
    }
}
