//! Textual grid format: a `Grid` tag line, width, height, then one element
//! per line in row-major order.

use crate::core::codec::{TextCodec, Tokens};
use crate::core::error::{Result, SimError};

use super::Grid;

pub const GRID_TAG: &str = "Grid";

impl<T: TextCodec> Grid<T> {
    pub fn write_text(&self, out: &mut String) {
        out.push_str(GRID_TAG);
        out.push('\n');
        out.push_str(&self.width.to_string());
        out.push('\n');
        out.push_str(&self.height.to_string());
        out.push('\n');
        for value in &self.data {
            value.encode(out);
            out.push('\n');
        }
    }

    /// Replaces storage and dimensions with the next grid in `tokens`.
    ///
    /// On error the grid is left untouched.
    pub fn read_text(&mut self, tokens: &mut Tokens<'_>) -> Result<()> {
        let tag = tokens.next_token("grid tag")?;
        if tag != GRID_TAG {
            return Err(SimError::Format(format!("expected grid tag, found {:?}", tag)));
        }
        let width: usize = tokens.parse("grid width")?;
        let height: usize = tokens.parse("grid height")?;
        let len = width
            .checked_mul(height)
            .ok_or_else(|| SimError::Format(format!("grid {}x{} is too large", width, height)))?;
        let mut data = Vec::with_capacity(len.min(1 << 24));
        for _ in 0..len {
            data.push(T::decode(tokens)?);
        }
        self.width = width;
        self.height = height;
        self.data = data;
        Ok(())
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        self.write_text(&mut out);
        out
    }

    pub fn from_text(text: &str) -> Result<Self> {
        let mut grid = Grid::default();
        grid.read_text(&mut Tokens::new(text))?;
        Ok(grid)
    }
}
