//! Plain-text token codec used by grid and simulation persistence.
//!
//! Values are written as whitespace-separated tokens. Floats use Rust's
//! shortest round-trip formatting, so `parse` gives back the exact bits
//! (including `-0` and subnormals).

use std::fmt::Write as _;
use std::str::{FromStr, SplitWhitespace};

use super::error::{Result, SimError};

/// A value that can be written to and read back from the token stream.
pub trait TextCodec: Sized {
    fn encode(&self, out: &mut String);
    fn decode(tokens: &mut Tokens<'_>) -> Result<Self>;
}

/// Whitespace token reader with context-carrying errors.
pub struct Tokens<'a> {
    inner: SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { inner: text.split_whitespace() }
    }

    pub fn next_token(&mut self, what: &str) -> Result<&'a str> {
        self.inner
            .next()
            .ok_or_else(|| SimError::Format(format!("unexpected end of input reading {}", what)))
    }

    pub fn parse<T: FromStr>(&mut self, what: &str) -> Result<T> {
        let token = self.next_token(what)?;
        token
            .parse::<T>()
            .map_err(|_| SimError::Format(format!("bad {} token {:?}", what, token)))
    }

    /// Fails unless the next token is exactly `tag`.
    pub fn expect(&mut self, tag: &str) -> Result<()> {
        let token = self.next_token(tag)?;
        if token != tag {
            return Err(SimError::Format(format!("expected {:?}, found {:?}", tag, token)));
        }
        Ok(())
    }

    pub fn is_empty(&mut self) -> bool {
        self.inner.clone().next().is_none()
    }
}

impl TextCodec for f32 {
    fn encode(&self, out: &mut String) {
        let _ = write!(out, "{}", self);
    }

    fn decode(tokens: &mut Tokens<'_>) -> Result<Self> {
        tokens.parse("f32")
    }
}

impl TextCodec for f64 {
    fn encode(&self, out: &mut String) {
        let _ = write!(out, "{}", self);
    }

    fn decode(tokens: &mut Tokens<'_>) -> Result<Self> {
        tokens.parse("f64")
    }
}

impl TextCodec for bool {
    fn encode(&self, out: &mut String) {
        out.push(if *self { '1' } else { '0' });
    }

    fn decode(tokens: &mut Tokens<'_>) -> Result<Self> {
        match tokens.next_token("bool")? {
            "1" => Ok(true),
            "0" => Ok(false),
            other => Err(SimError::Format(format!("bad bool token {:?}", other))),
        }
    }
}
