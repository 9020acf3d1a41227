//! Error types for the engine.
//!
//! Contract violations are surfaced to the immediate caller; numerical
//! instability never shows up here (the collision step corrects it in place).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid action: {0}")]
    InvalidAction(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("grid dimension mismatch: {left_width}x{left_height} vs {right_width}x{right_height}")]
    DimensionMismatch {
        left_width: usize,
        left_height: usize,
        right_width: usize,
        right_height: usize,
    },

    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("malformed input: {0}")]
    Format(String),

    #[error("not a simulation file (header was {0:?})")]
    BadMagic(String),

    #[error("cannot open version {found} file with a version {expected} engine")]
    VersionMismatch { found: String, expected: String },

    #[error("settings error: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("simulation engine has stopped")]
    EngineStopped,
}

pub type Result<T> = std::result::Result<T, SimError>;
