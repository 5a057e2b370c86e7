//! Error types for tempora

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemporaError {
    #[error("Invalid hex color: {0}")]
    InvalidHex(String),
    #[error("Project has no time signature at measure 1")]
    MissingInitialTimeSignature,
    #[error("Invalid time signature: {0}")]
    InvalidTimeSignature(String),
    #[error("Invalid tempo: {0}")]
    InvalidTempo(String),
    #[error("Invalid tpqn: {0}")]
    InvalidTpqn(u32),
    #[error("Invalid snap type: {0}")]
    InvalidSnapType(u32),
}

pub type Result<T> = std::result::Result<T, TemporaError>;
