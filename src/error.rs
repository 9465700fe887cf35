use thiserror::Error;

use crate::motor::codec::CodecError;
use crate::motor::MotorId;

/// Errors surfaced by the arm controller to its caller
#[derive(Debug, Error)]
pub enum ArmError {
    #[error("There is no motor named {0}")]
    UnknownMotor(String),

    #[error("Position {value} for {id} is outside 0..=65535")]
    PositionOutOfRange { id: MotorId, value: i64 },

    #[error("Failed to encode position frame: {0}")]
    Encoding(#[from] CodecError),

    #[error("No sequence is being edited")]
    NoOpenSequence,

    #[error("No saved sequence at index {index} ({len} saved)")]
    SequenceNotFound { index: usize, len: usize },

    #[error("Sequence {sequence} has no move {index}")]
    MoveNotFound { sequence: usize, index: usize },

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ArmError>;
