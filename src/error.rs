use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::action::PlayerId;
use crate::turn::TurnPhase;

/// Errors that can occur when building or driving a game.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("invalid construction: {0}")]
    InvalidConstruction(String),
    #[error("player id {0} is not seated in this game")]
    InvalidPlayer(PlayerId),
    #[error("illegal selection: {0}")]
    IllegalSelection(#[from] IllegalSelection),
    #[error("turn is in phase {actual:?}, expected {expected:?}")]
    UnexpectedPhase {
        expected: TurnPhase,
        actual: TurnPhase,
    },
    #[error("turn already ended in phase {phase:?}")]
    TurnOver { phase: TurnPhase },
    #[error("face {0} is outside 1..=6")]
    InvalidFace(u8),
    #[error("game is already over")]
    GameOver,
}

/// Reasons a set-aside selection is refused.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IllegalSelection {
    #[error("selection contains no dice")]
    Empty,
    #[error("selection mask {0:#08b} refers to dice beyond index 5")]
    OutOfRange(u8),
    #[error("die {0} is already set aside")]
    AlreadySetAside(usize),
    #[error("faces {faces:?} do not all contribute to a scoring combination")]
    NonScoring { faces: Vec<u8> },
}
