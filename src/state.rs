use serde::{Deserialize, Serialize};

use crate::action::{PlayerId, Selection};
use crate::dice::{
    DEFAULT_WIN_THRESHOLD, DICE_COUNT, Die, MAX_PLAYERS, MAX_SELECTION_ATTEMPTS, MIN_PLAYERS,
};
use crate::error::GameError;
use crate::turn::TurnPhase;

/// Global constants for a running game.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameSettings {
    pub num_players: usize,
    #[serde(default = "default_win_threshold")]
    pub win_threshold: u32,
    #[serde(default = "default_max_selection_attempts")]
    pub max_selection_attempts: usize,
}

fn default_win_threshold() -> u32 {
    DEFAULT_WIN_THRESHOLD
}

fn default_max_selection_attempts() -> usize {
    MAX_SELECTION_ATTEMPTS
}

impl GameSettings {
    pub fn new(num_players: usize) -> Result<Self, GameError> {
        Self {
            num_players,
            win_threshold: DEFAULT_WIN_THRESHOLD,
            max_selection_attempts: MAX_SELECTION_ATTEMPTS,
        }
        .validated()
    }

    /// Checks player count, threshold and retry budget.
    pub fn validated(self) -> Result<Self, GameError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.num_players) {
            return Err(GameError::InvalidConstruction(format!(
                "players must be between {MIN_PLAYERS} and {MAX_PLAYERS}, got {}",
                self.num_players
            )));
        }
        if self.win_threshold == 0 {
            return Err(GameError::InvalidConstruction(
                "win threshold must be at least 1".into(),
            ));
        }
        if self.max_selection_attempts == 0 {
            return Err(GameError::InvalidConstruction(
                "selection attempts must be at least 1".into(),
            ));
        }
        Ok(self)
    }
}

/// Status of the entire game.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum GameStatus {
    Ongoing,
    Finished { winner: PlayerId },
}

/// Banked score of one seated player.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerPublicState {
    pub id: PlayerId,
    pub score: u32,
}

/// Snapshot of the turn in progress, handed to strategies.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TurnView {
    pub player: PlayerId,
    pub own_score: u32,
    /// Other players in seating order, starting after the acting player.
    pub opponents: Vec<PlayerPublicState>,
    pub win_threshold: u32,
    pub phase: TurnPhase,
    pub pending_points: u32,
    pub dice: [Die; DICE_COUNT],
}

impl TurnView {
    /// `(index, face)` for dice still in play.
    pub fn active_faces(&self) -> Vec<(usize, u8)> {
        self.dice
            .iter()
            .enumerate()
            .filter(|(_, die)| die.is_active())
            .map(|(idx, die)| (idx, die.face))
            .collect()
    }

    pub fn active_count(&self) -> usize {
        self.dice.iter().filter(|die| die.is_active()).count()
    }

    pub fn active_mask(&self) -> Selection {
        Selection::from_indices(self.active_faces().into_iter().map(|(idx, _)| idx))
    }

    /// Score the acting player would have after banking now.
    pub fn score_if_banked(&self) -> u32 {
        self.own_score.saturating_add(self.pending_points)
    }
}
