use serde::{Deserialize, Serialize};

use crate::action::{Decision, PlayerId, Selection};
use crate::error::IllegalSelection;

/// Something observable that happened during play.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    TurnStarted {
        player: PlayerId,
        score: u32,
    },
    RollOccurred {
        player: PlayerId,
        /// `(index, face)` of each die that was rolled.
        faces: Vec<(usize, u8)>,
    },
    SelectionAccepted {
        player: PlayerId,
        selection: Selection,
        points: u32,
        pending: u32,
    },
    SelectionRejected {
        player: PlayerId,
        selection: Selection,
        reason: IllegalSelection,
        attempt: usize,
    },
    HotDice {
        player: PlayerId,
        pending: u32,
    },
    DecisionMade {
        player: PlayerId,
        decision: Decision,
    },
    Busted {
        player: PlayerId,
        lost: u32,
    },
    Banked {
        player: PlayerId,
        points: u32,
        total: u32,
    },
    GameWon {
        player: PlayerId,
        score: u32,
    },
}

impl GameEvent {
    pub fn player(&self) -> PlayerId {
        match self {
            GameEvent::TurnStarted { player, .. }
            | GameEvent::RollOccurred { player, .. }
            | GameEvent::SelectionAccepted { player, .. }
            | GameEvent::SelectionRejected { player, .. }
            | GameEvent::HotDice { player, .. }
            | GameEvent::DecisionMade { player, .. }
            | GameEvent::Busted { player, .. }
            | GameEvent::Banked { player, .. }
            | GameEvent::GameWon { player, .. } => *player,
        }
    }
}

/// Receives events as the game controller produces them.
pub trait GameObserver {
    fn on_event(&mut self, event: &GameEvent);
}

impl<F: FnMut(&GameEvent)> GameObserver for F {
    fn on_event(&mut self, event: &GameEvent) {
        self(event)
    }
}
