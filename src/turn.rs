use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::action::Selection;
use crate::dice::DiceSet;
use crate::error::{GameError, IllegalSelection};
use crate::rng::FaceSource;
use crate::scoring::{Score, has_scoring_selection, score};

/// Phase of the turn in progress.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TurnPhase {
    AwaitingRoll,
    AwaitingSelection,
    Busted,
    Banked,
}

impl TurnPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, TurnPhase::Busted | TurnPhase::Banked)
    }
}

/// What a roll produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RollOutcome {
    /// At least one scoring selection is available.
    Scoring,
    /// Nothing scores; the turn is over and pending points are lost.
    Bust,
}

/// Result of an accepted selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Accepted {
    pub selection: Selection,
    pub points: u32,
    /// All six dice were set aside and have been returned to play.
    pub hot_dice: bool,
}

/// Per-turn bookkeeping: points accrued so far and where the turn stands.
///
/// The dice and the face source are borrowed per call so the owning game
/// keeps them between turns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnState {
    pending_points: u32,
    phase: TurnPhase,
}

impl TurnState {
    /// Fresh turn: nothing pending, waiting for the first roll.
    pub fn new() -> Self {
        Self {
            pending_points: 0,
            phase: TurnPhase::AwaitingRoll,
        }
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn pending_points(&self) -> u32 {
        self.pending_points
    }

    pub fn is_finished(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Points credited to the player if the turn ended now in its current phase.
    pub fn banked_points(&self) -> u32 {
        match self.phase {
            TurnPhase::Banked => self.pending_points,
            _ => 0,
        }
    }

    /// Rolls the active dice and moves to selection, or busts if nothing scores.
    pub fn roll(
        &mut self,
        dice: &mut DiceSet,
        faces: &mut dyn FaceSource,
    ) -> Result<RollOutcome, GameError> {
        self.expect_phase(TurnPhase::AwaitingRoll)?;
        dice.roll_active(faces);
        let active: Vec<u8> = dice.active_faces().map(|(_, face)| face).collect();
        if has_scoring_selection(&active) {
            self.phase = TurnPhase::AwaitingSelection;
            Ok(RollOutcome::Scoring)
        } else {
            self.bust();
            Ok(RollOutcome::Bust)
        }
    }

    /// Validates `selection` against the dice, sets it aside and adds its points.
    ///
    /// An illegal selection leaves both the dice and the turn unchanged. When the
    /// last active dice are set aside, every die returns to play and the turn
    /// goes back to [`TurnPhase::AwaitingRoll`].
    pub fn accept_selection(
        &mut self,
        dice: &mut DiceSet,
        selection: Selection,
    ) -> Result<Accepted, GameError> {
        self.expect_phase(TurnPhase::AwaitingSelection)?;
        dice.check_selectable(selection)?;
        let faces = dice.faces_of(selection);
        let points = match score(&faces) {
            Score::Legal { points, .. } => points,
            Score::Illegal => return Err(IllegalSelection::NonScoring { faces }.into()),
        };
        dice.set_aside(selection)?;
        self.pending_points += points;

        let hot_dice = dice.all_set_aside();
        if hot_dice {
            debug!(pending = self.pending_points, "hot dice, returning all dice to play");
            dice.reset_all();
            self.phase = TurnPhase::AwaitingRoll;
        }
        Ok(Accepted {
            selection,
            points,
            hot_dice,
        })
    }

    /// Ends the turn keeping the pending points.
    pub fn bank(&mut self) -> Result<u32, GameError> {
        self.expect_phase(TurnPhase::AwaitingSelection)?;
        self.phase = TurnPhase::Banked;
        Ok(self.pending_points)
    }

    /// Continues the turn with the dice still active.
    pub fn keep_rolling(&mut self) -> Result<(), GameError> {
        self.expect_phase(TurnPhase::AwaitingSelection)?;
        self.phase = TurnPhase::AwaitingRoll;
        Ok(())
    }

    /// Ends the turn with nothing credited, e.g. after repeated illegal selections.
    pub fn force_bust(&mut self) -> Result<(), GameError> {
        if self.phase.is_terminal() {
            return Err(GameError::TurnOver { phase: self.phase });
        }
        self.bust();
        Ok(())
    }

    fn bust(&mut self) {
        self.pending_points = 0;
        self.phase = TurnPhase::Busted;
    }

    fn expect_phase(&self, expected: TurnPhase) -> Result<(), GameError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(GameError::UnexpectedPhase {
                expected,
                actual: self.phase,
            })
        }
    }
}

impl Default for TurnState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedFaces;

    fn script(faces: &[u8]) -> ScriptedFaces {
        ScriptedFaces::new(faces.iter().copied(), 1).expect("valid faces")
    }

    #[test]
    fn starts_awaiting_roll_with_nothing_pending() {
        let turn = TurnState::new();
        assert_eq!(turn.phase(), TurnPhase::AwaitingRoll);
        assert_eq!(turn.pending_points(), 0);
    }

    #[test]
    fn scoring_roll_then_bank() {
        let mut dice = DiceSet::new();
        let mut faces = script(&[1, 2, 3, 4, 6, 6]);
        let mut turn = TurnState::new();
        assert_eq!(turn.roll(&mut dice, &mut faces).unwrap(), RollOutcome::Scoring);
        let accepted = turn
            .accept_selection(&mut dice, Selection::from_indices([0]))
            .unwrap();
        assert_eq!(accepted.points, 100);
        assert!(!accepted.hot_dice);
        assert_eq!(turn.bank().unwrap(), 100);
        assert_eq!(turn.phase(), TurnPhase::Banked);
        assert_eq!(turn.banked_points(), 100);
    }

    #[test]
    fn bust_discards_pending_points() {
        let mut dice = DiceSet::new();
        let mut faces = script(&[5, 2, 3, 4, 6, 6, 2, 3, 4, 6, 6]);
        let mut turn = TurnState::new();
        turn.roll(&mut dice, &mut faces).unwrap();
        turn.accept_selection(&mut dice, Selection::from_indices([0]))
            .unwrap();
        assert_eq!(turn.pending_points(), 50);
        turn.keep_rolling().unwrap();
        assert_eq!(turn.roll(&mut dice, &mut faces).unwrap(), RollOutcome::Bust);
        assert_eq!(turn.phase(), TurnPhase::Busted);
        assert_eq!(turn.pending_points(), 0);
        assert_eq!(turn.banked_points(), 0);
    }

    #[test]
    fn illegal_selection_changes_nothing() {
        let mut dice = DiceSet::new();
        let mut faces = script(&[1, 2, 3, 4, 6, 6]);
        let mut turn = TurnState::new();
        turn.roll(&mut dice, &mut faces).unwrap();
        let err = turn
            .accept_selection(&mut dice, Selection::from_indices([0, 1]))
            .unwrap_err();
        assert!(matches!(
            err,
            GameError::IllegalSelection(IllegalSelection::NonScoring { .. })
        ));
        assert_eq!(dice.set_aside_count(), 0);
        assert_eq!(turn.pending_points(), 0);
        assert_eq!(turn.phase(), TurnPhase::AwaitingSelection);
    }

    #[test]
    fn hot_dice_resets_and_keeps_points() {
        let mut dice = DiceSet::new();
        let mut faces = script(&[1, 2, 3, 4, 5, 6]);
        let mut turn = TurnState::new();
        turn.roll(&mut dice, &mut faces).unwrap();
        let accepted = turn.accept_selection(&mut dice, Selection::ALL).unwrap();
        assert!(accepted.hot_dice);
        assert_eq!(turn.pending_points(), 1500);
        assert_eq!(turn.phase(), TurnPhase::AwaitingRoll);
        assert_eq!(dice.active_count(), 6);
    }

    #[test]
    fn out_of_order_calls_are_rejected() {
        let mut dice = DiceSet::new();
        let mut turn = TurnState::new();
        assert!(matches!(
            turn.bank(),
            Err(GameError::UnexpectedPhase {
                expected: TurnPhase::AwaitingSelection,
                actual: TurnPhase::AwaitingRoll
            })
        ));
        assert!(
            turn.accept_selection(&mut dice, Selection::ALL)
                .is_err()
        );
        turn.force_bust().unwrap();
        assert!(matches!(
            turn.force_bust(),
            Err(GameError::TurnOver {
                phase: TurnPhase::Busted
            })
        ));
    }

    #[test]
    fn set_aside_count_only_drops_at_hot_dice() {
        let mut dice = DiceSet::new();
        let mut faces = script(&[
            1, 5, 2, 3, 4, 6, // set aside die 0
            5, 2, 3, 4, 6, // die 1
            1, 1, 1, 5, // dice 2..=5, hot dice
            1, 2, 3, 4, 6, 6, // die 0 again
        ]);
        let plan = [
            Selection::from_indices([0]),
            Selection::from_indices([1]),
            Selection::from_indices([2, 3, 4, 5]),
            Selection::from_indices([0]),
        ];
        let mut turn = TurnState::new();
        let mut previous = dice.set_aside_count();
        let mut resets = 0;
        for (step, selection) in plan.into_iter().enumerate() {
            assert_eq!(turn.roll(&mut dice, &mut faces).unwrap(), RollOutcome::Scoring);
            assert_eq!(dice.set_aside_count(), previous);
            let accepted = turn.accept_selection(&mut dice, selection).unwrap();
            let now = dice.set_aside_count();
            if accepted.hot_dice {
                assert_eq!(previous + selection.len(), 6);
                assert_eq!(now, 0);
                resets += 1;
            } else {
                assert!(now > previous, "step {step}: {previous} -> {now}");
                turn.keep_rolling().unwrap();
            }
            previous = now;
        }
        assert_eq!(resets, 1);
        assert_eq!(turn.pending_points(), 100 + 50 + 1050 + 100);
    }
}
