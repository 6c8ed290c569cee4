use std::cmp::Reverse;

use crate::action::{Decision, Selection};
use crate::scoring::combinations;
use crate::state::TurnView;
use crate::strategy::Strategy;

pub const DEFAULT_BANK_THRESHOLD: u32 = 300;
pub const DEFAULT_MIN_DICE_TO_ROLL: usize = 3;

/// Reference player that never needs a retry.
///
/// In plain English:
/// - Set aside the single most valuable combination showing (a straight beats
///   three 1s beats a lone 1). Ties go to the combination using fewer dice so
///   more dice stay in play.
/// - Bank once the turn is worth `bank_threshold` points, when fewer than
///   `min_dice_to_roll` dice would be rolled next, or when banking wins.
#[derive(Clone, Copy, Debug)]
pub struct GreedyStrategy {
    bank_threshold: u32,
    min_dice_to_roll: usize,
}

impl GreedyStrategy {
    pub fn new(bank_threshold: u32, min_dice_to_roll: usize) -> Self {
        Self {
            bank_threshold,
            min_dice_to_roll,
        }
    }
}

impl Default for GreedyStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_BANK_THRESHOLD, DEFAULT_MIN_DICE_TO_ROLL)
    }
}

impl Strategy for GreedyStrategy {
    fn choose_set_aside(&mut self, view: &TurnView) -> Selection {
        combinations(&view.active_faces())
            .into_iter()
            .max_by_key(|combo| (combo.points, Reverse(combo.selection.len())))
            .map(|combo| combo.selection)
            .unwrap_or_else(Selection::empty)
    }

    fn choose_roll_or_bank(&mut self, view: &TurnView) -> Decision {
        if view.score_if_banked() >= view.win_threshold
            || view.pending_points >= self.bank_threshold
            || view.active_count() < self.min_dice_to_roll
        {
            Decision::Bank
        } else {
            Decision::Roll
        }
    }
}
