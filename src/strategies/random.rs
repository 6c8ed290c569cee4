use rand::Rng;
use rand::seq::SliceRandom;

use crate::action::{Decision, Selection};
use crate::scoring::legal_selections;
use crate::state::TurnView;
use crate::strategy::Strategy;

pub const DEFAULT_BANK_PROBABILITY: f64 = 0.5;

/// Baseline player that samples uniformly from the legal selections and flips
/// a coin to decide whether to bank.
pub struct RandomStrategy<R: Rng> {
    rng: R,
    bank_probability: f64,
}

impl<R: Rng> RandomStrategy<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            bank_probability: DEFAULT_BANK_PROBABILITY,
        }
    }

    /// Probability in `[0, 1]` of banking after each accepted selection.
    /// Out-of-range values are clamped; NaN keeps the coin flip.
    pub fn with_bank_probability(mut self, probability: f64) -> Self {
        self.bank_probability = if probability.is_nan() {
            DEFAULT_BANK_PROBABILITY
        } else {
            probability.clamp(0.0, 1.0)
        };
        self
    }
}

impl<R: Rng> Strategy for RandomStrategy<R> {
    fn choose_set_aside(&mut self, view: &TurnView) -> Selection {
        legal_selections(&view.active_faces())
            .choose(&mut self.rng)
            .map(|(selection, _)| *selection)
            .unwrap_or_else(Selection::empty)
    }

    fn choose_roll_or_bank(&mut self, _view: &TurnView) -> Decision {
        if self.rng.gen_bool(self.bank_probability) {
            Decision::Bank
        } else {
            Decision::Roll
        }
    }
}
