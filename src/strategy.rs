use crate::action::{Decision, Selection};
use crate::state::TurnView;

/// Interface for defining custom Farkle players.
///
/// Strategies only ever see a [`TurnView`] snapshot; the controller validates
/// every choice against the scoring rules before it touches the game.
pub trait Strategy {
    /// Picks a non-empty subset of the active dice to set aside.
    fn choose_set_aside(&mut self, view: &TurnView) -> Selection;

    /// Called after an accepted selection when dice remain and points are pending.
    fn choose_roll_or_bank(&mut self, view: &TurnView) -> Decision;
}

impl<S: Strategy + ?Sized> Strategy for Box<S> {
    fn choose_set_aside(&mut self, view: &TurnView) -> Selection {
        (**self).choose_set_aside(view)
    }

    fn choose_roll_or_bank(&mut self, view: &TurnView) -> Decision {
        (**self).choose_roll_or_bank(view)
    }
}
