use std::array::from_fn;

use serde::{Deserialize, Serialize};

use crate::action::Selection;
use crate::error::IllegalSelection;
use crate::rng::FaceSource;

pub const DICE_COUNT: usize = 6;
pub const MIN_FACE: u8 = 1;
pub const MAX_FACE: u8 = 6;
pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 8;
pub const DEFAULT_WIN_THRESHOLD: u32 = 10_000;
pub const MAX_SELECTION_ATTEMPTS: usize = 3;

/// A single six-sided die.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Die {
    pub face: u8,
    pub set_aside: bool,
}

impl Die {
    pub fn new() -> Self {
        Self {
            face: MIN_FACE,
            set_aside: false,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        !self.set_aside
    }

    /// Draws a new face unless the die has been set aside.
    pub fn roll(&mut self, faces: &mut dyn FaceSource) {
        if !self.set_aside {
            self.face = faces.next_face();
        }
    }
}

impl Default for Die {
    fn default() -> Self {
        Self::new()
    }
}

/// The six dice shared by every turn of a game.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct DiceSet {
    dice: [Die; DICE_COUNT],
}

impl DiceSet {
    pub fn new() -> Self {
        Self {
            dice: from_fn(|_| Die::new()),
        }
    }

    /// Builds a set showing the given faces, all active. Intended for tests and replays.
    pub fn from_faces(faces: [u8; DICE_COUNT]) -> Self {
        Self {
            dice: from_fn(|idx| Die {
                face: faces[idx],
                set_aside: false,
            }),
        }
    }

    pub fn dice(&self) -> &[Die; DICE_COUNT] {
        &self.dice
    }

    pub fn die(&self, index: usize) -> Option<&Die> {
        self.dice.get(index)
    }

    pub fn faces(&self) -> [u8; DICE_COUNT] {
        from_fn(|idx| self.dice[idx].face)
    }

    /// Rolls every die that is not set aside, in index order.
    pub fn roll_active(&mut self, faces: &mut dyn FaceSource) {
        for die in &mut self.dice {
            die.roll(faces);
        }
    }

    /// Marks the selected dice as set aside. Nothing changes if any index is invalid.
    pub fn set_aside(&mut self, selection: Selection) -> Result<(), IllegalSelection> {
        self.check_selectable(selection)?;
        for index in selection.indices() {
            self.dice[index].set_aside = true;
        }
        Ok(())
    }

    /// Validates that `selection` names only active dice, without changing anything.
    pub fn check_selectable(&self, selection: Selection) -> Result<(), IllegalSelection> {
        if selection.is_empty() {
            return Err(IllegalSelection::Empty);
        }
        if !selection.in_range() {
            return Err(IllegalSelection::OutOfRange(selection.bits()));
        }
        if let Some(index) = selection.indices().find(|idx| self.dice[*idx].set_aside) {
            return Err(IllegalSelection::AlreadySetAside(index));
        }
        Ok(())
    }

    /// Returns every die to play. Faces keep their last value until the next roll.
    pub fn reset_all(&mut self) {
        for die in &mut self.dice {
            die.set_aside = false;
        }
    }

    /// `(index, face)` for each die still in play.
    pub fn active_faces(&self) -> impl Iterator<Item = (usize, u8)> + '_ {
        self.dice
            .iter()
            .enumerate()
            .filter(|(_, die)| die.is_active())
            .map(|(idx, die)| (idx, die.face))
    }

    /// Faces of the selected dice, in index order.
    pub fn faces_of(&self, selection: Selection) -> Vec<u8> {
        selection
            .indices()
            .filter_map(|idx| self.dice.get(idx).map(|die| die.face))
            .collect()
    }

    pub fn active_mask(&self) -> Selection {
        Selection::from_indices(self.active_faces().map(|(idx, _)| idx))
    }

    pub fn active_count(&self) -> usize {
        self.dice.iter().filter(|die| die.is_active()).count()
    }

    pub fn set_aside_count(&self) -> usize {
        DICE_COUNT - self.active_count()
    }

    pub fn all_set_aside(&self) -> bool {
        self.dice.iter().all(|die| die.set_aside)
    }
}

impl Default for DiceSet {
    fn default() -> Self {
        Self::new()
    }
}
