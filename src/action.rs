use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dice::DICE_COUNT;

/// Stable identifier of a seated player, chosen at construction.
pub type PlayerId = usize;

/// Bitmask over die indices 0..=5 naming the dice a player sets aside.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Selection(u8);

impl Selection {
    /// Mask covering every die.
    pub const ALL: Selection = Selection((1 << DICE_COUNT) - 1);

    pub const fn empty() -> Self {
        Self(0)
    }

    /// Wraps a raw mask. Bits above index 5 are kept so validation can reject them.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub fn from_indices(indices: impl IntoIterator<Item = usize>) -> Self {
        let mut bits = 0u8;
        for index in indices {
            if index < 8 {
                bits |= 1 << index;
            }
        }
        Self(bits)
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn contains(self, index: usize) -> bool {
        index < 8 && self.0 & (1 << index) != 0
    }

    #[inline]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// True when the mask only names dice 0..=5.
    #[inline]
    pub const fn in_range(self) -> bool {
        self.0 & !Self::ALL.0 == 0
    }

    /// Indices of the selected dice, ascending.
    pub fn indices(self) -> impl Iterator<Item = usize> {
        (0..8).filter(move |index| self.contains(*index))
    }
}

impl fmt::Display for Selection {
    /// Renders as six `0`/`1` characters, die 0 first.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for index in 0..DICE_COUNT {
            f.write_str(if self.contains(index) { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// What a player does with the remaining dice after a selection is accepted.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Decision {
    /// Roll the dice that are still active.
    Roll,
    /// End the turn and credit the pending points.
    Bank,
}
