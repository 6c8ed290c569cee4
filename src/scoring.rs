//! Scoring rules for set-aside dice.
//!
//! Canonical table:
//!   straight 1-6 .................. 1500
//!   three pairs (six dice) ........ 1500
//!   six / five / four of a kind ... 3000 / 2000 / 1000
//!   three 1s ...................... 1000
//!   three of a kind (2..=6) ....... 100 * face
//!   single 1 / single 5 ........... 100 / 50
//!
//! A selection is legal only if every die in it belongs to a combination. An
//! n-of-a-kind takes every die of its face, so four 1s score 1000, never
//! three 1s plus a single.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::action::Selection;
use crate::dice::{DICE_COUNT, MAX_FACE, MIN_FACE};

/// Result of scoring a multiset of faces.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Score {
    Legal { points: u32, used_all: bool },
    Illegal,
}

impl Score {
    pub fn is_legal(&self) -> bool {
        matches!(self, Score::Legal { .. })
    }

    pub fn points(&self) -> Option<u32> {
        match self {
            Score::Legal { points, .. } => Some(*points),
            Score::Illegal => None,
        }
    }
}

/// A single scoring pattern.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum CombinationKind {
    Straight,
    ThreePairs,
    OfAKind { face: u8, count: u8 },
    Single(u8),
}

impl CombinationKind {
    pub fn points(self) -> u32 {
        match self {
            CombinationKind::Straight | CombinationKind::ThreePairs => 1500,
            CombinationKind::OfAKind { count: 6, .. } => 3000,
            CombinationKind::OfAKind { count: 5, .. } => 2000,
            CombinationKind::OfAKind { count: 4, .. } => 1000,
            CombinationKind::OfAKind { face: 1, .. } => 1000,
            CombinationKind::OfAKind { face, .. } => 100 * face as u32,
            CombinationKind::Single(1) => 100,
            CombinationKind::Single(5) => 50,
            CombinationKind::Single(_) => 0,
        }
    }

    pub fn dice(self) -> usize {
        match self {
            CombinationKind::Straight | CombinationKind::ThreePairs => DICE_COUNT,
            CombinationKind::OfAKind { count, .. } => count as usize,
            CombinationKind::Single(_) => 1,
        }
    }
}

impl fmt::Display for CombinationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CombinationKind::Straight => f.write_str("straight"),
            CombinationKind::ThreePairs => f.write_str("three pairs"),
            CombinationKind::OfAKind { face, count } => write!(f, "{count} x {face}"),
            CombinationKind::Single(face) => write!(f, "single {face}"),
        }
    }
}

/// A scoring pattern located on specific dice.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Combination {
    pub kind: CombinationKind,
    pub selection: Selection,
    pub points: u32,
}

/// Face histogram, indexed by face value.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct FaceCounts([u8; 7]);

impl FaceCounts {
    /// Returns `None` if any face lies outside `1..=6`.
    pub fn from_faces(faces: &[u8]) -> Option<Self> {
        let mut counts = [0u8; 7];
        for &face in faces {
            if !(MIN_FACE..=MAX_FACE).contains(&face) {
                return None;
            }
            counts[face as usize] = counts[face as usize].saturating_add(1);
        }
        Some(Self(counts))
    }

    #[inline]
    pub fn get(&self, face: u8) -> u8 {
        self.0.get(face as usize).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.0.iter().map(|count| *count as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_straight(&self) -> bool {
        (MIN_FACE..=MAX_FACE).all(|face| self.get(face) == 1)
    }

    fn is_three_pairs(&self) -> bool {
        self.len() == DICE_COUNT && (MIN_FACE..=MAX_FACE).filter(|f| self.get(*f) == 2).count() == 3
    }
}

/// How a legal multiset splits into combinations.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    pub parts: Vec<CombinationKind>,
    pub points: u32,
}

/// Scores a multiset of 1 to 6 faces. Order of the input is irrelevant.
pub fn score(faces: &[u8]) -> Score {
    match breakdown(faces) {
        Some(found) => Score::Legal {
            points: found.points,
            used_all: true,
        },
        None => Score::Illegal,
    }
}

/// The highest-scoring decomposition of `faces`, or `None` when no legal one exists.
pub fn breakdown(faces: &[u8]) -> Option<Breakdown> {
    if faces.is_empty() || faces.len() > DICE_COUNT {
        return None;
    }
    let counts = FaceCounts::from_faces(faces)?;

    let mut candidates: Vec<Vec<CombinationKind>> = Vec::with_capacity(2);
    if counts.is_straight() {
        candidates.push(vec![CombinationKind::Straight]);
    }
    if counts.is_three_pairs() {
        candidates.push(vec![CombinationKind::ThreePairs]);
    }
    if let Some(parts) = greedy_groups(counts) {
        candidates.push(parts);
    }

    candidates
        .into_iter()
        .map(|parts| {
            let points = parts.iter().map(|kind| kind.points()).sum();
            Breakdown { parts, points }
        })
        .max_by_key(|found| found.points)
}

/// Extracts n-of-a-kind groups largest first, then single 1s and 5s.
fn greedy_groups(mut counts: FaceCounts) -> Option<Vec<CombinationKind>> {
    let mut parts = Vec::new();
    for n in (3..=DICE_COUNT as u8).rev() {
        for face in MIN_FACE..=MAX_FACE {
            if counts.0[face as usize] == n {
                parts.push(CombinationKind::OfAKind { face, count: n });
                counts.0[face as usize] = 0;
            }
        }
    }
    for face in [1u8, 5] {
        for _ in 0..counts.0[face as usize] {
            parts.push(CombinationKind::Single(face));
        }
        counts.0[face as usize] = 0;
    }
    if counts.is_empty() { Some(parts) } else { None }
}

/// True when some non-empty subset of `faces` scores. A roll without one busts.
pub fn has_scoring_selection(faces: &[u8]) -> bool {
    let Some(counts) = FaceCounts::from_faces(faces) else {
        return false;
    };
    counts.get(1) > 0
        || counts.get(5) > 0
        || (MIN_FACE..=MAX_FACE).any(|face| counts.get(face) >= 3)
        || counts.is_three_pairs()
}

/// Every non-empty subset of `active` dice that scores, with its points.
///
/// `active` holds `(die index, face)` pairs as produced by
/// [`DiceSet::active_faces`](crate::dice::DiceSet::active_faces).
pub fn legal_selections(active: &[(usize, u8)]) -> Vec<(Selection, u32)> {
    let mask = Selection::from_indices(active.iter().map(|(idx, _)| *idx)).bits();
    let mut out = Vec::new();
    let mut sub = mask;
    while sub != 0 {
        let selection = Selection::from_bits(sub);
        let faces: Vec<u8> = active
            .iter()
            .filter(|(idx, _)| selection.contains(*idx))
            .map(|(_, face)| *face)
            .collect();
        if let Some(points) = score(&faces).points() {
            out.push((selection, points));
        }
        sub = (sub - 1) & mask;
    }
    out
}

/// Distinct combinations visible among `active` dice.
///
/// Straight and three pairs only appear when all six dice are active. Every
/// 1 and 5 is also listed as a single, even when it belongs to a larger group.
pub fn combinations(active: &[(usize, u8)]) -> Vec<Combination> {
    let faces: Vec<u8> = active.iter().map(|(_, face)| *face).collect();
    let Some(counts) = FaceCounts::from_faces(&faces) else {
        return Vec::new();
    };
    let all = Selection::from_indices(active.iter().map(|(idx, _)| *idx));
    let mut out = Vec::new();

    if counts.is_straight() {
        out.push(located(CombinationKind::Straight, all));
    }
    if counts.is_three_pairs() {
        out.push(located(CombinationKind::ThreePairs, all));
    }
    for face in MIN_FACE..=MAX_FACE {
        let count = counts.get(face);
        if count >= 3 {
            let selection = Selection::from_indices(
                active
                    .iter()
                    .filter(|(_, f)| *f == face)
                    .map(|(idx, _)| *idx),
            );
            out.push(located(CombinationKind::OfAKind { face, count }, selection));
        }
    }
    for (idx, face) in active {
        if *face == 1 || *face == 5 {
            out.push(located(
                CombinationKind::Single(*face),
                Selection::from_indices([*idx]),
            ));
        }
    }
    out
}

fn located(kind: CombinationKind, selection: Selection) -> Combination {
    Combination {
        kind,
        selection,
        points: kind.points(),
    }
}
