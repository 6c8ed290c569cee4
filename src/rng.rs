//! Sources of die faces.
//!
//! The game owns exactly one [`FaceSource`] and advances it only when dice are
//! rolled, so a fixed seed plus a fixed sequence of decisions replays a game
//! exactly.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::dice::{MAX_FACE, MIN_FACE};
use crate::error::GameError;

/// Produces uniformly distributed faces in `1..=6`.
pub trait FaceSource {
    fn next_face(&mut self) -> u8;
}

/// Faces drawn from any `rand` generator.
#[derive(Clone, Debug)]
pub struct RngFaces<R: Rng> {
    rng: R,
}

impl<R: Rng> RngFaces<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngFaces<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Non-reproducible source backed by OS entropy.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> FaceSource for RngFaces<R> {
    fn next_face(&mut self) -> u8 {
        self.rng.gen_range(MIN_FACE..=MAX_FACE)
    }
}

/// Replays a fixed list of faces, then continues from a seeded generator.
#[derive(Clone, Debug)]
pub struct ScriptedFaces {
    script: VecDeque<u8>,
    fallback: RngFaces<StdRng>,
}

impl ScriptedFaces {
    pub fn new(script: impl IntoIterator<Item = u8>, fallback_seed: u64) -> Result<Self, GameError> {
        let script: VecDeque<u8> = script.into_iter().collect();
        if let Some(bad) = script
            .iter()
            .copied()
            .find(|face| !(MIN_FACE..=MAX_FACE).contains(face))
        {
            return Err(GameError::InvalidFace(bad));
        }
        Ok(Self {
            script,
            fallback: RngFaces::seeded(fallback_seed),
        })
    }

    /// Number of scripted faces not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl FaceSource for ScriptedFaces {
    fn next_face(&mut self) -> u8 {
        match self.script.pop_front() {
            Some(face) => face,
            None => self.fallback.next_face(),
        }
    }
}
