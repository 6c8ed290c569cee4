//! Farkle (six-dice "Ten Thousand") engine with pluggable player strategies,
//! built for simulations and bot experimentation.

pub mod action;
pub mod dice;
pub mod error;
pub mod event;
pub mod game;
pub mod rng;
pub mod scoring;
pub mod state;
pub mod strategies;
pub mod strategy;
pub mod turn;
pub mod visualize;

pub use crate::action::{Decision, PlayerId, Selection};
pub use crate::dice::{DiceSet, Die};
pub use crate::error::{GameError, IllegalSelection};
pub use crate::event::{GameEvent, GameObserver};
pub use crate::game::{Game, GameBuilder, GameConfig, TurnOutcome, TurnReport};
pub use crate::rng::{FaceSource, RngFaces, ScriptedFaces};
pub use crate::scoring::{Score, legal_selections, score};
pub use crate::state::{GameSettings, GameStatus, PlayerPublicState, TurnView};
pub use crate::strategies::{
    GreedyStrategy, HumanStrategy, RandomStrategy, create_strategy_from_spec, label_for_spec,
};
pub use crate::strategy::Strategy;
pub use crate::turn::{TurnPhase, TurnState};
pub use crate::visualize::{describe_event, describe_selection, render_view};
