use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::action::{Decision, PlayerId};
use crate::dice::{DEFAULT_WIN_THRESHOLD, DiceSet, MAX_SELECTION_ATTEMPTS};
use crate::error::GameError;
use crate::event::{GameEvent, GameObserver};
use crate::rng::{FaceSource, RngFaces};
use crate::state::{GameSettings, GameStatus, PlayerPublicState, TurnView};
use crate::strategies::GreedyStrategy;
use crate::strategy::Strategy;
use crate::turn::{RollOutcome, TurnPhase, TurnState};

const DEFAULT_SEED: u64 = 0x5EED_5EED_5EED_5EED;

/// Configuration required to bootstrap a game with default strategies.
#[derive(Clone, Copy, Debug)]
pub struct GameConfig {
    pub num_players: usize,
    pub seed: u64,
    pub win_threshold: u32,
}

impl GameConfig {
    pub fn new(num_players: usize, seed: u64) -> Result<Self, GameError> {
        let settings = GameSettings::new(num_players)?;
        Ok(Self {
            num_players,
            seed,
            win_threshold: settings.win_threshold,
        })
    }
}

/// Builder that enables strategy and face-source injection for tests and simulations.
pub struct GameBuilder {
    settings: GameSettings,
    seed: u64,
    players: Option<Vec<(PlayerId, Box<dyn Strategy>)>>,
    faces: Option<Box<dyn FaceSource>>,
    observers: Vec<Box<dyn GameObserver>>,
}

impl GameBuilder {
    /// `num_players` greedy players with ids `0..num_players`.
    pub fn new(num_players: usize) -> Result<Self, GameError> {
        Ok(Self {
            settings: GameSettings::new(num_players)?,
            seed: DEFAULT_SEED,
            players: None,
            faces: None,
            observers: Vec::new(),
        })
    }

    /// Seats the given players in order. Ids must be unique.
    pub fn from_players(players: Vec<(PlayerId, Box<dyn Strategy>)>) -> Self {
        Self {
            settings: GameSettings {
                num_players: players.len(),
                win_threshold: DEFAULT_WIN_THRESHOLD,
                max_selection_attempts: MAX_SELECTION_ATTEMPTS,
            },
            seed: DEFAULT_SEED,
            players: Some(players),
            faces: None,
            observers: Vec::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Replaces the seeded generator; the seed is then unused.
    pub fn with_faces(mut self, faces: impl FaceSource + 'static) -> Self {
        self.faces = Some(Box::new(faces));
        self
    }

    pub fn with_win_threshold(mut self, win_threshold: u32) -> Self {
        self.settings.win_threshold = win_threshold;
        self
    }

    pub fn with_max_selection_attempts(mut self, attempts: usize) -> Self {
        self.settings.max_selection_attempts = attempts;
        self
    }

    /// Takes threshold and retry budget from `settings`; the player count still
    /// follows the seated players.
    pub fn with_settings(mut self, settings: GameSettings) -> Self {
        self.settings.win_threshold = settings.win_threshold;
        self.settings.max_selection_attempts = settings.max_selection_attempts;
        self
    }

    pub fn with_observer(mut self, observer: impl GameObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    pub fn build(self) -> Result<Game, GameError> {
        Game::from_builder(self)
    }
}

/// How a turn ended.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum TurnOutcome {
    Banked { points: u32 },
    Busted { lost: u32 },
}

/// Everything one call to [`Game::run_turn`] did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnReport {
    pub player: PlayerId,
    pub outcome: TurnOutcome,
    /// Acting player's score after the turn.
    pub score: u32,
    pub winner: Option<PlayerId>,
    pub events: Vec<GameEvent>,
}

struct Seat {
    id: PlayerId,
    score: u32,
    strategy: Box<dyn Strategy>,
}

/// Farkle game controller: owns players, dice and the face source.
pub struct Game {
    settings: GameSettings,
    status: GameStatus,
    current: usize,
    players: Vec<Seat>,
    dice: DiceSet,
    faces: Box<dyn FaceSource>,
    observers: Vec<Box<dyn GameObserver>>,
    turns_played: usize,
}

impl Game {
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        GameBuilder::new(config.num_players)?
            .with_seed(config.seed)
            .with_win_threshold(config.win_threshold)
            .build()
    }

    pub fn with_players(players: Vec<(PlayerId, Box<dyn Strategy>)>) -> Result<Self, GameError> {
        GameBuilder::from_players(players).build()
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn settings(&self) -> GameSettings {
        self.settings
    }

    pub fn current_player(&self) -> PlayerId {
        self.players[self.current].id
    }

    /// Seat index of the player about to act.
    pub fn current_turn_index(&self) -> usize {
        self.current
    }

    pub fn turns_played(&self) -> usize {
        self.turns_played
    }

    pub fn dice(&self) -> &DiceSet {
        &self.dice
    }

    /// Ids and scores in seating order.
    pub fn standings(&self) -> Vec<PlayerPublicState> {
        self.players
            .iter()
            .map(|seat| PlayerPublicState {
                id: seat.id,
                score: seat.score,
            })
            .collect()
    }

    pub fn score_of(&self, player: PlayerId) -> Result<u32, GameError> {
        self.players
            .iter()
            .find(|seat| seat.id == player)
            .map(|seat| seat.score)
            .ok_or(GameError::InvalidPlayer(player))
    }

    pub fn add_observer(&mut self, observer: impl GameObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.status, GameStatus::Finished { .. })
    }

    pub fn winner(&self) -> Option<PlayerId> {
        match self.status {
            GameStatus::Finished { winner } => Some(winner),
            GameStatus::Ongoing => None,
        }
    }

    /// First player in seating order whose score reached the win threshold.
    pub fn check_win(&self) -> Option<PlayerId> {
        self.players
            .iter()
            .find(|seat| seat.score >= self.settings.win_threshold)
            .map(|seat| seat.id)
    }

    /// Plays one full turn for the current player and passes the dice on.
    pub fn run_turn(&mut self) -> Result<TurnReport, GameError> {
        if self.is_finished() {
            return Err(GameError::GameOver);
        }
        Ok(self.drive_turn())
    }

    /// Plays turns until somebody wins and returns the winner.
    ///
    /// Does not return if no strategy ever banks enough points; use
    /// [`Game::play_with_limit`] when that is possible.
    pub fn play(&mut self) -> PlayerId {
        loop {
            if let Some(winner) = self.winner() {
                return winner;
            }
            self.drive_turn();
        }
    }

    /// Like [`Game::play`], but stops after `max_turns` further turns.
    pub fn play_with_limit(&mut self, max_turns: usize) -> Option<PlayerId> {
        for _ in 0..max_turns {
            if self.is_finished() {
                break;
            }
            self.drive_turn();
        }
        self.winner()
    }

    fn from_builder(builder: GameBuilder) -> Result<Self, GameError> {
        let GameBuilder {
            mut settings,
            seed,
            players,
            faces,
            observers,
        } = builder;

        let players = match players {
            Some(players) => players,
            None => (0..settings.num_players)
                .map(|id| (id, Box::new(GreedyStrategy::default()) as Box<dyn Strategy>))
                .collect(),
        };
        settings.num_players = players.len();
        let settings = settings.validated()?;

        let mut seen = HashSet::with_capacity(players.len());
        for (id, _) in &players {
            if !seen.insert(*id) {
                return Err(GameError::InvalidConstruction(format!(
                    "duplicate player id {id}"
                )));
            }
        }

        let faces = faces.unwrap_or_else(|| Box::new(RngFaces::seeded(seed)));
        let players = players
            .into_iter()
            .map(|(id, strategy)| Seat {
                id,
                score: 0,
                strategy,
            })
            .collect();

        Ok(Game {
            settings,
            status: GameStatus::Ongoing,
            current: 0,
            players,
            dice: DiceSet::new(),
            faces,
            observers,
            turns_played: 0,
        })
    }

    fn opponents_of(&self, index: usize) -> Vec<PlayerPublicState> {
        let count = self.players.len();
        (1..count)
            .map(|offset| &self.players[(index + offset) % count])
            .map(|seat| PlayerPublicState {
                id: seat.id,
                score: seat.score,
            })
            .collect()
    }

    fn drive_turn(&mut self) -> TurnReport {
        let index = self.current;
        let opponents = self.opponents_of(index);
        let settings = self.settings;
        self.dice.reset_all();

        let Game {
            players,
            dice,
            faces,
            observers,
            ..
        } = &mut *self;
        let seat = &mut players[index];
        let mut driver = TurnDriver {
            player: seat.id,
            own_score: seat.score,
            opponents,
            settings,
            strategy: &mut seat.strategy,
            dice,
            faces,
            recorder: Recorder {
                events: Vec::new(),
                observers: &mut observers[..],
            },
            turn: TurnState::new(),
            lost: 0,
        };
        driver.run();
        let TurnDriver {
            player,
            turn,
            lost,
            mut recorder,
            ..
        } = driver;

        let outcome = match turn.phase() {
            TurnPhase::Banked => {
                let points = turn.banked_points();
                seat.score = seat.score.saturating_add(points);
                info!(player, points, total = seat.score, "banked");
                recorder.emit(GameEvent::Banked {
                    player,
                    points,
                    total: seat.score,
                });
                TurnOutcome::Banked { points }
            }
            _ => {
                debug!(player, lost, "busted");
                recorder.emit(GameEvent::Busted { player, lost });
                TurnOutcome::Busted { lost }
            }
        };
        let score = seat.score;
        let mut events = std::mem::take(&mut recorder.events);

        let mut winner = None;
        if matches!(outcome, TurnOutcome::Banked { .. }) {
            if let Some(found) = self.check_win() {
                let won_with = self.score_of(found).unwrap_or(score);
                info!(player = found, score = won_with, "game won");
                let event = GameEvent::GameWon {
                    player: found,
                    score: won_with,
                };
                for observer in &mut self.observers {
                    observer.on_event(&event);
                }
                events.push(event);
                self.status = GameStatus::Finished { winner: found };
                winner = Some(found);
            }
        }

        self.current = (self.current + 1) % self.players.len();
        self.turns_played += 1;

        TurnReport {
            player,
            outcome,
            score,
            winner,
            events,
        }
    }
}

/// Collects events for the turn report and forwards them to observers.
struct Recorder<'g> {
    events: Vec<GameEvent>,
    observers: &'g mut [Box<dyn GameObserver>],
}

impl Recorder<'_> {
    fn emit(&mut self, event: GameEvent) {
        for observer in self.observers.iter_mut() {
            observer.on_event(&event);
        }
        self.events.push(event);
    }
}

/// Drives one turn's state machine with exclusive access to the game's dice,
/// face source and the acting player's strategy.
struct TurnDriver<'g> {
    player: PlayerId,
    own_score: u32,
    opponents: Vec<PlayerPublicState>,
    settings: GameSettings,
    strategy: &'g mut Box<dyn Strategy>,
    dice: &'g mut DiceSet,
    faces: &'g mut Box<dyn FaceSource>,
    recorder: Recorder<'g>,
    turn: TurnState,
    lost: u32,
}

impl TurnDriver<'_> {
    fn run(&mut self) {
        self.recorder.emit(GameEvent::TurnStarted {
            player: self.player,
            score: self.own_score,
        });
        if let Err(err) = self.step_until_done() {
            error!(player = self.player, %err, "turn aborted, treating as bust");
            self.lost = self.turn.pending_points();
            let _ = self.turn.force_bust();
        }
    }

    fn step_until_done(&mut self) -> Result<(), GameError> {
        while !self.turn.is_finished() {
            match self.turn.phase() {
                TurnPhase::AwaitingRoll => self.roll()?,
                TurnPhase::AwaitingSelection => self.select()?,
                TurnPhase::Busted | TurnPhase::Banked => break,
            }
        }
        Ok(())
    }

    fn roll(&mut self) -> Result<(), GameError> {
        let pending = self.turn.pending_points();
        let outcome = self.turn.roll(self.dice, &mut **self.faces)?;
        let faces: Vec<(usize, u8)> = self.dice.active_faces().collect();
        debug!(player = self.player, ?faces, "rolled");
        self.recorder.emit(GameEvent::RollOccurred {
            player: self.player,
            faces,
        });
        if outcome == RollOutcome::Bust {
            self.lost = pending;
        }
        Ok(())
    }

    fn select(&mut self) -> Result<(), GameError> {
        let mut accepted = None;
        for attempt in 1..=self.settings.max_selection_attempts {
            let view = self.view();
            let selection = self.strategy.choose_set_aside(&view);
            match self.turn.accept_selection(self.dice, selection) {
                Ok(found) => {
                    accepted = Some(found);
                    break;
                }
                Err(GameError::IllegalSelection(reason)) => {
                    warn!(player = self.player, attempt, %selection, %reason, "selection rejected");
                    self.recorder.emit(GameEvent::SelectionRejected {
                        player: self.player,
                        selection,
                        reason,
                        attempt,
                    });
                }
                Err(other) => return Err(other),
            }
        }

        let Some(accepted) = accepted else {
            warn!(
                player = self.player,
                attempts = self.settings.max_selection_attempts,
                "no legal selection offered, forcing bust"
            );
            self.lost = self.turn.pending_points();
            return self.turn.force_bust();
        };

        debug!(
            player = self.player,
            selection = %accepted.selection,
            points = accepted.points,
            pending = self.turn.pending_points(),
            "selection accepted"
        );
        self.recorder.emit(GameEvent::SelectionAccepted {
            player: self.player,
            selection: accepted.selection,
            points: accepted.points,
            pending: self.turn.pending_points(),
        });

        if accepted.hot_dice {
            self.recorder.emit(GameEvent::HotDice {
                player: self.player,
                pending: self.turn.pending_points(),
            });
            return Ok(());
        }

        let view = self.view();
        let decision = self.strategy.choose_roll_or_bank(&view);
        self.recorder.emit(GameEvent::DecisionMade {
            player: self.player,
            decision,
        });
        match decision {
            Decision::Bank => {
                self.turn.bank()?;
            }
            Decision::Roll => self.turn.keep_rolling()?,
        }
        Ok(())
    }

    fn view(&self) -> TurnView {
        TurnView {
            player: self.player,
            own_score: self.own_score,
            opponents: self.opponents.clone(),
            win_threshold: self.settings.win_threshold,
            phase: self.turn.phase(),
            pending_points: self.turn.pending_points(),
            dice: *self.dice.dice(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Selection;

    struct FirstScoringDie;

    impl Strategy for FirstScoringDie {
        fn choose_set_aside(&mut self, view: &TurnView) -> Selection {
            view.active_faces()
                .into_iter()
                .find(|(_, face)| *face == 1 || *face == 5)
                .map(|(idx, _)| Selection::from_indices([idx]))
                .unwrap_or_else(|| view.active_mask())
        }

        fn choose_roll_or_bank(&mut self, _view: &TurnView) -> Decision {
            Decision::Bank
        }
    }

    #[test]
    fn opponents_start_after_acting_player() {
        let players: Vec<(PlayerId, Box<dyn Strategy>)> = vec![
            (10, Box::new(FirstScoringDie)),
            (20, Box::new(FirstScoringDie)),
            (30, Box::new(FirstScoringDie)),
        ];
        let game = Game::with_players(players).expect("valid game");
        let ids: Vec<_> = game.opponents_of(1).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![30, 10]);
    }

    #[test]
    fn default_builder_seats_greedy_players() {
        let game = GameBuilder::new(3).expect("builder").build().expect("game");
        let ids: Vec<_> = game.standings().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(game.current_player(), 0);
        assert_eq!(game.settings().win_threshold, 10_000);
    }
}
