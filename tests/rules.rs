use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use farklebot::error::IllegalSelection;
use farklebot::game::TurnOutcome;
use farklebot::{
    Decision, Game, GameBuilder, GameConfig, GameError, GameEvent, GameStatus, GreedyStrategy,
    PlayerId, ScriptedFaces, Selection, Strategy, TurnView,
};

/// Plays back fixed selections and decisions; falls back to an empty
/// selection and banking once the script runs out.
struct Scripted {
    selections: VecDeque<Selection>,
    decisions: VecDeque<Decision>,
    asked: Rc<Cell<usize>>,
}

impl Scripted {
    fn new(
        selections: impl IntoIterator<Item = Selection>,
        decisions: impl IntoIterator<Item = Decision>,
    ) -> Self {
        Self {
            selections: selections.into_iter().collect(),
            decisions: decisions.into_iter().collect(),
            asked: Rc::new(Cell::new(0)),
        }
    }

    fn counter(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.asked)
    }
}

impl Strategy for Scripted {
    fn choose_set_aside(&mut self, _view: &TurnView) -> Selection {
        self.asked.set(self.asked.get() + 1);
        self.selections.pop_front().unwrap_or_else(Selection::empty)
    }

    fn choose_roll_or_bank(&mut self, _view: &TurnView) -> Decision {
        self.decisions.pop_front().unwrap_or(Decision::Bank)
    }
}

fn seated(first: impl Strategy + 'static, others: usize) -> Vec<(PlayerId, Box<dyn Strategy>)> {
    let mut players: Vec<(PlayerId, Box<dyn Strategy>)> = vec![(0, Box::new(first))];
    for id in 1..=others {
        players.push((id, Box::new(GreedyStrategy::default())));
    }
    players
}

#[test]
fn straight_then_hot_dice_then_bank() -> Result<(), GameError> {
    let faces = ScriptedFaces::new([1, 2, 3, 4, 5, 6, 1, 1, 1, 5, 5, 2], 7)?;
    let strategy = Scripted::new(
        [Selection::ALL, Selection::from_indices([0, 1, 2, 3, 4])],
        [Decision::Bank],
    );
    let mut game = GameBuilder::from_players(seated(strategy, 1))
        .with_faces(faces)
        .build()?;

    let report = game.run_turn()?;
    assert_eq!(report.player, 0);
    assert_eq!(report.outcome, TurnOutcome::Banked { points: 2600 });
    assert_eq!(game.score_of(0)?, 2600);

    let accepted: Vec<(u32, u32)> = report
        .events
        .iter()
        .filter_map(|event| match event {
            GameEvent::SelectionAccepted { points, pending, .. } => Some((*points, *pending)),
            _ => None,
        })
        .collect();
    assert_eq!(accepted, vec![(1500, 1500), (1100, 2600)]);
    assert!(
        report
            .events
            .iter()
            .any(|event| matches!(event, GameEvent::HotDice { pending: 1500, .. }))
    );
    // Hot dice rolls on without asking the strategy.
    let decisions = report
        .events
        .iter()
        .filter(|event| matches!(event, GameEvent::DecisionMade { .. }))
        .count();
    assert_eq!(decisions, 1);
    Ok(())
}

#[test]
fn non_scoring_roll_busts_without_consulting_strategy() -> Result<(), GameError> {
    let faces = ScriptedFaces::new([2, 3, 4, 6, 2, 3], 7)?;
    let strategy = Scripted::new([], []);
    let asked = strategy.counter();
    let mut game = GameBuilder::from_players(seated(strategy, 1))
        .with_faces(faces)
        .build()?;

    let report = game.run_turn()?;
    assert_eq!(report.outcome, TurnOutcome::Busted { lost: 0 });
    assert_eq!(asked.get(), 0);
    assert_eq!(game.score_of(0)?, 0);
    assert_eq!(game.current_player(), 1);
    Ok(())
}

#[test]
fn three_pairs_is_a_scoring_roll() -> Result<(), GameError> {
    let faces = ScriptedFaces::new([2, 2, 3, 3, 4, 4, 6, 6, 6, 2, 3, 4], 7)?;
    let strategy = Scripted::new([Selection::ALL], []);
    let mut game = GameBuilder::from_players(seated(strategy, 1))
        .with_faces(faces)
        .build()?;

    // Hot dice after the pairs, then 6-6-6 on the reroll. The script is out of
    // selections, so the empty mask is offered until the retries run out.
    let report = game.run_turn()?;
    assert_eq!(report.outcome, TurnOutcome::Busted { lost: 1500 });
    Ok(())
}

#[test]
fn repeated_illegal_selection_forces_bust() -> Result<(), GameError> {
    let faces = ScriptedFaces::new([1, 2, 3, 4, 6, 6, 5, 2, 3, 4, 6], 7)?;
    let not_scoring = Selection::from_indices([2]);
    let strategy = Scripted::new(
        [
            Selection::from_indices([0]),
            not_scoring,
            not_scoring,
            not_scoring,
        ],
        [Decision::Roll],
    );
    let asked = strategy.counter();
    let mut game = GameBuilder::from_players(seated(strategy, 1))
        .with_faces(faces)
        .build()?;

    let report = game.run_turn()?;
    assert_eq!(report.outcome, TurnOutcome::Busted { lost: 100 });
    assert_eq!(asked.get(), 4);

    let attempts: Vec<usize> = report
        .events
        .iter()
        .filter_map(|event| match event {
            GameEvent::SelectionRejected {
                attempt, reason, ..
            } => {
                assert!(matches!(reason, IllegalSelection::NonScoring { .. }));
                Some(*attempt)
            }
            _ => None,
        })
        .collect();
    assert_eq!(attempts, vec![1, 2, 3]);
    assert_eq!(game.score_of(0)?, 0);
    Ok(())
}

#[test]
fn empty_selection_uses_up_an_attempt() -> Result<(), GameError> {
    let faces = ScriptedFaces::new([2, 3, 4, 6, 6, 5], 7)?;
    let strategy = Scripted::new(
        [
            Selection::empty(),
            Selection::empty(),
            Selection::from_indices([5]),
        ],
        [Decision::Bank],
    );
    let mut game = GameBuilder::from_players(seated(strategy, 1))
        .with_faces(faces)
        .build()?;

    let report = game.run_turn()?;
    assert_eq!(report.outcome, TurnOutcome::Banked { points: 50 });
    let rejected = report
        .events
        .iter()
        .filter(|event| {
            matches!(
                event,
                GameEvent::SelectionRejected {
                    reason: IllegalSelection::Empty,
                    ..
                }
            )
        })
        .count();
    assert_eq!(rejected, 2);
    Ok(())
}

#[test]
fn retry_budget_is_configurable() -> Result<(), GameError> {
    let faces = ScriptedFaces::new([2, 3, 4, 6, 6, 5], 7)?;
    let strategy = Scripted::new([Selection::empty(), Selection::from_indices([5])], []);
    let mut game = GameBuilder::from_players(seated(strategy, 1))
        .with_faces(faces)
        .with_max_selection_attempts(1)
        .build()?;

    let report = game.run_turn()?;
    assert_eq!(report.outcome, TurnOutcome::Busted { lost: 0 });
    Ok(())
}

#[test]
fn construction_rejects_bad_player_counts() {
    assert!(matches!(
        GameBuilder::new(1),
        Err(GameError::InvalidConstruction(_))
    ));
    assert!(matches!(
        GameBuilder::new(9),
        Err(GameError::InvalidConstruction(_))
    ));
    assert!(GameBuilder::new(2).is_ok());
    assert!(GameBuilder::new(8).is_ok());

    let lonely = GameBuilder::from_players(seated(GreedyStrategy::default(), 0)).build();
    assert!(matches!(lonely, Err(GameError::InvalidConstruction(_))));
}

#[test]
fn construction_rejects_duplicate_ids() {
    let players: Vec<(PlayerId, Box<dyn Strategy>)> = vec![
        (4, Box::new(GreedyStrategy::default())),
        (4, Box::new(GreedyStrategy::default())),
    ];
    let result = GameBuilder::from_players(players).build();
    assert!(matches!(result, Err(GameError::InvalidConstruction(_))));
}

#[test]
fn scripted_faces_reject_impossible_values() {
    assert!(matches!(
        ScriptedFaces::new([1, 7], 0),
        Err(GameError::InvalidFace(7))
    ));
    assert!(matches!(
        ScriptedFaces::new([0], 0),
        Err(GameError::InvalidFace(0))
    ));
}

#[test]
fn turns_rotate_through_seats() -> Result<(), GameError> {
    let bust = [2, 3, 4, 6, 2, 3];
    let script: Vec<u8> = bust.iter().copied().cycle().take(bust.len() * 4).collect();
    let mut game = GameBuilder::new(3)?
        .with_faces(ScriptedFaces::new(script, 7)?)
        .build()?;

    let mut order = Vec::new();
    for _ in 0..4 {
        order.push(game.run_turn()?.player);
    }
    assert_eq!(order, vec![0, 1, 2, 0]);
    assert_eq!(game.turns_played(), 4);
    assert_eq!(game.current_turn_index(), 1);
    Ok(())
}

#[test]
fn reaching_threshold_ends_the_game() -> Result<(), GameError> {
    let faces = ScriptedFaces::new([1, 1, 1, 2, 3, 4], 7)?;
    let mut game = GameBuilder::new(2)?
        .with_faces(faces)
        .with_win_threshold(1000)
        .build()?;
    assert_eq!(game.check_win(), None);

    let report = game.run_turn()?;
    assert_eq!(report.outcome, TurnOutcome::Banked { points: 1000 });
    assert_eq!(report.winner, Some(0));
    assert_eq!(game.check_win(), Some(0));
    assert_eq!(game.status(), GameStatus::Finished { winner: 0 });
    assert!(matches!(
        report.events.last(),
        Some(GameEvent::GameWon {
            player: 0,
            score: 1000
        })
    ));

    assert!(matches!(game.run_turn(), Err(GameError::GameOver)));
    assert_eq!(game.play(), 0);
    Ok(())
}

#[test]
fn seeded_games_replay_identically() -> Result<(), GameError> {
    let record = |seed: u64| -> Result<Vec<GameEvent>, GameError> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let mut game = GameBuilder::new(3)?
            .with_seed(seed)
            .with_win_threshold(3000)
            .with_observer(move |event: &GameEvent| sink.borrow_mut().push(event.clone()))
            .build()?;
        game.play_with_limit(500);
        let events = log.borrow().clone();
        Ok(events)
    };

    let first = record(42)?;
    let second = record(42)?;
    assert!(!first.is_empty());
    assert_eq!(first, second);
    assert_ne!(first, record(43)?);
    Ok(())
}

#[test]
fn scores_never_decrease_and_observers_see_reported_events() -> Result<(), GameError> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    let mut game = GameBuilder::new(4)?
        .with_seed(2024)
        .with_win_threshold(2500)
        .build()?;
    game.add_observer(move |event: &GameEvent| sink.borrow_mut().push(event.clone()));

    let mut reported = Vec::new();
    let mut last = vec![0u32; 4];
    for _ in 0..400 {
        let Ok(report) = game.run_turn() else {
            break;
        };
        assert!(report.score >= last[report.player]);
        last[report.player] = report.score;
        assert!(report.events.iter().all(|event| event.player() == report.player));
        reported.extend(report.events);
    }

    assert!(game.is_finished());
    let winner = game.winner().expect("someone wins within 400 turns");
    assert!(game.score_of(winner)? >= 2500);
    assert_eq!(*log.borrow(), reported);
    Ok(())
}

#[test]
fn play_with_limit_stops_without_winner() -> Result<(), GameError> {
    let mut game = GameBuilder::new(2)?.with_seed(9).build()?;
    assert_eq!(game.play_with_limit(3), None);
    assert_eq!(game.turns_played(), 3);
    assert!(!game.is_finished());
    Ok(())
}

#[test]
fn config_constructor_matches_builder() -> Result<(), GameError> {
    assert!(matches!(
        GameConfig::new(9, 0),
        Err(GameError::InvalidConstruction(_))
    ));
    let config = GameConfig::new(3, 11)?;
    assert_eq!(config.win_threshold, 10_000);

    let config = GameConfig {
        win_threshold: 2000,
        ..config
    };
    let mut from_config = Game::new(config)?;
    let mut from_builder = GameBuilder::new(3)?
        .with_seed(11)
        .with_win_threshold(2000)
        .build()?;
    let ids: Vec<PlayerId> = from_config.standings().iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![0, 1, 2]);
    assert_eq!(from_config.settings().win_threshold, 2000);

    let winner = from_config.play_with_limit(500);
    assert!(winner.is_some());
    assert_eq!(from_builder.play_with_limit(500), winner);
    assert_eq!(from_config.standings(), from_builder.standings());
    Ok(())
}
