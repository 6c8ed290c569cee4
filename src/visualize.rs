use std::fmt::Write;

use crate::action::{Decision, Selection};
use crate::event::GameEvent;
use crate::scoring::breakdown;
use crate::state::{PlayerPublicState, TurnView};

/// Customize state rendering for CLI visualization.
#[derive(Clone, Copy, Debug)]
pub struct VisualOptions {
    pub show_set_aside: bool,
    pub show_opponents: bool,
}

impl Default for VisualOptions {
    fn default() -> Self {
        Self {
            show_set_aside: true,
            show_opponents: true,
        }
    }
}

pub fn render_view(view: &TurnView) -> String {
    render_view_with_options(view, VisualOptions::default())
}

pub fn render_view_with_options(view: &TurnView, options: VisualOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Phase: {:?}", view.phase);
    let _ = writeln!(
        out,
        "Player {} - banked {} / {}  |  pending {}",
        view.player, view.own_score, view.win_threshold, view.pending_points
    );
    if options.show_opponents && !view.opponents.is_empty() {
        let _ = writeln!(out, "Opponents: {}", format_standings(&view.opponents));
    }
    let mut active = Vec::new();
    let mut kept = Vec::new();
    for (idx, die) in view.dice.iter().enumerate() {
        if die.is_active() {
            active.push(format!("{idx}:[{}]", die.face));
        } else {
            kept.push(format!("{idx}:({})", die.face));
        }
    }
    let _ = writeln!(out, "Dice: {}", active.join("  "));
    if options.show_set_aside && !kept.is_empty() {
        let _ = writeln!(out, "Set aside: {}", kept.join("  "));
    }
    out
}

/// Names the dice in `selection` and, when legal, what they score.
pub fn describe_selection(view: &TurnView, selection: Selection) -> String {
    let faces: Vec<u8> = selection
        .indices()
        .filter_map(|idx| view.dice.get(idx).map(|die| die.face))
        .collect();
    let shown = faces
        .iter()
        .map(|face| face.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    match breakdown(&faces) {
        Some(found) => {
            let parts = found
                .parts
                .iter()
                .map(|kind| kind.to_string())
                .collect::<Vec<_>>()
                .join(" + ");
            format!("[{shown}] = {parts} for {} points", found.points)
        }
        None => format!("[{shown}] (does not score)"),
    }
}

pub fn describe_event(event: &GameEvent) -> String {
    match event {
        GameEvent::TurnStarted { player, score } => {
            format!("Player {player} starts a turn with {score} banked")
        }
        GameEvent::RollOccurred { player, faces } => {
            let shown = faces
                .iter()
                .map(|(idx, face)| format!("{idx}:{face}"))
                .collect::<Vec<_>>()
                .join(" ");
            format!("Player {player} rolls {shown}")
        }
        GameEvent::SelectionAccepted {
            player,
            selection,
            points,
            pending,
        } => format!("Player {player} sets aside {selection} for {points} ({pending} pending)"),
        GameEvent::SelectionRejected {
            player,
            selection,
            reason,
            attempt,
        } => format!("Player {player} offered {selection} (attempt {attempt}): {reason}"),
        GameEvent::HotDice { player, pending } => {
            format!("Player {player} has hot dice with {pending} pending")
        }
        GameEvent::DecisionMade { player, decision } => match decision {
            Decision::Roll => format!("Player {player} rolls on"),
            Decision::Bank => format!("Player {player} banks"),
        },
        GameEvent::Busted { player, lost } => format!("Player {player} busts, losing {lost}"),
        GameEvent::Banked {
            player,
            points,
            total,
        } => format!("Player {player} banks {points} (total {total})"),
        GameEvent::GameWon { player, score } => format!("Player {player} wins with {score}"),
    }
}

pub fn format_standings(players: &[PlayerPublicState]) -> String {
    players
        .iter()
        .map(|p| format!("P{}={}", p.id, p.score))
        .collect::<Vec<_>>()
        .join("  ")
}
