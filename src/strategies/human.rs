use std::io::{self, BufRead, BufReader, Stdin, Stdout, Write};

use crate::action::{Decision, Selection};
use crate::dice::DICE_COUNT;
use crate::state::TurnView;
use crate::strategies::GreedyStrategy;
use crate::strategy::Strategy;
use crate::visualize::{describe_selection, render_view};

/// Interactive player that reads choices from a terminal.
///
/// Dice are chosen either as six `0`/`1` characters (`100110`) or as a list of
/// die indices (`0 3 4`). When input runs out the greedy choice is used so a
/// closed stdin never stalls a game.
pub struct HumanStrategy<R: BufRead, W: Write> {
    name: String,
    input: R,
    output: W,
    fallback: GreedyStrategy,
}

impl HumanStrategy<BufReader<Stdin>, Stdout> {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_io(name, BufReader::new(io::stdin()), io::stdout())
    }
}

impl Default for HumanStrategy<BufReader<Stdin>, Stdout> {
    fn default() -> Self {
        Self::new("Human")
    }
}

impl<R: BufRead, W: Write> HumanStrategy<R, W> {
    pub fn with_io(name: impl Into<String>, input: R, output: W) -> Self {
        Self {
            name: name.into(),
            input,
            output,
            fallback: GreedyStrategy::default(),
        }
    }

    fn say(&mut self, text: &str) {
        if writeln!(self.output, "{text}").is_err() {
            eprintln!("failed to write prompt");
        }
    }

    fn prompt(&mut self, text: &str) -> Option<String> {
        if write!(self.output, "{text}")
            .and_then(|_| self.output.flush())
            .is_err()
        {
            eprintln!("failed to flush output");
        }
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim().to_string()),
            Err(err) => {
                eprintln!("failed to read input: {err}");
                None
            }
        }
    }
}

/// Parses `100110` or `0 3 4` into a selection.
pub fn parse_selection(input: &str) -> Result<Selection, String> {
    let trimmed = input.trim();
    if trimmed.len() == DICE_COUNT && trimmed.chars().all(|c| c == '0' || c == '1') {
        let selection = Selection::from_indices(
            trimmed
                .chars()
                .enumerate()
                .filter(|(_, c)| *c == '1')
                .map(|(idx, _)| idx),
        );
        if selection.is_empty() {
            return Err(String::from("select at least one die"));
        }
        return Ok(selection);
    }
    let mut indices = Vec::new();
    for token in trimmed.split(|c: char| c.is_whitespace() || c == ',') {
        if token.is_empty() {
            continue;
        }
        let index: usize = token
            .parse()
            .map_err(|_| format!("'{token}' is not a die index"))?;
        if index >= DICE_COUNT {
            return Err(format!("die index {index} is out of range (0-5)"));
        }
        indices.push(index);
    }
    if indices.is_empty() {
        return Err(String::from("select at least one die"));
    }
    Ok(Selection::from_indices(indices))
}

impl<R: BufRead, W: Write> Strategy for HumanStrategy<R, W> {
    fn choose_set_aside(&mut self, view: &TurnView) -> Selection {
        let header = format!("\n=== {}'s turn (player {}) ===", self.name, view.player);
        self.say(&header);
        self.say(&render_view(view));
        loop {
            let Some(line) = self.prompt("Dice to set aside (e.g. 100110 or 0 3 4, 'help'): ")
            else {
                let choice = self.fallback.choose_set_aside(view);
                self.say(&format!("No input, taking {}", describe_selection(view, choice)));
                return choice;
            };
            if line.eq_ignore_ascii_case("q") || line.eq_ignore_ascii_case("quit") {
                self.say("Exiting game at user's request.");
                std::process::exit(0);
            }
            if line.eq_ignore_ascii_case("help") {
                self.say("Enter six 0/1 characters, one per die, or the indices of the dice.");
                self.say("Every die you set aside must be part of a scoring combination.");
                continue;
            }
            match parse_selection(&line) {
                Ok(selection) => {
                    let text = describe_selection(view, selection);
                    self.say(&format!("You selected: {text}"));
                    return selection;
                }
                Err(reason) => self.say(&format!("Invalid input: {reason}")),
            }
        }
    }

    fn choose_roll_or_bank(&mut self, view: &TurnView) -> Decision {
        let question = format!(
            "{} points pending, {} dice left. Bank? (y/N): ",
            view.pending_points,
            view.active_count()
        );
        loop {
            let Some(line) = self.prompt(&question) else {
                return Decision::Bank;
            };
            match line.to_ascii_lowercase().as_str() {
                "y" | "yes" => return Decision::Bank,
                "" | "n" | "no" => return Decision::Roll,
                _ => self.say("Please answer y or n."),
            }
        }
    }
}
