use std::cell::RefCell;
use std::collections::HashMap;
use std::error::Error;
use std::path::PathBuf;
use std::process;
use std::rc::Rc;
use std::time::{Duration, Instant};

use clap::{ArgAction, Parser, ValueEnum};
use plotters::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::Level;

use farklebot::strategies::registry::is_interactive;
use farklebot::{
    Decision, GameBuilder, PlayerId, Selection, Strategy, TurnView, create_strategy_from_spec,
    label_for_spec,
};

/// Default base seed for deterministic runs.
const DEFAULT_SEED: u64 = 0xC0FFEE_u64 << 32 | 0x5EED_u64;

/// Output format for the generated chart. Currently only PNG is supported.
#[derive(Clone, Debug, ValueEnum)]
enum ChartFormat {
    Png,
}

impl ChartFormat {
    fn from_path(path: &PathBuf) -> Option<Self> {
        match path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_ascii_lowercase())
        {
            Some(ext) if ext == "png" => Some(Self::Png),
            _ => None,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "winrate",
    about = "Run multiple Farkle games and plot per-strategy win rates."
)]
struct Args {
    /// Number of games to simulate
    #[arg(short = 'g', long = "games", default_value_t = 200)]
    games: usize,

    /// Base RNG seed (dice + strategy RNGs are derived deterministically)
    #[arg(short = 's', long = "seed", default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Output chart file (png)
    #[arg(short = 'o', long = "out", default_value = "winrates.png")]
    out: PathBuf,

    /// Explicit output format (inferred from --out when omitted)
    #[arg(long = "format", value_enum)]
    format: Option<ChartFormat>,

    /// Show a textual summary only (no chart)
    #[arg(long = "no-chart", action = ArgAction::SetTrue)]
    no_chart: bool,

    /// Safety cap on turns per game; games exceeding this are aborted (not counted as a win)
    #[arg(long = "max-turns", default_value_t = 2000)]
    max_turns: usize,

    /// Score needed to win. Lower values shorten games for quick benchmarking.
    #[arg(long = "win-threshold")]
    win_threshold: Option<u32>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,

    /// Player strategy specs: e.g., greedy random greedy:500 (2-8 total)
    strategies: Vec<String>,
}

/// Accumulated time spent inside strategy calls.
#[derive(Default)]
struct DecisionClock {
    total: Duration,
    count: usize,
}

/// Wraps a strategy and charges its decision time to a shared clock.
struct Timed {
    inner: Box<dyn Strategy>,
    clock: Rc<RefCell<DecisionClock>>,
}

impl Timed {
    fn measure<T>(&mut self, call: impl FnOnce(&mut Box<dyn Strategy>) -> T) -> T {
        let started = Instant::now();
        let result = call(&mut self.inner);
        let mut clock = self.clock.borrow_mut();
        clock.total += started.elapsed();
        clock.count += 1;
        result
    }
}

impl Strategy for Timed {
    fn choose_set_aside(&mut self, view: &TurnView) -> Selection {
        self.measure(|inner| inner.choose_set_aside(view))
    }

    fn choose_roll_or_bank(&mut self, view: &TurnView) -> Decision {
        self.measure(|inner| inner.choose_roll_or_bank(view))
    }
}

#[derive(Default)]
struct LabelStats {
    wins: usize,
    seats: usize,
    points: u64,
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);
    if let Err(err) = run(args) {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    if args.strategies.len() < 2 || args.strategies.len() > 8 {
        return Err(format!(
            "expected between 2 and 8 strategy specs (e.g., greedy random), received {}",
            args.strategies.len()
        )
        .into());
    }

    // Disallow human in batch sims; it would block waiting for input.
    if args.strategies.iter().any(|spec| is_interactive(spec)) {
        return Err("human players are not supported in winrate runs".into());
    }

    let mut stats: HashMap<String, LabelStats> = HashMap::new();
    let mut clocks: HashMap<String, Rc<RefCell<DecisionClock>>> = HashMap::new();
    let mut aborted_games = 0usize;
    let mut total_turns = 0usize;

    let base_seed = args.seed;
    let players_per_game = args.strategies.len();
    let labels_for_spec: Vec<String> = args.strategies.iter().map(|s| label_for_spec(s)).collect();

    for game_idx in 0..args.games {
        // Permute seating each game for fairness.
        let mut indices: Vec<usize> = (0..players_per_game).collect();
        let mut seat_rng = StdRng::seed_from_u64(base_seed ^ 0x9E37_79B9 ^ (game_idx as u64));
        indices.shuffle(&mut seat_rng);

        let mut players: Vec<(PlayerId, Box<dyn Strategy>)> = Vec::with_capacity(players_per_game);
        let mut labels: Vec<String> = Vec::with_capacity(players_per_game);
        for (seat, src_idx) in indices.iter().enumerate() {
            let label = labels_for_spec[*src_idx].clone();
            let strategy_seed = mix_seed(base_seed, game_idx as u64, seat as u64);
            let inner = create_strategy_from_spec(&args.strategies[*src_idx], seat, strategy_seed)?;
            let clock = clocks.entry(label.clone()).or_default().clone();
            players.push((seat, Box::new(Timed { inner, clock })));
            stats.entry(label.clone()).or_default().seats += 1;
            labels.push(label);
        }

        let dice_seed = mix_seed(base_seed, game_idx as u64, 0x5EED_15);
        let mut builder = GameBuilder::from_players(players).with_seed(dice_seed);
        if let Some(threshold) = args.win_threshold {
            builder = builder.with_win_threshold(threshold);
        }
        let mut game = builder.build()?;

        let winner = game.play_with_limit(args.max_turns);
        total_turns += game.turns_played();
        for standing in game.standings() {
            stats.entry(labels[standing.id].clone()).or_default().points += standing.score as u64;
        }
        match winner {
            Some(winner) => stats.entry(labels[winner].clone()).or_default().wins += 1,
            None => aborted_games += 1,
        }
    }

    let mut results: Vec<(String, f64, usize, usize, f64)> = stats
        .iter()
        .map(|(label, entry)| {
            let rate = if entry.seats > 0 {
                entry.wins as f64 / entry.seats as f64
            } else {
                0.0
            };
            let avg_points = if entry.seats > 0 {
                entry.points as f64 / entry.seats as f64
            } else {
                0.0
            };
            (label.clone(), rate, entry.wins, entry.seats, avg_points)
        })
        .collect();

    // Sort by rate desc, then by label.
    results.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });

    println!("Win rates (per-seat):");
    for (label, rate, wins, seats, avg_points) in &results {
        println!(
            "  {label:<12}  {wins}/{seats}  ({:.2}%)   avg final score: {avg_points:>8.1}",
            rate * 100.0
        );
    }
    if args.games > 0 {
        println!(
            "\nAverage game length: {:.1} turns",
            total_turns as f64 / args.games as f64
        );
    }
    if aborted_games > 0 {
        println!("Note: {aborted_games} game(s) hit the turn cap without a winner.");
    }

    if !args.no_chart {
        let format = args
            .format
            .or_else(|| ChartFormat::from_path(&args.out))
            .unwrap_or(ChartFormat::Png);
        if !matches!(format, ChartFormat::Png) {
            return Err("only PNG output is supported currently; use --out with .png".into());
        }
        let bars: Vec<(String, f64)> = results
            .iter()
            .map(|(label, rate, ..)| (label.clone(), rate * 100.0))
            .collect();
        render_bar_chart(&args.out, &bars)?;
        println!("\nChart written to {}", args.out.display());
    }

    println!("\nDecision time (per strategy label):");
    for (label, ..) in &results {
        let Some(clock) = clocks.get(label) else {
            continue;
        };
        let clock = clock.borrow();
        let total_ms = clock.total.as_secs_f64() * 1.0e3;
        let avg_us = if clock.count > 0 {
            total_ms * 1.0e3 / clock.count as f64
        } else {
            0.0
        };
        println!(
            "  {label:<12}  decisions: {:<8}  total: {total_ms:.3} ms  avg: {avg_us:.3} us",
            clock.count
        );
    }

    Ok(())
}

fn mix_seed(base: u64, a: u64, b: u64) -> u64 {
    let mut z =
        base ^ (a.wrapping_mul(0x9E37_79B97F4A7C15)) ^ (b.wrapping_mul(0xBF58_476D1CE4E5B9));
    z ^= z >> 12;
    z ^= z << 25;
    z ^= z >> 27;
    z
}

fn render_bar_chart(out: &PathBuf, data: &[(String, f64)]) -> Result<(), Box<dyn Error>> {
    let labels: Vec<String> = data.iter().map(|(l, _)| l.clone()).collect();
    let max_value = data.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);

    let root = BitMapBackend::new(out, (1000, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| format!("{e}"))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Farkle Strategy Win Rates (per-seat)",
            ("sans-serif", 28).into_font(),
        )
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0..labels.len(), 0.0f64..max_value.max(10.0))
        .map_err(|e| format!("{e}"))?;

    chart
        .configure_mesh()
        .y_desc("Win rate (%)")
        .x_desc("Strategy")
        .x_labels(labels.len())
        .x_label_formatter(&|idx| {
            if *idx < labels.len() {
                labels[*idx].clone()
            } else {
                idx.to_string()
            }
        })
        .y_label_formatter(&|v| format!("{v:.0}"))
        .light_line_style(WHITE.mix(0.0))
        .draw()
        .map_err(|e| format!("{e}"))?;

    for (i, (_, value)) in data.iter().enumerate() {
        let rect = Rectangle::new([(i, 0.0), (i + 1, *value)], BLUE.filled());
        chart
            .draw_series(std::iter::once(rect))
            .map_err(|e| format!("{e}"))?;
    }

    root.present().map_err(|e| format!("{e}"))?;
    Ok(())
}
