use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser};
use tracing::Level;

use farklebot::strategies::registry::is_interactive;
use farklebot::visualize::format_standings;
use farklebot::{
    GameBuilder, GameEvent, GameSettings, PlayerId, RngFaces, Strategy,
    create_strategy_from_spec, describe_event,
};

const DEFAULT_SEED: u64 = 0xDEC0_1DED_5EED_F00D;

#[derive(Parser, Debug)]
#[command(name = "simulate", about = "Play a single Farkle game between strategies.")]
struct Args {
    /// Print every game event as it happens
    #[arg(long = "visualize", action = ArgAction::SetTrue)]
    visualize: bool,

    /// Print every game event as a JSON line
    #[arg(long = "events-json", action = ArgAction::SetTrue)]
    events_json: bool,

    /// Seed for the dice (and for random strategies without their own seed)
    #[arg(short = 's', long = "seed", default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Roll dice from OS randomness instead of --seed
    #[arg(long = "entropy", action = ArgAction::SetTrue)]
    entropy: bool,

    /// Stop after the specified number of turns
    #[arg(long = "max-turns")]
    max_turns: Option<usize>,

    /// Score needed to win (overrides --settings)
    #[arg(long = "win-threshold")]
    win_threshold: Option<u32>,

    /// JSON file with game settings (win_threshold, max_selection_attempts)
    #[arg(long = "settings")]
    settings: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,

    /// Strategy specs, 2-8 total: greedy[:threshold], random[:seed], human[:name]
    strategies: Vec<String>,
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
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let mut specs = args.strategies;
    if specs.is_empty() {
        specs = vec![String::from("human"), String::from("greedy")];
    }
    if specs.len() < 2 || specs.len() > 8 {
        return Err(format!("expected between 2 and 8 players, received {}", specs.len()).into());
    }
    if args.max_turns.is_none() && !specs.iter().any(|spec| is_interactive(spec)) {
        tracing::info!("no --max-turns given; the game runs until someone wins");
    }

    let mut players: Vec<(PlayerId, Box<dyn Strategy>)> = Vec::with_capacity(specs.len());
    for (index, spec) in specs.iter().enumerate() {
        players.push((index, create_strategy_from_spec(spec, index, args.seed)?));
    }

    let mut builder = GameBuilder::from_players(players).with_seed(args.seed);
    if args.entropy {
        builder = builder.with_faces(RngFaces::from_entropy());
    }
    if let Some(path) = &args.settings {
        let text = fs::read_to_string(path)
            .map_err(|err| format!("cannot read {}: {err}", path.display()))?;
        let settings: GameSettings = serde_json::from_str(&text)
            .map_err(|err| format!("invalid settings in {}: {err}", path.display()))?;
        builder = builder.with_settings(settings);
    }
    if let Some(threshold) = args.win_threshold {
        builder = builder.with_win_threshold(threshold);
    }
    if args.visualize {
        builder = builder.with_observer(|event: &GameEvent| {
            println!("{}", describe_event(event));
            if matches!(event, GameEvent::Banked { .. } | GameEvent::Busted { .. }) {
                println!();
            }
        });
    }
    if args.events_json {
        builder = builder.with_observer(|event: &GameEvent| match serde_json::to_string(event) {
            Ok(line) => println!("{line}"),
            Err(err) => eprintln!("failed to encode event: {err}"),
        });
    }
    let mut game = builder.build()?;

    println!(
        "Starting Farkle with {} players, first to {}.\n",
        specs.len(),
        game.settings().win_threshold
    );
    let winner = match args.max_turns {
        Some(limit) => game.play_with_limit(limit),
        None => Some(game.play()),
    };

    println!("Final scores: {}", format_standings(&game.standings()));
    match winner {
        Some(winner) => println!(
            "Game finished after {} turns. Winner: Player {winner} ({}).",
            game.turns_played(),
            specs[winner]
        ),
        None => println!(
            "Max turn limit reached after {} turns. Stopping simulation.",
            game.turns_played()
        ),
    }
    Ok(())
}
