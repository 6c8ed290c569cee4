use std::error::Error;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::strategies::greedy::{DEFAULT_BANK_THRESHOLD, DEFAULT_MIN_DICE_TO_ROLL};
use crate::strategies::{GreedyStrategy, HumanStrategy, RandomStrategy};
use crate::strategy::Strategy;

/// Returns a normalized label for a strategy spec (the head token before any ':').
pub fn label_for_spec(spec: &str) -> String {
    spec.split(':')
        .next()
        .unwrap_or(spec)
        .trim()
        .to_ascii_lowercase()
}

/// True for specs that block on terminal input.
pub fn is_interactive(spec: &str) -> bool {
    label_for_spec(spec) == "human"
}

/// Create a strategy instance from a CLI-style spec.
/// Supported specs:
/// - greedy[:bank_threshold]
/// - random[:seed]
/// - human[:name]
pub fn create_strategy_from_spec(
    spec: &str,
    index: usize,
    seed: u64,
) -> Result<Box<dyn Strategy>, Box<dyn Error>> {
    let argument = spec.split_once(':').map(|(_, value)| value.trim());
    match label_for_spec(spec).as_str() {
        "greedy" => {
            let threshold = match argument {
                Some(value) => value
                    .parse::<u32>()
                    .map_err(|_| format!("invalid greedy bank threshold: {value}"))?,
                None => DEFAULT_BANK_THRESHOLD,
            };
            Ok(Box::new(GreedyStrategy::new(
                threshold,
                DEFAULT_MIN_DICE_TO_ROLL,
            )))
        }
        "random" => {
            let custom_seed = match argument {
                Some(value) => value
                    .parse::<u64>()
                    .map_err(|_| format!("invalid random seed: {value}"))?,
                None => seed ^ ((index as u64 + 1) * 0x9E37_79B9),
            };
            Ok(Box::new(RandomStrategy::new(StdRng::seed_from_u64(
                custom_seed,
            ))))
        }
        "human" => {
            let name = argument
                .map(str::to_string)
                .unwrap_or_else(|| format!("Human {index}"));
            Ok(Box::new(HumanStrategy::new(name)))
        }
        _ => Err(format!("unrecognized strategy spec: {spec}").into()),
    }
}
