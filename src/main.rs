// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Recover PRNG seeds and internal state from observed outputs.
//!
//! State inference runs first; if it lands a perfect match the tool stops
//! there, otherwise the seed space is brute forced across worker threads.

pub mod inference;
pub mod rngs;
pub mod seed_search;
pub mod stats;
pub mod strings;
pub mod testdata;
pub mod utils;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use inference::Inference;

#[derive(Parser, Debug)]
#[command(version, about = "Recover PRNG seeds and internal state from observed outputs")]
struct Args {
    /// File of newline separated decimal 32-bit integers observed from
    /// the target generator
    #[arg(short, long, required_unless_present = "generate")]
    input: Option<PathBuf>,

    /// Outputs to inspect per candidate seed while brute forcing
    #[arg(short, long, default_value_t = 1000, value_parser = clap::value_parser!(u32).range(1..))]
    depth: u32,

    /// PRNG algorithm to attack
    #[arg(short = 'r', long = "rng", default_value = rngs::NAMES[0])]
    rng: String,

    /// Generate a sample stream from this seed at the configured depth,
    /// then exit
    #[arg(short, long)]
    generate: Option<u32>,

    /// Only brute force seeds within one year either side of the current
    /// unix time
    #[arg(short, long)]
    unix_time: bool,

    /// Minimum confidence percentage to report
    #[arg(short, long, default_value_t = 100.0)]
    confidence: f64,

    /// Number of worker threads
    #[arg(short, long)]
    threads: Option<usize>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    if !(args.confidence > 0.0 && args.confidence <= 100.0) {
        bail!(
            "invalid confidence percentage {} (expected 0 < c <= 100)",
            args.confidence
        );
    }
    let threads = match args.threads {
        Some(0) => bail!("please enter a valid number of threads >= 1"),
        Some(n) => n,
        None => std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1),
    };
    if rngs::from_name(&args.rng).is_err() {
        bail!(
            "the PRNG \"{}\" is not supported (supported: {})",
            args.rng,
            rngs::NAMES.join(", ")
        );
    }

    if let Some(seed) = args.generate {
        generate_sample(seed, args.depth, &args.rng)?;
        return Ok(());
    }

    let input = args
        .input
        .as_deref()
        .context("no input numbers provided, use -i <file>")?;
    let observations = utils::read_observations(input)
        .with_context(|| format!("failed to load observations from {}", input.display()))?;
    info!(count = observations.len(), "loaded observations");

    info!(rng = %args.rng, "trying state inference");
    match inference::infer_state(&observations, &args.rng)? {
        Inference::Seed(seed) => {
            println!("{}Found seed {}", strings::SUCCESS, seed);
            return Ok(());
        }
        Inference::State(state) => {
            println!("{}Found state:", strings::SUCCESS);
            for word in state {
                println!("{}{}", strings::SUCCESS, word);
            }
            return Ok(());
        }
        Inference::Partial { state, score } => {
            println!(
                "{}Best state guess, with confidence of {:.2}%:",
                strings::SUCCESS,
                score
            );
            for word in state {
                println!("{}{}", strings::SUCCESS, word);
            }
        }
        Inference::NoMatch => info!("state inference failed"),
    }

    let (lower, upper) = if args.unix_time {
        utils::unix_time_window()
    } else {
        (0, u32::MAX)
    };
    let answers = seed_search::find_seed(
        &observations,
        &args.rng,
        threads,
        args.confidence,
        lower,
        upper,
        args.depth,
    );
    if answers.is_empty() {
        println!(
            "{}No seed found at or above {:.2}% confidence",
            strings::INFO,
            args.confidence
        );
        return Ok(());
    }
    let range = upper as u64 + 1 - lower as u64;
    for answer in &answers {
        println!(
            "{}Found seed {} with a confidence of {:.2}%",
            strings::SUCCESS,
            answer.seed,
            answer.confidence
        );
        if answer.confidence < 100.0 {
            let matches = ((answer.confidence / 100.0) * observations.len() as f64).round() as usize;
            debug!(
                seed = answer.seed,
                expected_chance_matches = stats::expected_false_positives(range, args.depth, matches),
                "imposter estimate"
            );
        }
    }
    Ok(())
}

/// Emit depth outputs from a freshly seeded generator, one per line.
/// The output feeds straight back into -i.
fn generate_sample(seed: u32, depth: u32, rng_name: &str) -> Result<()> {
    let mut generator = rngs::from_name(rng_name)?;
    generator.seed(seed);
    for _ in 0..depth {
        println!("{}", generator.random());
    }
    Ok(())
}
