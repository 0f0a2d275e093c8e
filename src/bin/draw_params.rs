//! Draws synthetic parameter values from an interchange file and prints them as tagged log lines.
//!
//! Usage: `draw_params <config> [iterations] [seed]`

use anyhow::{Context, Result};
use comm_empirical::{generate_lines, read_config};
use rand::{rngs::StdRng, SeedableRng};

const DEFAULT_ITERATIONS: usize = 1000;

fn cmd_line_args() -> Vec<String> {
    std::env::args().skip(1).collect()
}

fn main() -> Result<()> {
    env_logger::init();

    let args = cmd_line_args();
    let config_path = args.first().context("no path to config file specified")?;
    let iterations = match args.get(1) {
        Some(s) => s
            .parse()
            .with_context(|| format!("invalid iteration count '{s}'"))?,
        None => DEFAULT_ITERATIONS,
    };
    let mut rng = match args.get(2) {
        Some(s) => StdRng::seed_from_u64(s.parse().with_context(|| format!("invalid seed '{s}'"))?),
        None => StdRng::from_entropy(),
    };

    let config = read_config(config_path)?;
    for line in generate_lines(&config, iterations, &mut rng) {
        println!("{line}");
    }
    Ok(())
}
