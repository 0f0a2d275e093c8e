//! Ingests a parameter log, prints per-parameter summaries, and writes the benchmark interchange file.
//!
//! Usage: `encode_params <log> [out] [bin_count|auto] [workers]`

use anyhow::{Context, Result};
use comm_empirical::{mean, stdev, BinCount, Profiler};

const DEFAULT_OUT: &str = "benchmark_config.txt";

fn cmd_line_args() -> Vec<String> {
    std::env::args().skip(1).collect()
}

fn main() -> Result<()> {
    env_logger::init();

    let args = cmd_line_args();
    let log_path = args
        .first()
        .context("no path to parameter log file specified")?;
    let out_path = args.get(1).map_or(DEFAULT_OUT, String::as_str);
    let bin_count: BinCount = match args.get(2) {
        Some(s) => s.parse()?,
        None => BinCount::Auto,
    };

    let mut profiler = Profiler::default().with_bin_count(bin_count);
    if let Some(workers) = args.get(3) {
        let workers = workers
            .parse()
            .with_context(|| format!("invalid worker count '{workers}'"))?;
        profiler = profiler.with_workers(workers);
    }

    // An unreadable log is fatal before any encoding happens.
    let params = profiler
        .ingest_file(log_path)
        .with_context(|| format!("could not read parameter log file {log_path}"))?;

    println!("Analyzing: {log_path}\n");
    for (param, samples) in &params {
        if samples.is_empty() {
            println!("{param} is not reported\n");
            continue;
        }
        println!("{param}: {}", mean(samples));
        println!("{param} stdev: {}", stdev(samples));
        println!("{param} count: {}\n", samples.len());
    }

    for (param, summary) in &profiler.summarize(&params)? {
        log::debug!("{param} summary={summary:?}");
        println!("{param} summary:\n{summary}");
    }

    let fingerprint = profiler.encode_to_file(&params, out_path)?;
    println!("\nWrote {out_path} (fingerprint {fingerprint})");
    Ok(())
}
