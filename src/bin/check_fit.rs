//! Compares parameter data observed from an application with parameter data generated by the benchmark.
//!
//! Usage: `check_fit <observed_log> <generated_log> [alpha]`

use anyhow::{bail, Context, Result};
use comm_empirical::{Profiler, DEFAULT_ALPHA};

fn cmd_line_args() -> Vec<String> {
    std::env::args().skip(1).collect()
}

fn main() -> Result<()> {
    env_logger::init();

    let args = cmd_line_args();
    let (Some(observed_path), Some(generated_path)) = (args.first(), args.get(1)) else {
        bail!("must specify two data files: <observed_log> <generated_log>");
    };
    let alpha = match args.get(2) {
        Some(s) => s
            .parse()
            .with_context(|| format!("invalid significance level '{s}'"))?,
        None => DEFAULT_ALPHA,
    };

    let profiler = Profiler::default().with_alpha(alpha);
    let observed = profiler
        .ingest_file(observed_path)
        .with_context(|| format!("could not read observed data file {observed_path}"))?;
    let generated = profiler
        .ingest_file(generated_path)
        .with_context(|| format!("could not read generated data file {generated_path}"))?;

    let report = profiler.check_fit(&observed, &generated);
    print!("{report}");
    Ok(())
}
