//! Random cap builder: grows many independent random complete caps in
//! GF(2)^dim and reports the distribution of their sizes and affine ranks.

mod builder;

use builder::*;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cfg = Config::parse();
    validate_config(&cfg)?;

    if let Some(threads) = cfg.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }

    let master_seed = parse_or_generate_seed(&cfg)?;
    info!(
        dim = cfg.dim,
        trials = cfg.trials,
        tracking = ?cfg.tracking,
        threads = rayon::current_num_threads(),
        "Starting random cap construction"
    );

    let pb = if cfg.no_progress {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(cfg.trials as u64)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let outcomes: Vec<TrialOutcome> = (0..cfg.trials)
        .into_par_iter()
        .map(|trial| {
            let outcome = run_trial(&cfg, &master_seed, trial);
            pb.inc(1);
            outcome
        })
        .collect::<eyre::Result<_>>()?;
    pb.finish_and_clear();
    let elapsed = start.elapsed();

    let summary = summarize(&cfg, &master_seed, &outcomes, elapsed);
    info!(
        min = summary.min_size,
        max = summary.max_size,
        mean = format_args!("{:.2}", summary.mean_size),
        elapsed = ?elapsed,
        "Finished"
    );

    let output = serde_json::to_string_pretty(&summary)?;
    println!("{output}");
    if let Some(path) = &cfg.output {
        std::fs::write(path, format!("{output}\n"))?;
        info!("Summary written to {:?}", path);
    }

    Ok(())
}
