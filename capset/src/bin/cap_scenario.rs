//! Deterministic cap scenarios printed as a JSON transcript.

use capset::{CapError, CapSet, Step, Tracking};
use clap::Parser;
use eyre::{ensure, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Run deterministic cap construction scenarios")]
struct Args {
    /// Optional path to write JSON summary.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Largest dimension for the greedy completion table.
    #[arg(long, default_value_t = 8)]
    max_dim: u32,

    /// Dimension of the seeded random construction.
    #[arg(long, default_value_t = 6)]
    random_dim: u32,
}

#[derive(Serialize)]
struct Event {
    op: String,
    point: Option<u32>,
    result: String,
    size: usize,
}

#[derive(Serialize)]
struct GreedyRow {
    dim: u32,
    size: usize,
    rank: usize,
    points: Vec<u32>,
}

#[derive(Serialize)]
struct RandomRun {
    dim: u32,
    steps: Vec<u32>,
    size: usize,
    rank: usize,
    resized_to: u32,
    size_after_resize: usize,
}

#[derive(Serialize)]
struct ScenarioSummary {
    exclusion: Vec<Event>,
    greedy: Vec<GreedyRow>,
    random: RandomRun,
}

fn seed_from_label(label: &[u8]) -> [u8; 32] {
    let hash = Sha256::digest(label);
    let mut seed = [0u8; 32];
    seed.copy_from_slice(&hash);
    seed
}

fn record(
    events: &mut Vec<Event>,
    cap: &CapSet,
    op: &str,
    point: Option<u32>,
    result: Result<(), CapError>,
) {
    let result = match result {
        Ok(()) => "ok".to_string(),
        Err(err) => err.to_string(),
    };
    events.push(Event {
        op: op.to_string(),
        point,
        result,
        size: cap.len(),
    });
}

/// Add 0, 1, 2 in GF(2)^3, watch 3 become blocked, then free it again.
fn exclusion_scenario() -> Result<Vec<Event>> {
    let mut events = Vec::new();
    let mut cap = CapSet::new(3)?;
    for point in [0, 1, 2] {
        let res = cap.add(point);
        record(&mut events, &cap, "add", Some(point), res);
    }
    ensure!(cap.excludes_count(3) == vec![3], "3 should be excluded by a triple");

    let res = cap.add(3);
    ensure!(
        res == Err(CapError::Excluded { point: 3 }),
        "adding 3 must fail"
    );
    record(&mut events, &cap, "add", Some(3), res);

    let res = cap.remove(2);
    record(&mut events, &cap, "remove", Some(2), res);
    let res = cap.add(3);
    ensure!(res.is_ok(), "3 must be addable once 2 is gone");
    record(&mut events, &cap, "add", Some(3), res);

    let res = cap.add(8);
    record(&mut events, &cap, "add", Some(8), res);
    Ok(events)
}

fn greedy_table(max_dim: u32) -> Result<Vec<GreedyRow>> {
    let mut rows = Vec::new();
    for dim in 1..=max_dim {
        let mut cap = CapSet::new(dim)?;
        cap.complete()?;
        ensure!(cap.is_complete(), "greedy cap in dim {dim} is not complete");
        rows.push(GreedyRow {
            dim,
            size: cap.len(),
            rank: cap.rank(),
            points: cap.points().collect(),
        });
    }
    Ok(rows)
}

fn random_run(dim: u32) -> Result<RandomRun> {
    let mut rng = ChaCha20Rng::from_seed(seed_from_label(b"capset_scenario_random_seed_v1"));
    let mut cap = CapSet::with_tracking(dim, Tracking::Triples)?;
    let mut steps = Vec::new();
    while let Step::Added(point) = cap.random_step(&mut rng)? {
        steps.push(point);
    }
    let size = cap.len();
    let rank = cap.rank();

    let resized_to = dim.saturating_sub(1).max(1);
    cap.resize_dimension(resized_to)?;
    ensure!(
        cap.points().all(|p| p < 1 << resized_to),
        "resize left an out-of-range point"
    );

    Ok(RandomRun {
        dim,
        steps,
        size,
        rank,
        resized_to,
        size_after_resize: cap.len(),
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let summary = ScenarioSummary {
        exclusion: exclusion_scenario()?,
        greedy: greedy_table(args.max_dim)?,
        random: random_run(args.random_dim)?,
    };
    info!(
        greedy_dims = summary.greedy.len(),
        random_size = summary.random.size,
        "Scenarios complete"
    );

    let output = serde_json::to_string_pretty(&summary)?;
    println!("{output}");
    if let Some(path) = args.output {
        std::fs::write(path, format!("{output}\n"))?;
    }

    Ok(())
}
