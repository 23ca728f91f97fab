//! Trial execution and summaries for the cap_builder binary.

use capset::{CapSet, MAX_DIM};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::info;

use super::Config;

/// Domain-separation label used when deriving per-trial seeds.
pub const SEED_LABEL_TRIAL: &[u8] = b"capset_random_trial";

/// Result of one random construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrialOutcome {
    pub trial: usize,
    pub size: usize,
    pub rank: usize,
    pub points: Vec<u32>,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub dim: u32,
    pub trials: usize,
    pub tracking: String,
    pub seed: String,
    pub min_size: usize,
    pub max_size: usize,
    pub mean_size: f64,
    /// Cap size -> number of trials.
    pub size_histogram: BTreeMap<usize, usize>,
    /// Affine rank -> number of trials.
    pub rank_histogram: BTreeMap<usize, usize>,
    /// One of the largest caps found.
    pub best: Option<TrialOutcome>,
    pub elapsed_ms: u128,
}

/// Validate command-line configuration.
pub fn validate_config(cfg: &Config) -> eyre::Result<()> {
    if cfg.dim == 0 || cfg.dim > MAX_DIM {
        eyre::bail!("dim must be in [1, {}], got {}", MAX_DIM, cfg.dim);
    }
    if cfg.trials == 0 {
        eyre::bail!("trials must be >= 1");
    }
    if cfg.threads == Some(0) {
        eyre::bail!("threads must be >= 1");
    }
    Ok(())
}

/// Parse seed from hex string or generate random seed.
pub fn parse_or_generate_seed(cfg: &Config) -> eyre::Result<[u8; 32]> {
    let seed = match cfg.seed {
        Some(ref hex_seed) => {
            let bytes = hex::decode(hex_seed.trim_start_matches("0x"))
                .map_err(|e| eyre::eyre!("invalid hex in --seed: {e}"))?;
            <[u8; 32]>::try_from(bytes).map_err(|bytes| {
                eyre::eyre!("--seed must be exactly 32 bytes, got {}", bytes.len())
            })?
        }
        None => {
            let mut seed = [0u8; 32];
            rand::thread_rng().fill_bytes(&mut seed);
            seed
        }
    };
    if cfg.print_seed {
        info!(seed = %format!("0x{}", hex::encode(seed)), "Master seed");
    }
    Ok(seed)
}

pub fn derive_trial_seed(master_seed: &[u8; 32], trial: u64) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(master_seed);
    hasher.update(SEED_LABEL_TRIAL);
    hasher.update(trial.to_le_bytes());
    let hash = hasher.finalize();
    let mut seed = [0u8; 32];
    seed.copy_from_slice(&hash[0..32]);
    seed
}

/// Grow one random complete cap from its own seed.
pub fn run_trial(cfg: &Config, master_seed: &[u8; 32], trial: usize) -> eyre::Result<TrialOutcome> {
    let mut rng = ChaCha20Rng::from_seed(derive_trial_seed(master_seed, trial as u64));
    let mut cap = CapSet::with_tracking(cfg.dim, cfg.tracking)?;
    let size = cap.randomize(&mut rng)?;
    eyre::ensure!(cap.is_complete(), "trial {trial} ended with free points left");
    Ok(TrialOutcome {
        trial,
        size,
        rank: cap.rank(),
        points: cap.points().collect(),
    })
}

/// Aggregate trial outcomes. `outcomes` must be non-empty.
pub fn summarize(
    cfg: &Config,
    master_seed: &[u8; 32],
    outcomes: &[TrialOutcome],
    elapsed: Duration,
) -> Summary {
    let mut size_histogram = BTreeMap::new();
    let mut rank_histogram = BTreeMap::new();
    for outcome in outcomes {
        *size_histogram.entry(outcome.size).or_insert(0) += 1;
        *rank_histogram.entry(outcome.rank).or_insert(0) += 1;
    }
    let total: usize = outcomes.iter().map(|o| o.size).sum();
    let best = outcomes
        .iter()
        .max_by(|a, b| a.size.cmp(&b.size).then(b.trial.cmp(&a.trial)))
        .cloned();

    Summary {
        dim: cfg.dim,
        trials: outcomes.len(),
        tracking: format!("{:?}", cfg.tracking),
        seed: format!("0x{}", hex::encode(master_seed)),
        min_size: outcomes.iter().map(|o| o.size).min().unwrap_or(0),
        max_size: outcomes.iter().map(|o| o.size).max().unwrap_or(0),
        mean_size: total as f64 / outcomes.len().max(1) as f64,
        size_histogram,
        rank_histogram,
        best,
        elapsed_ms: elapsed.as_millis(),
    }
}
