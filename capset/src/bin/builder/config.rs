use capset::Tracking;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Random cap construction over GF(2)^n", long_about = None)]
pub struct Config {
    /// Dimension of the binary vector space (universe is 0..2^dim)
    #[arg(short, long, env = "CAPSET_DIM", default_value = "8")]
    pub dim: u32,

    /// Number of independent random constructions
    #[arg(short, long, env = "CAPSET_TRIALS", default_value = "100")]
    pub trials: usize,

    /// Combination lengths to track: `triples`, `all`, or an odd maximum length
    #[arg(
        long,
        env = "CAPSET_TRACKING",
        default_value = "triples",
        value_parser = parse_tracking
    )]
    pub tracking: Tracking,

    /// Master seed as a 64-char hex string; random if omitted
    #[arg(long, env = "CAPSET_SEED")]
    pub seed: Option<String>,

    /// Print the master seed after generation/parsing
    #[arg(long)]
    pub print_seed: bool,

    /// Worker threads for running trials (defaults to rayon's choice)
    #[arg(long, env = "CAPSET_THREADS")]
    pub threads: Option<usize>,

    /// Optional path to write the JSON summary
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// Parses `triples`, `all`, or an odd integer bound `k >= 3`.
pub fn parse_tracking(raw: &str) -> Result<Tracking, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "triples" | "3" => Ok(Tracking::Triples),
        "all" => Ok(Tracking::AllOdd),
        other => {
            let max: usize = other
                .parse()
                .map_err(|_| format!("expected `triples`, `all` or an odd length, got `{raw}`"))?;
            if max < 3 || max % 2 == 0 {
                return Err(format!("tracked length must be odd and >= 3, got {max}"));
            }
            Ok(Tracking::UpTo(max))
        }
    }
}
