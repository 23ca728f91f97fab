//! Random cap builder support.
//!
//! Parses the run configuration, derives one reproducible seed per trial from
//! a master seed, grows a random complete cap per trial and summarizes the
//! resulting sizes and affine ranks.

pub mod config;
pub mod driver;

pub use config::Config;
pub use driver::{parse_or_generate_seed, run_trial, summarize, validate_config, TrialOutcome};
