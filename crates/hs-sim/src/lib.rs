//! # hs-sim - Batch Simulator
//!
//! Plays many independent seeded rounds of one theme across a rayon pool and
//! reports return-to-player, hit rate, bonus frequency and conservation
//! violations.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let theme = Arc::new(hs_slot::durov());
//! let report = simulate(theme, &SimConfig::default().with_rounds(1_000_000))?;
//! println!("{}", report.summary());
//! ```
//!
//! Rounds are split into fixed-size chunks. Each chunk gets its own session,
//! ledger and `ChaCha8Rng` seeded from `seed + chunk index`, so a report is
//! reproducible for a given config regardless of thread count.

mod report;
mod runner;

pub use report::*;
pub use runner::*;

use hs_slot::EngineError;
use thiserror::Error;

/// Simulator errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid simulation config: {0}")]
    InvalidConfig(String),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
}

/// Result type for simulations
pub type SimResult<T> = Result<T, SimError>;
