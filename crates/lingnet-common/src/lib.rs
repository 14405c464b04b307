//! # Lingnet Common
//!
//! Shared errors, randomness and defaults for the Lingnet grammar diffusion model.
//!
//! ## Contents
//!
//! - [`LingnetError`]: unified error type with ingestion, sampling, lookup and
//!   ranking sub-errors
//! - [`SimRng`]: the single injectable randomness source of a simulation run
//! - Default parameters shared by the grammar and diffusion crates

pub mod error;
pub mod rng;

// Re-export commonly used types at crate root
pub use error::{IngestError, LingnetError, LookupError, RankingError, Result, SamplingError};
pub use rng::SimRng;

/// Lingnet version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Weight every constraint starts with
pub const DEFAULT_CONSTRAINT_WEIGHT: f64 = 10.0;

/// Perceptron step size (η)
pub const DEFAULT_LEARNING_RATE: f64 = 0.1;

/// Update multiplier for markedness constraints
pub const DEFAULT_MARKEDNESS_MULTIPLIER: f64 = 2.0;

/// Update multiplier for input-output faithfulness constraints
pub const DEFAULT_IO_FAITHFULNESS_MULTIPLIER: f64 = 2.0;

/// Update multiplier for output-output faithfulness constraints
pub const DEFAULT_OO_FAITHFULNESS_MULTIPLIER: f64 = 1.0;

/// Global evaluation noise amplitude of a tableau set
pub const DEFAULT_GLOBAL_NOISE: f64 = 0.2;

/// Bias a constraint carries until the input file sets one
pub const DEFAULT_CONSTRAINT_BIAS: f64 = -1.0;

/// Number of summed standard-normal draws per noisy evaluation
pub const DEFAULT_NOISE_REPEATS: u32 = 1;

/// Largest typology the ranking analysis will enumerate by default
pub const DEFAULT_TYPOLOGY_LIMIT: u128 = 4096;
