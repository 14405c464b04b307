//! # Lingnet Diffusion
//!
//! Grammar diffusion through a population of perceptron learners.
//!
//! ## Stages
//!
//! ```text
//! childhood:  target = sample(own empirical distribution)   -> learn, solve
//! peer:       target = optimum(random connection's grammar)  -> learn, solve
//! ```
//!
//! Each stage runs a number of cycles; a cycle visits every agent in index
//! order and every tableau of that agent's grammar. After each agent's pass
//! its percent-correct score is recorded.

pub mod config;
pub mod demographics;
pub mod network;
pub mod report;
pub mod simulator;

pub use config::SimulationConfig;
pub use demographics::{
    AgeBand, DemographicAssigner, Demographics, Location, Occupation, QuotaAssigner, SpeechProfile,
};
pub use network::{Agent, SocialNetwork};
pub use simulator::{CycleRecord, DegenerateStats, DiffusionSimulator, Stage, StageReport};

/// Diffusion version
pub const DIFFUSION_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Number of agents in a default run
pub const DEFAULT_POPULATION_SIZE: usize = 2;

/// Cycles of learning from the input distribution
pub const DEFAULT_CHILDHOOD_CYCLES: usize = 200;

/// Cycles of learning from peers
pub const DEFAULT_PEER_CYCLES: usize = 10_000;

/// Solve steps following each perceptron update
pub const DEFAULT_SOLVE_ITERATIONS: usize = 1;
