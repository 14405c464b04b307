//! Simulation configuration
//!
//! Layered: built-in defaults, then an optional TOML file, then `LINGNET__*`
//! environment variables (`.env` honoured).

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use lingnet_common::{LingnetError, DEFAULT_LEARNING_RATE, DEFAULT_NOISE_REPEATS};
use lingnet_grammar::{EvaluationMode, FamilyMultipliers, Perceptron};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "LINGNET";

/// Parameters of one diffusion run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Grammar file every agent learns from
    pub input_path: PathBuf,
    /// Directory receiving report files
    pub output_dir: PathBuf,
    /// Number of agents
    pub population_size: usize,
    /// Cycles of distribution learning
    pub childhood_cycles: usize,
    /// Cycles of peer learning
    pub peer_cycles: usize,
    /// Perceptron step size
    pub learning_rate: f64,
    /// Compare harmonies with evaluation noise
    pub evaluation_noise: bool,
    /// Standard-normal draws summed per noise term
    pub noise_repeats: u32,
    /// Solve steps after each perceptron update
    pub solve_iterations: usize,
    /// Fixed seed for a reproducible run
    pub seed: Option<u64>,
    /// Override of the markedness multiplier
    pub markedness_multiplier: Option<f64>,
    /// Override of the IO-faithfulness multiplier
    pub io_faithfulness_multiplier: Option<f64>,
    /// Override of the OO-faithfulness multiplier
    pub oo_faithfulness_multiplier: Option<f64>,
    /// Write snapshot, series and summary files
    pub write_reports: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("data/coda.txt"),
            output_dir: PathBuf::from("output"),
            population_size: crate::DEFAULT_POPULATION_SIZE,
            childhood_cycles: crate::DEFAULT_CHILDHOOD_CYCLES,
            peer_cycles: crate::DEFAULT_PEER_CYCLES,
            learning_rate: DEFAULT_LEARNING_RATE,
            evaluation_noise: true,
            noise_repeats: DEFAULT_NOISE_REPEATS,
            solve_iterations: crate::DEFAULT_SOLVE_ITERATIONS,
            seed: None,
            markedness_multiplier: None,
            io_faithfulness_multiplier: None,
            oo_faithfulness_multiplier: None,
            write_reports: true,
        }
    }
}

impl SimulationConfig {
    /// Load configuration from defaults, an optional file and the environment
    pub fn load(file: Option<&Path>) -> Result<Self> {
        // Try to load .env file
        let _ = dotenvy::dotenv();

        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?);
        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path.to_path_buf()).required(true));
        }
        let cfg: Self = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;
        Ok(cfg)
    }

    /// Reject parameters the simulator cannot run with
    pub fn validate(&self) -> lingnet_common::Result<()> {
        if self.population_size < 2 {
            return Err(LingnetError::Config(format!(
                "population_size must be at least 2, got {}",
                self.population_size
            )));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(LingnetError::Config(format!(
                "learning_rate must be positive and finite, got {}",
                self.learning_rate
            )));
        }
        let overrides = [
            self.markedness_multiplier,
            self.io_faithfulness_multiplier,
            self.oo_faithfulness_multiplier,
        ];
        if overrides.iter().flatten().any(|m| !m.is_finite()) {
            return Err(LingnetError::Config(
                "family multipliers must be finite".to_string(),
            ));
        }
        Ok(())
    }

    pub fn evaluation_mode(&self) -> EvaluationMode {
        if self.evaluation_noise {
            EvaluationMode::Noisy {
                repeats: self.noise_repeats,
            }
        } else {
            EvaluationMode::Deterministic
        }
    }

    pub fn perceptron(&self) -> Perceptron {
        Perceptron::new(self.learning_rate, self.evaluation_mode())
    }

    /// Apply multiplier overrides on top of `base`
    pub fn multipliers(&self, base: FamilyMultipliers) -> FamilyMultipliers {
        FamilyMultipliers {
            markedness: self.markedness_multiplier.unwrap_or(base.markedness),
            io_faithfulness: self.io_faithfulness_multiplier.unwrap_or(base.io_faithfulness),
            oo_faithfulness: self.oo_faithfulness_multiplier.unwrap_or(base.oo_faithfulness),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = SimulationConfig::default();
        assert_eq!(cfg.population_size, 2);
        assert_eq!(cfg.childhood_cycles, 200);
        assert_eq!(cfg.peer_cycles, 10_000);
        assert_eq!(cfg.learning_rate, 0.1);
        assert_eq!(cfg.evaluation_mode(), EvaluationMode::Noisy { repeats: 1 });
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let cfg = SimulationConfig {
            population_size: 1,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = SimulationConfig {
            learning_rate: 0.0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = SimulationConfig {
            learning_rate: f64::NAN,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_multiplier_overrides() {
        let cfg = SimulationConfig {
            io_faithfulness_multiplier: Some(0.5),
            ..Default::default()
        };
        let m = cfg.multipliers(FamilyMultipliers::default());
        assert_eq!(m.markedness, 2.0);
        assert_eq!(m.io_faithfulness, 0.5);
        assert_eq!(m.oo_faithfulness, 1.0);
    }

    #[test]
    fn test_deterministic_mode() {
        let cfg = SimulationConfig {
            evaluation_noise: false,
            ..Default::default()
        };
        assert_eq!(cfg.perceptron().mode, EvaluationMode::Deterministic);
    }

    #[test]
    fn test_partial_toml_deserializes_with_defaults() {
        let cfg: SimulationConfig = config::Config::builder()
            .add_source(config::File::from_str(
                "population_size = 5\nseed = 42",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(cfg.population_size, 5);
        assert_eq!(cfg.seed, Some(42));
        assert_eq!(cfg.peer_cycles, 10_000);
    }
}
