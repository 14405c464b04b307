//! Perceptron weight learner
//!
//! ## Update rule
//!
//! ```text
//! weight(c) -= η · violation_winner(c) · multiplier(family(c))
//! weight(c) += η · violation_loser(c)  · multiplier(family(c))
//! ```
//!
//! A solve step samples a tableau by winner frequency and updates against
//! every sibling the winner does not yet beat.

use serde::{Deserialize, Serialize};
use tracing::trace;

use lingnet_common::{LookupError, Result, SimRng, DEFAULT_LEARNING_RATE, DEFAULT_NOISE_REPEATS};

use super::harmony::{noisy_harmony, random_tableau};
use crate::model::{CandidateRef, TableauSet};

/// How harmonies are compared during a solve step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvaluationMode {
    /// Plain weighted totals
    Deterministic,
    /// Every weight perturbed by a sum of `repeats` standard-normal draws
    Noisy { repeats: u32 },
}

impl Default for EvaluationMode {
    fn default() -> Self {
        EvaluationMode::Noisy {
            repeats: DEFAULT_NOISE_REPEATS,
        }
    }
}

/// Record of one solve step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveStep {
    /// Tableau that was sampled
    pub tableau: usize,
    /// Its winner
    pub winner: CandidateRef,
    /// Number of weight updates performed
    pub updates: usize,
}

/// Accumulated result of several solve steps
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SolveSummary {
    pub steps: usize,
    pub updates: usize,
}

impl SolveSummary {
    pub fn record(&mut self, step: &SolveStep) {
        self.steps += 1;
        self.updates += step.updates;
    }
}

/// Weight learner; holds only its parameters, the grammar is passed per call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Perceptron {
    /// Step size η
    pub learning_rate: f64,
    pub mode: EvaluationMode,
}

impl Default for Perceptron {
    fn default() -> Self {
        Self {
            learning_rate: DEFAULT_LEARNING_RATE,
            mode: EvaluationMode::default(),
        }
    }
}

impl Perceptron {
    pub fn new(learning_rate: f64, mode: EvaluationMode) -> Self {
        Self { learning_rate, mode }
    }

    /// Move weights so `winner` gains on `loser`
    ///
    /// Both candidates must belong to the same tableau.
    pub fn learn(
        &self,
        ts: &mut TableauSet,
        winner: CandidateRef,
        loser: CandidateRef,
    ) -> Result<()> {
        if winner.tableau != loser.tableau {
            return Err(LookupError::TableauMismatch {
                winner: winner.tableau,
                loser: loser.tableau,
            }
            .into());
        }
        let winner_viol = ts.candidate(winner)?.violations();
        let loser_viol = ts.candidate(loser)?.violations();
        let multipliers: Vec<f64> = ts
            .constraints()
            .iter()
            .map(|c| ts.multipliers.for_family(c.family))
            .collect();

        let eta = self.learning_rate;
        for (c, v) in winner_viol.iter().enumerate() {
            ts.constraint_mut(c)?.weight -= v * eta * multipliers[c];
        }
        for (c, v) in loser_viol.iter().enumerate() {
            ts.constraint_mut(c)?.weight += v * eta * multipliers[c];
        }
        Ok(())
    }

    /// One sampled tableau, updates against every sibling not yet beaten
    pub fn solve_step(&self, ts: &mut TableauSet, rng: &mut SimRng) -> Result<SolveStep> {
        let tableau = random_tableau(ts, rng)?;
        let winner = CandidateRef::new(tableau, ts.tableau(tableau)?.unique_winner()?);
        let candidate_count = ts.tableau(tableau)?.candidate_count();

        let mut updates = 0;
        for c in 0..candidate_count {
            if c == winner.candidate {
                continue;
            }
            let loser = CandidateRef::new(tableau, c);
            if self.needs_update(ts, winner, loser, rng)? {
                self.learn(ts, winner, loser)?;
                updates += 1;
            }
        }

        trace!(tableau, updates, "Solve step");
        Ok(SolveStep {
            tableau,
            winner,
            updates,
        })
    }

    /// Run `iterations` solve steps, stopping at the first failure
    pub fn solve(
        &self,
        ts: &mut TableauSet,
        iterations: usize,
        rng: &mut SimRng,
    ) -> Result<SolveSummary> {
        let mut summary = SolveSummary::default();
        for _ in 0..iterations {
            let step = self.solve_step(ts, rng)?;
            summary.record(&step);
        }
        Ok(summary)
    }

    /// Winner scores worse than or equal to the loser (lower is better)
    fn needs_update(
        &self,
        ts: &TableauSet,
        winner: CandidateRef,
        loser: CandidateRef,
        rng: &mut SimRng,
    ) -> Result<bool> {
        let (w, l) = match self.mode {
            EvaluationMode::Deterministic => (ts.harmony(winner)?, ts.harmony(loser)?),
            EvaluationMode::Noisy { repeats } => (
                noisy_harmony(ts, winner, repeats, rng)?,
                noisy_harmony(ts, loser, repeats, rng)?,
            ),
        };
        Ok(w >= l)
    }
}
