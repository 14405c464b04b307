//! Candidates, their violation cells and the handle used to address them

use serde::{Deserialize, Serialize};

use super::constraint::Constraint;

/// Violation count at the intersection of one candidate and one constraint
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell(f64);

impl Cell {
    pub fn new(violations: f64) -> Self {
        Self(violations)
    }

    pub fn violations(&self) -> f64 {
        self.0
    }

    pub fn set_violations(&mut self, violations: f64) {
        self.0 = violations;
    }
}

impl From<f64> for Cell {
    fn from(violations: f64) -> Self {
        Self(violations)
    }
}

/// Stable address of a candidate inside a tableau set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CandidateRef {
    /// Index of the owning tableau
    pub tableau: usize,
    /// Index of the candidate within that tableau
    pub candidate: usize,
}

impl CandidateRef {
    pub fn new(tableau: usize, candidate: usize) -> Self {
        Self { tableau, candidate }
    }
}

/// One proposed output of a tableau
///
/// A positive frequency marks a winner, zero a loser. Fractional
/// frequencies encode empirical output distributions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    output: String,
    cells: Vec<Cell>,
    frequency: f64,
    /// Back-reference to the owning tableau by index
    tableau: usize,
}

impl Candidate {
    /// Build a candidate whose violation vector is aligned to
    /// `constraint_count`: short vectors are zero-padded, long ones truncated.
    pub fn aligned(
        tableau: usize,
        output: impl Into<String>,
        frequency: f64,
        violations: &[f64],
        constraint_count: usize,
    ) -> Self {
        let mut cells: Vec<Cell> = violations
            .iter()
            .take(constraint_count)
            .copied()
            .map(Cell::new)
            .collect();
        cells.resize(constraint_count, Cell::default());

        Self {
            output: output.into(),
            cells,
            frequency,
            tableau,
        }
    }

    /// Output form
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Index of the tableau this candidate belongs to
    pub fn tableau(&self) -> usize {
        self.tableau
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Violation count for constraint `i`, zero when out of range
    pub fn violation(&self, i: usize) -> f64 {
        self.cells.get(i).map(Cell::violations).unwrap_or(0.0)
    }

    /// Violation counts as plain numbers
    pub fn violations(&self) -> Vec<f64> {
        self.cells.iter().map(Cell::violations).collect()
    }

    /// Overwrite one cell; returns false when `i` is out of range
    pub fn set_violation(&mut self, i: usize, violations: f64) -> bool {
        match self.cells.get_mut(i) {
            Some(cell) => {
                cell.set_violations(violations);
                true
            }
            None => false,
        }
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn set_frequency(&mut self, frequency: f64) {
        self.frequency = frequency;
    }

    pub fn is_winner(&self) -> bool {
        self.frequency > 0.0
    }

    /// Weighted violation total: Σ violation(c) · weight(c)
    ///
    /// Lower harmony is better.
    pub fn harmony(&self, constraints: &[Constraint]) -> f64 {
        self.cells
            .iter()
            .zip(constraints)
            .map(|(cell, con)| cell.violations() * con.weight)
            .sum()
    }

    /// Harmony with a fresh noise term added to every constraint weight
    ///
    /// `noise` is called once per constraint, in constraint order.
    pub fn harmony_with_noise(
        &self,
        constraints: &[Constraint],
        mut noise: impl FnMut() -> f64,
    ) -> f64 {
        let mut total = 0.0;
        for (cell, con) in self.cells.iter().zip(constraints) {
            total += cell.violations() * (con.weight + noise());
        }
        total
    }
}
