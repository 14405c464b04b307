//! A tableau: one input form and the candidates realizing it

use serde::{Deserialize, Serialize};

use lingnet_common::SamplingError;

use super::candidate::Candidate;
use super::constraint::Constraint;

/// One input and its candidate outputs
///
/// The constraint list is owned by the enclosing
/// [`TableauSet`](super::TableauSet); operations that need weights take it
/// as an argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tableau {
    index: usize,
    input: String,
    candidates: Vec<Candidate>,
}

impl Tableau {
    pub(crate) fn new(index: usize, input: impl Into<String>) -> Self {
        Self {
            index,
            input: input.into(),
            candidates: Vec::new(),
        }
    }

    /// Position of this tableau in its tableau set
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub(crate) fn candidates_mut(&mut self) -> &mut [Candidate] {
        &mut self.candidates
    }

    pub fn candidate(&self, i: usize) -> Option<&Candidate> {
        self.candidates.get(i)
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    pub(crate) fn push_candidate(&mut self, candidate: Candidate) -> usize {
        self.candidates.push(candidate);
        self.candidates.len() - 1
    }

    /// Indices of candidates with positive frequency
    pub fn winners(&self) -> Vec<usize> {
        self.candidates
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_winner())
            .map(|(i, _)| i)
            .collect()
    }

    /// Indices of candidates with zero (or negative) frequency
    pub fn losers(&self) -> Vec<usize> {
        self.candidates
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_winner())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn winner_count(&self) -> usize {
        self.candidates.iter().filter(|c| c.is_winner()).count()
    }

    pub fn has_winners(&self) -> bool {
        self.candidates.iter().any(Candidate::is_winner)
    }

    pub fn has_unique_winner(&self) -> bool {
        self.winner_count() == 1
    }

    /// The single winner, or the degenerate condition preventing one
    pub fn unique_winner(&self) -> Result<usize, SamplingError> {
        match self.winners().as_slice() {
            [winner] => Ok(*winner),
            [] => Err(SamplingError::NoWinner { tableau: self.index }),
            many => Err(SamplingError::AmbiguousWinner {
                tableau: self.index,
                winners: many.len(),
            }),
        }
    }

    pub fn sum_of_frequencies(&self) -> f64 {
        self.candidates.iter().map(Candidate::frequency).sum()
    }

    /// Frequency 1 for `winner`, 0 for every sibling. Returns false when
    /// `winner` is out of range, leaving frequencies untouched.
    pub fn set_unique_winner(&mut self, winner: usize) -> bool {
        if winner >= self.candidates.len() {
            return false;
        }
        for (i, cand) in self.candidates.iter_mut().enumerate() {
            cand.set_frequency(if i == winner { 1.0 } else { 0.0 });
        }
        true
    }

    /// Harmony of every candidate, in candidate order
    pub fn harmonies(&self, constraints: &[Constraint]) -> Vec<f64> {
        self.candidates
            .iter()
            .map(|c| c.harmony(constraints))
            .collect()
    }

    /// Candidates sharing the minimal harmony, in candidate order
    pub fn minimal_harmony_set(&self, constraints: &[Constraint]) -> Vec<usize> {
        let mut best: Vec<usize> = Vec::new();
        let mut best_harmony = f64::INFINITY;
        for (i, harmony) in self.harmonies(constraints).into_iter().enumerate() {
            if best.is_empty() || harmony < best_harmony {
                best.clear();
                best.push(i);
                best_harmony = harmony;
            } else if harmony == best_harmony {
                best.push(i);
            }
        }
        best
    }
}

impl std::fmt::Display for Tableau {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}/ ({} candidates)", self.input, self.candidates.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tableau(freqs: &[f64]) -> Tableau {
        let mut t = Tableau::new(4, "tap");
        for (i, f) in freqs.iter().enumerate() {
            t.push_candidate(Candidate::aligned(4, format!("c{i}"), *f, &[i as f64], 1));
        }
        t
    }

    #[test]
    fn test_winners_and_losers() {
        let t = tableau(&[0.0, 2.5, 0.0]);
        assert_eq!(t.winners(), vec![1]);
        assert_eq!(t.losers(), vec![0, 2]);
        assert!(t.has_unique_winner());
        assert_eq!(t.unique_winner(), Ok(1));
        assert_eq!(t.sum_of_frequencies(), 2.5);
    }

    #[test]
    fn test_unique_winner_errors() {
        let none = tableau(&[0.0, 0.0]);
        assert_eq!(none.unique_winner(), Err(SamplingError::NoWinner { tableau: 4 }));

        let many = tableau(&[0.3, 0.7]);
        assert_eq!(
            many.unique_winner(),
            Err(SamplingError::AmbiguousWinner {
                tableau: 4,
                winners: 2
            })
        );
    }

    #[test]
    fn test_set_unique_winner() {
        let mut t = tableau(&[0.4, 0.6, 0.0]);
        assert!(t.set_unique_winner(2));
        assert_eq!(t.winners(), vec![2]);
        assert_eq!(t.candidate(2).map(Candidate::frequency), Some(1.0));
        assert!(!t.set_unique_winner(9));
        assert_eq!(t.winners(), vec![2]);
    }

    #[test]
    fn test_minimal_harmony_set_ties() {
        let constraints = vec![Constraint::new("A", "A")];
        let mut t = Tableau::new(0, "x");
        t.push_candidate(Candidate::aligned(0, "a", 0.0, &[1.0], 1));
        t.push_candidate(Candidate::aligned(0, "b", 0.0, &[0.0], 1));
        t.push_candidate(Candidate::aligned(0, "c", 0.0, &[0.0], 1));
        assert_eq!(t.minimal_harmony_set(&constraints), vec![1, 2]);
    }

    #[test]
    fn test_minimal_harmony_set_empty_tableau() {
        let t = Tableau::new(0, "x");
        assert!(t.minimal_harmony_set(&[]).is_empty());
    }
}
