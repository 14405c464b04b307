//! Elementary ranking conditions

use serde::{Deserialize, Serialize};

use crate::model::CandidateRef;

/// Comparison of winner and loser on one constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    /// Winner has fewer violations
    W,
    /// Loser has fewer violations
    L,
    /// Equal
    E,
}

impl Mark {
    pub fn compare(winner: f64, loser: f64) -> Self {
        if winner < loser {
            Mark::W
        } else if winner > loser {
            Mark::L
        } else {
            Mark::E
        }
    }
}

impl std::fmt::Display for Mark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mark::W => write!(f, "W"),
            Mark::L => write!(f, "L"),
            Mark::E => Ok(()),
        }
    }
}

/// Winner ~ loser comparison over all constraints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Erc {
    input: String,
    winner: CandidateRef,
    loser: CandidateRef,
    marks: Vec<Mark>,
    accounted_for: bool,
    /// Index of an earlier ERC with the same marks
    equivalent_to: Option<usize>,
}

impl Erc {
    /// Compare two violation vectors; `None` when their lengths differ
    pub fn compare(
        input: impl Into<String>,
        winner: CandidateRef,
        winner_violations: &[f64],
        loser: CandidateRef,
        loser_violations: &[f64],
    ) -> Option<Self> {
        if winner_violations.len() != loser_violations.len() {
            return None;
        }
        let marks = winner_violations
            .iter()
            .zip(loser_violations)
            .map(|(w, l)| Mark::compare(*w, *l))
            .collect();
        Some(Self {
            input: input.into(),
            winner,
            loser,
            marks,
            accounted_for: false,
            equivalent_to: None,
        })
    }

    /// Build directly from marks
    pub fn from_marks(
        input: impl Into<String>,
        winner: CandidateRef,
        loser: CandidateRef,
        marks: Vec<Mark>,
    ) -> Self {
        Self {
            input: input.into(),
            winner,
            loser,
            marks,
            accounted_for: false,
            equivalent_to: None,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn winner(&self) -> CandidateRef {
        self.winner
    }

    pub fn loser(&self) -> CandidateRef {
        self.loser
    }

    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    pub fn mark(&self, constraint: usize) -> Option<Mark> {
        self.marks.get(constraint).copied()
    }

    pub fn has_l(&self) -> bool {
        self.marks.contains(&Mark::L)
    }

    pub fn has_w(&self) -> bool {
        self.marks.contains(&Mark::W)
    }

    /// Only L marks and no W: no ranking can satisfy this ERC
    pub fn is_unsatisfiable(&self) -> bool {
        self.has_l() && !self.has_w()
    }

    /// Same length and identical marks position by position
    pub fn amounts_to(&self, other: &Erc) -> bool {
        self.marks == other.marks
    }

    pub fn is_accounted_for(&self) -> bool {
        self.accounted_for
    }

    pub fn set_accounted_for(&mut self, accounted_for: bool) {
        self.accounted_for = accounted_for;
    }

    pub fn equivalent_to(&self) -> Option<usize> {
        self.equivalent_to
    }

    pub fn set_equivalent_to(&mut self, erc: Option<usize>) {
        self.equivalent_to = erc;
    }
}
