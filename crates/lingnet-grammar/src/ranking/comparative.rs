//! Comparative tableau and Recursive Constraint Demotion
//!
//! ## RCD
//!
//! ```text
//! repeat until every constraint is placed:
//!     stratum  = remaining constraints with no L in any unaccounted ERC
//!     if stratum is empty -> no ranking exists
//!     ERCs with a W on a constraint of the stratum become accounted for
//! ```
//!
//! The comparative tableau reads a tableau set but never changes it.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::erc::{Erc, Mark};
use crate::model::{CandidateRef, Tableau, TableauSet};

/// Outcome of ranking analysis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankingStatus {
    #[default]
    Unranked,
    NoRankingFound,
    RankingFound,
}

/// Stratified ranking produced by RCD
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    /// Constraint indices per stratum, highest stratum first
    pub strata: Vec<Vec<usize>>,
    /// Constraints that could not be placed
    pub unranked: Vec<usize>,
    pub status: RankingStatus,
}

impl Ranking {
    /// Stratum index of constraint `c`
    pub fn stratum_of(&self, c: usize) -> Option<usize> {
        self.strata.iter().position(|s| s.contains(&c))
    }

    /// Copy stratum indices onto the constraints of `ts`
    ///
    /// Unranked constraints get the stratum below the last one.
    pub fn assign_strata(&self, ts: &mut TableauSet) {
        let bottom = self.strata.len();
        for c in 0..ts.constraint_count() {
            let stratum = self.stratum_of(c).unwrap_or(bottom);
            if let Ok(con) = ts.constraint_mut(c) {
                con.stratum = stratum;
            }
        }
    }
}

/// ERCs of every unique-winner tableau of a set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparativeTableau {
    constraint_names: Vec<String>,
    ercs: Vec<Erc>,
    status: RankingStatus,
}

impl ComparativeTableau {
    pub fn from_tableau_set(ts: &TableauSet) -> Self {
        let mut ct = Self {
            constraint_names: ts.constraints().iter().map(|c| c.short_name.clone()).collect(),
            ercs: Vec::new(),
            status: RankingStatus::Unranked,
        };
        for tableau in ts.tableaux() {
            ct.read_tableau(tableau);
        }
        ct
    }

    /// Add one ERC per loser of a unique-winner tableau
    ///
    /// Tableaux without exactly one winner contribute nothing; losers whose
    /// violation vector differs in length from the winner's are skipped.
    pub fn read_tableau(&mut self, tableau: &Tableau) {
        let Ok(w) = tableau.unique_winner() else {
            return;
        };
        let winner = CandidateRef::new(tableau.index(), w);
        let winner_viol = tableau.candidates()[w].violations();

        for (l, cand) in tableau.candidates().iter().enumerate() {
            if l == w {
                continue;
            }
            let loser = CandidateRef::new(tableau.index(), l);
            let loser_viol = cand.violations();
            if let Some(erc) =
                Erc::compare(tableau.input(), winner, &winner_viol, loser, &loser_viol)
            {
                self.ercs.push(erc);
            }
        }
    }

    pub fn ercs(&self) -> &[Erc] {
        &self.ercs
    }

    pub fn constraint_names(&self) -> &[String] {
        &self.constraint_names
    }

    pub fn ercs_for_input(&self, input: &str) -> Vec<&Erc> {
        self.ercs.iter().filter(|e| e.input() == input).collect()
    }

    /// Remove ERCs by index; false when any index was out of range
    pub fn remove_ercs(&mut self, indices: &[usize]) -> bool {
        let mut sorted: Vec<usize> = indices.to_vec();
        sorted.sort_unstable();
        sorted.dedup();

        let mut success = true;
        for i in sorted.into_iter().rev() {
            if i < self.ercs.len() {
                self.ercs.remove(i);
            } else {
                success = false;
            }
        }
        // Equivalence links are positional
        for erc in &mut self.ercs {
            erc.set_equivalent_to(None);
        }
        success
    }

    pub fn status(&self) -> RankingStatus {
        self.status
    }

    /// Indices of ERCs that no ranking can satisfy
    pub fn unsatisfiable(&self) -> Vec<usize> {
        self.ercs
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_unsatisfiable())
            .map(|(i, _)| i)
            .collect()
    }

    /// Link every ERC to the first earlier ERC it amounts to
    pub fn mark_equivalents(&mut self) -> usize {
        let mut linked = 0;
        for i in 0..self.ercs.len() {
            let earlier = (0..i).find(|j| self.ercs[*j].amounts_to(&self.ercs[i]));
            if earlier.is_some() {
                linked += 1;
            }
            self.ercs[i].set_equivalent_to(earlier);
        }
        linked
    }

    /// Recursive Constraint Demotion over the current ERCs
    pub fn rank(&mut self) -> Ranking {
        for erc in &mut self.ercs {
            erc.set_accounted_for(false);
        }

        let mut remaining: Vec<usize> = (0..self.constraint_names.len()).collect();
        let mut strata = Vec::new();

        while !remaining.is_empty() {
            let stratum: Vec<usize> = remaining
                .iter()
                .copied()
                .filter(|c| {
                    !self
                        .ercs
                        .iter()
                        .any(|e| !e.is_accounted_for() && e.mark(*c) == Some(Mark::L))
                })
                .collect();
            if stratum.is_empty() {
                break;
            }

            for erc in &mut self.ercs {
                let preferred = stratum.iter().any(|c| erc.mark(*c) == Some(Mark::W));
                if !erc.is_accounted_for() && preferred {
                    erc.set_accounted_for(true);
                }
            }
            remaining.retain(|c| !stratum.contains(c));
            strata.push(stratum);
        }

        self.status = if remaining.is_empty() {
            RankingStatus::RankingFound
        } else {
            RankingStatus::NoRankingFound
        };
        debug!(
            strata = strata.len(),
            unranked = remaining.len(),
            status = ?self.status,
            "RCD finished"
        );

        Ranking {
            strata,
            unranked: remaining,
            status: self.status,
        }
    }

    /// Plain-text rendering, outputs resolved through `ts`
    ///
    /// Rows of ERCs not accounted for by the last ranking are flagged with `!`.
    pub fn render(&self, ts: &TableauSet) -> String {
        let mut out = String::new();
        out.push_str("input\twinner ~ loser");
        for name in &self.constraint_names {
            out.push('\t');
            out.push_str(name);
        }
        out.push('\n');

        let mut previous_input: Option<&str> = None;
        for erc in &self.ercs {
            if previous_input != Some(erc.input()) {
                out.push_str(erc.input());
            }
            previous_input = Some(erc.input());

            let output = |r: CandidateRef| {
                ts.candidate(r)
                    .map(|c| c.output().to_string())
                    .unwrap_or_else(|_| "?".to_string())
            };
            let flag = if erc.is_accounted_for() { "" } else { "!" };
            out.push_str(&format!("\t{}{} ~ {}", flag, output(erc.winner()), output(erc.loser())));
            for mark in erc.marks() {
                out.push_str(&format!("\t{mark}"));
            }
            out.push('\n');
        }
        out
    }
}
