//! TableauSet - tableaux sharing a single constraint ranking
//!
//! ```text
//!                 Max    Dep    *Coda
//! /tap/
//!      1.0 [tap]                  *
//!      0.0 [ta]    *
//! /am/
//!      0.2 [ʔam]          *       *
//!      0.8 [ʔa]    *      *
//! ```
//!
//! Every tableau of a set is evaluated against the same constraint list, so
//! a weight change made while learning one tableau affects all of them.
//! Candidates are numbered 1..=N across the whole set in insertion order.

use serde::{Deserialize, Serialize};

use lingnet_common::{
    LookupError, Result, DEFAULT_GLOBAL_NOISE, DEFAULT_IO_FAITHFULNESS_MULTIPLIER,
    DEFAULT_MARKEDNESS_MULTIPLIER, DEFAULT_OO_FAITHFULNESS_MULTIPLIER,
};

use super::candidate::{Candidate, CandidateRef};
use super::constraint::{Constraint, ConstraintFamily};
use super::tableau::Tableau;

/// Per-family scaling of perceptron updates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FamilyMultipliers {
    pub markedness: f64,
    pub io_faithfulness: f64,
    pub oo_faithfulness: f64,
}

impl Default for FamilyMultipliers {
    fn default() -> Self {
        Self {
            markedness: DEFAULT_MARKEDNESS_MULTIPLIER,
            io_faithfulness: DEFAULT_IO_FAITHFULNESS_MULTIPLIER,
            oo_faithfulness: DEFAULT_OO_FAITHFULNESS_MULTIPLIER,
        }
    }
}

impl FamilyMultipliers {
    /// Multiplier for a constraint of the given family; 1.0 for any other
    pub fn for_family(&self, family: Option<ConstraintFamily>) -> f64 {
        match family {
            Some(ConstraintFamily::Markedness) => self.markedness,
            Some(ConstraintFamily::InputOutputFaithfulness) => self.io_faithfulness,
            Some(ConstraintFamily::OutputOutputFaithfulness) => self.oo_faithfulness,
            _ => 1.0,
        }
    }
}

/// Tableaux plus the one constraint ranking they share
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableauSet {
    constraints: Vec<Constraint>,
    tableaux: Vec<Tableau>,
    /// Default minimum weight for constraints without a local override
    pub min_constraint_weight: f64,
    /// Global evaluation noise amplitude
    pub noise: f64,
    /// Update multipliers per constraint family
    pub multipliers: FamilyMultipliers,
    /// `[rate]` directive value
    pub rate: f64,
    /// `[output stage]` directive value
    pub output_stage: f64,
    /// `[lexically specific constraints]` directive value
    pub lexically_specific_constraints: bool,
    /// Name of the file this set was read from
    pub source_name: String,
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl Default for TableauSet {
    fn default() -> Self {
        Self::new()
    }
}

impl TableauSet {
    /// Create an empty tableau set with default settings
    pub fn new() -> Self {
        Self {
            constraints: Vec::new(),
            tableaux: Vec::new(),
            min_constraint_weight: 0.0,
            noise: DEFAULT_GLOBAL_NOISE,
            multipliers: FamilyMultipliers::default(),
            rate: 0.0,
            output_stage: 0.0,
            lexically_specific_constraints: false,
            source_name: String::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    // ---- Constraints ----

    /// Append a constraint, returning its index
    ///
    /// Existing candidates are padded with a zero cell so every violation
    /// vector stays aligned with the constraint list.
    pub fn add_constraint(&mut self, constraint: Constraint) -> usize {
        self.constraints.push(constraint);
        let count = self.constraints.len();
        for tableau in &mut self.tableaux {
            for cand in tableau.candidates_mut() {
                let violations = cand.violations();
                *cand = Candidate::aligned(
                    cand.tableau(),
                    cand.output().to_string(),
                    cand.frequency(),
                    &violations,
                    count,
                );
            }
        }
        count - 1
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn constraint(&self, index: usize) -> Result<&Constraint> {
        let count = self.constraints.len();
        self.constraints
            .get(index)
            .ok_or_else(|| LookupError::Constraint { index, count }.into())
    }

    pub fn constraint_mut(&mut self, index: usize) -> Result<&mut Constraint> {
        let count = self.constraints.len();
        self.constraints
            .get_mut(index)
            .ok_or_else(|| LookupError::Constraint { index, count }.into())
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Current weights in constraint order
    pub fn weights(&self) -> Vec<f64> {
        self.constraints.iter().map(|c| c.weight).collect()
    }

    /// Overwrite weights in constraint order; extra values are ignored
    pub fn set_weights(&mut self, weights: &[f64]) {
        for (con, weight) in self.constraints.iter_mut().zip(weights) {
            con.weight = *weight;
        }
    }

    /// Put every constraint back at its effective minimum weight
    pub fn reset_weights(&mut self) {
        let default_min = self.min_constraint_weight;
        for con in &mut self.constraints {
            con.weight = con.effective_min_weight(default_min);
        }
    }

    /// Update multiplier for constraint `index`
    pub fn family_multiplier(&self, index: usize) -> Result<f64> {
        let con = self.constraint(index)?;
        Ok(self.multipliers.for_family(con.family))
    }

    // ---- Tableaux ----

    /// Start a new tableau for `input`, returning its index
    pub fn add_tableau(&mut self, input: impl Into<String>) -> usize {
        let index = self.tableaux.len();
        self.tableaux.push(Tableau::new(index, input));
        index
    }

    /// Append a candidate to tableau `tableau`
    ///
    /// The violation vector is zero-padded or truncated to the constraint
    /// count.
    pub fn add_candidate(
        &mut self,
        tableau: usize,
        output: impl Into<String>,
        frequency: f64,
        violations: &[f64],
    ) -> Result<CandidateRef> {
        let constraint_count = self.constraints.len();
        let count = self.tableaux.len();
        let tabl = self
            .tableaux
            .get_mut(tableau)
            .ok_or(LookupError::Tableau {
                index: tableau,
                count,
            })?;
        let candidate = tabl.push_candidate(Candidate::aligned(
            tableau,
            output,
            frequency,
            violations,
            constraint_count,
        ));
        Ok(CandidateRef::new(tableau, candidate))
    }

    pub fn tableaux(&self) -> &[Tableau] {
        &self.tableaux
    }

    pub fn tableau(&self, index: usize) -> Result<&Tableau> {
        let count = self.tableaux.len();
        self.tableaux
            .get(index)
            .ok_or_else(|| LookupError::Tableau { index, count }.into())
    }

    pub(crate) fn tableau_mut(&mut self, index: usize) -> Result<&mut Tableau> {
        let count = self.tableaux.len();
        self.tableaux
            .get_mut(index)
            .ok_or_else(|| LookupError::Tableau { index, count }.into())
    }

    pub fn tableau_count(&self) -> usize {
        self.tableaux.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tableaux.is_empty()
    }

    // ---- Candidates ----

    pub fn candidate(&self, r: CandidateRef) -> Result<&Candidate> {
        let tableau = self.tableau(r.tableau)?;
        tableau.candidate(r.candidate).ok_or_else(|| {
            LookupError::Candidate {
                tableau: r.tableau,
                index: r.candidate,
                count: tableau.candidate_count(),
            }
            .into()
        })
    }

    /// Harmony of one candidate under the current weights
    pub fn harmony(&self, r: CandidateRef) -> Result<f64> {
        Ok(self.candidate(r)?.harmony(&self.constraints))
    }

    /// Every candidate handle in flattened (numbering) order
    pub fn candidate_refs(&self) -> impl Iterator<Item = CandidateRef> + '_ {
        self.tableaux.iter().enumerate().flat_map(|(t, tabl)| {
            (0..tabl.candidate_count()).map(move |c| CandidateRef::new(t, c))
        })
    }

    /// Total number of candidates across all tableaux
    pub fn candidate_count(&self) -> usize {
        self.tableaux.iter().map(Tableau::candidate_count).sum()
    }

    /// Number of languages: the product of every tableau's candidate count
    ///
    /// Saturates instead of overflowing; an empty set has one (empty) language.
    pub fn language_count(&self) -> u128 {
        self.tableaux
            .iter()
            .fold(1u128, |acc, t| acc.saturating_mul(t.candidate_count() as u128))
    }

    /// Candidate addressed by its 1-based number across the set
    pub fn candidate_by_number(&self, number: usize) -> Result<CandidateRef> {
        let count = self.candidate_count();
        if number == 0 || number > count {
            return Err(LookupError::CandidateNumber { number, count }.into());
        }

        let mut remaining = number - 1;
        for (t, tabl) in self.tableaux.iter().enumerate() {
            if remaining < tabl.candidate_count() {
                return Ok(CandidateRef::new(t, remaining));
            }
            remaining -= tabl.candidate_count();
        }
        Err(LookupError::CandidateNumber { number, count }.into())
    }

    /// 1-based number of a candidate across the set
    pub fn candidate_number(&self, r: CandidateRef) -> Result<usize> {
        self.candidate(r)?;
        let before: usize = self.tableaux[..r.tableau]
            .iter()
            .map(Tableau::candidate_count)
            .sum();
        Ok(before + r.candidate + 1)
    }

    // ---- Frequencies and winners ----

    /// Make `r` the only winner of its tableau (frequency 1, siblings 0)
    pub fn make_winner(&mut self, r: CandidateRef) -> Result<()> {
        self.candidate(r)?;
        self.tableau_mut(r.tableau)?.set_unique_winner(r.candidate);
        Ok(())
    }

    pub fn set_frequencies_to_zero(&mut self) {
        for tableau in &mut self.tableaux {
            for cand in tableau.candidates_mut() {
                cand.set_frequency(0.0);
            }
        }
    }

    /// Zero every frequency, then give each listed candidate frequency 1
    ///
    /// All handles are checked before anything is changed.
    pub fn set_winners(&mut self, winners: &[CandidateRef]) -> Result<()> {
        for r in winners {
            self.candidate(*r)?;
        }
        self.set_frequencies_to_zero();
        for r in winners {
            self.tableaux[r.tableau].candidates_mut()[r.candidate].set_frequency(1.0);
        }
        Ok(())
    }

    /// Snapshot of every candidate frequency, tableau by tableau
    pub fn candidate_frequencies(&self) -> Vec<Vec<f64>> {
        self.tableaux
            .iter()
            .map(|t| t.candidates().iter().map(Candidate::frequency).collect())
            .collect()
    }

    /// Restore frequencies from a snapshot; entries beyond the set's shape
    /// are ignored
    pub fn set_candidate_frequencies(&mut self, frequencies: &[Vec<f64>]) {
        for (tableau, freqs) in self.tableaux.iter_mut().zip(frequencies) {
            for (cand, freq) in tableau.candidates_mut().iter_mut().zip(freqs) {
                cand.set_frequency(*freq);
            }
        }
    }

    pub fn has_unique_winners(&self) -> bool {
        self.tableaux.iter().all(Tableau::has_unique_winner)
    }

    /// Record an error for every tableau with more than one winner
    ///
    /// Returns the number of offending tableaux.
    pub fn validate_winners(&mut self) -> usize {
        let offending: Vec<usize> = self
            .tableaux
            .iter()
            .enumerate()
            .filter(|(_, t)| t.winner_count() > 1)
            .map(|(i, _)| i)
            .collect();
        for i in &offending {
            self.add_error(format!("Tableau {} has more than one winner.", i + 1));
        }
        offending.len()
    }

    // ---- Errors and warnings ----

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }
}

/// Plain-text rendering: weights, then every tableau with weighted totals
impl std::fmt::Display for TableauSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.source_name.is_empty() {
            writeln!(f, "{}", self.source_name)?;
        }
        for con in &self.constraints {
            writeln!(f, "{:<24}{:>10.3}", con.name, con.weight)?;
        }

        let header: Vec<&str> = self.constraints.iter().map(|c| c.short_name.as_str()).collect();
        for tableau in &self.tableaux {
            writeln!(f)?;
            writeln!(f, "/{}/\t\t\t{}\tH", tableau.input(), header.join("\t"))?;
            for cand in tableau.candidates() {
                let cells: Vec<String> = cand.violations().iter().map(|v| v.to_string()).collect();
                writeln!(
                    f,
                    "\t[{}]\t{}\t{}\t{:.3}",
                    cand.output(),
                    cand.frequency(),
                    cells.join("\t"),
                    cand.harmony(&self.constraints)
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_set() -> TableauSet {
        let mut ts = TableauSet::new();
        ts.add_constraint(
            Constraint::new("Max", "Max").with_family(ConstraintFamily::InputOutputFaithfulness),
        );
        ts.add_constraint(
            Constraint::new("NoCoda", "*Coda").with_family(ConstraintFamily::Markedness),
        );
        let tap = ts.add_tableau("tap");
        ts.add_candidate(tap, "tap", 1.0, &[0.0, 1.0]).unwrap();
        ts.add_candidate(tap, "ta", 0.0, &[1.0]).unwrap();
        let am = ts.add_tableau("am");
        ts.add_candidate(am, "am", 0.0, &[0.0, 1.0]).unwrap();
        ts.add_candidate(am, "a", 1.0, &[1.0, 0.0]).unwrap();
        ts.add_candidate(am, "ma", 0.0, &[]).unwrap();
        ts
    }

    #[test]
    fn test_counts() {
        let ts = sample_set();
        assert_eq!(ts.constraint_count(), 2);
        assert_eq!(ts.tableau_count(), 2);
        assert_eq!(ts.candidate_count(), 5);
        assert_eq!(ts.language_count(), 6);
    }

    #[test]
    fn test_language_count_empty_set() {
        assert_eq!(TableauSet::new().language_count(), 1);
    }

    #[test]
    fn test_candidate_numbering_round_trip() {
        let ts = sample_set();
        for number in 1..=ts.candidate_count() {
            let r = ts.candidate_by_number(number).unwrap();
            assert_eq!(ts.candidate_number(r).unwrap(), number);
        }
        assert_eq!(ts.candidate_by_number(3).unwrap(), CandidateRef::new(1, 0));
    }

    #[test]
    fn test_candidate_number_out_of_range() {
        let ts = sample_set();
        assert!(ts.candidate_by_number(0).is_err());
        assert!(ts.candidate_by_number(6).is_err());
        assert!(ts.candidate_number(CandidateRef::new(1, 3)).is_err());
        assert!(ts.candidate_number(CandidateRef::new(2, 0)).is_err());
    }

    #[test]
    fn test_violation_vectors_aligned() {
        let ts = sample_set();
        for r in ts.candidate_refs() {
            assert_eq!(ts.candidate(r).unwrap().cells().len(), ts.constraint_count());
        }
    }

    #[test]
    fn test_add_constraint_pads_existing_candidates() {
        let mut ts = sample_set();
        ts.add_constraint(Constraint::new("Dep", "Dep"));
        for r in ts.candidate_refs() {
            let cand = ts.candidate(r).unwrap();
            assert_eq!(cand.cells().len(), 3);
            assert_eq!(cand.violation(2), 0.0);
        }
    }

    #[test]
    fn test_make_winner() {
        let mut ts = sample_set();
        ts.make_winner(CandidateRef::new(1, 2)).unwrap();
        assert_eq!(ts.tableau(1).unwrap().winners(), vec![2]);
        // other tableaux untouched
        assert_eq!(ts.tableau(0).unwrap().winners(), vec![0]);
        assert!(ts.make_winner(CandidateRef::new(0, 5)).is_err());
    }

    #[test]
    fn test_set_winners_validates_first() {
        let mut ts = sample_set();
        let before = ts.candidate_frequencies();
        assert!(ts
            .set_winners(&[CandidateRef::new(0, 1), CandidateRef::new(9, 0)])
            .is_err());
        assert_eq!(ts.candidate_frequencies(), before);

        ts.set_winners(&[CandidateRef::new(0, 1), CandidateRef::new(1, 0)])
            .unwrap();
        assert_eq!(ts.tableau(0).unwrap().winners(), vec![1]);
        assert_eq!(ts.tableau(1).unwrap().winners(), vec![0]);
    }

    #[test]
    fn test_frequency_snapshot_restore() {
        let mut ts = sample_set();
        let snapshot = ts.candidate_frequencies();
        ts.set_frequencies_to_zero();
        assert!(!ts.tableau(0).unwrap().has_winners());
        ts.set_candidate_frequencies(&snapshot);
        assert_eq!(ts.candidate_frequencies(), snapshot);
    }

    #[test]
    fn test_validate_winners_records_error() {
        let mut ts = sample_set();
        ts.add_candidate(0, "tapə", 0.5, &[0.0, 0.0]).unwrap();
        assert_eq!(ts.validate_winners(), 1);
        assert_eq!(ts.errors(), &["Tableau 1 has more than one winner.".to_string()]);
        assert!(!ts.has_unique_winners());
    }

    #[test]
    fn test_family_multiplier() {
        let mut ts = sample_set();
        ts.add_constraint(
            Constraint::new("Ident-OO", "IdOO")
                .with_family(ConstraintFamily::OutputOutputFaithfulness),
        );
        ts.add_constraint(Constraint::new("Plain", "P"));
        assert_eq!(ts.family_multiplier(0).unwrap(), 2.0);
        assert_eq!(ts.family_multiplier(1).unwrap(), 2.0);
        assert_eq!(ts.family_multiplier(2).unwrap(), 1.0);
        assert_eq!(ts.family_multiplier(3).unwrap(), 1.0);
        assert!(ts.family_multiplier(4).is_err());
    }

    #[test]
    fn test_reset_weights_uses_effective_minimum() {
        let mut ts = sample_set();
        ts.min_constraint_weight = 1.0;
        ts.constraint_mut(1).unwrap().min_weight = Some(4.0);
        ts.reset_weights();
        assert_eq!(ts.weights(), vec![1.0, 4.0]);
    }

    #[test]
    fn test_harmony_lookup() {
        let ts = sample_set();
        assert_eq!(ts.harmony(CandidateRef::new(1, 1)).unwrap(), 10.0);
        assert!(ts.harmony(CandidateRef::new(3, 0)).is_err());
    }
}
