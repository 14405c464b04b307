//! # Lingnet Grammar
//!
//! Weighted-constraint grammars: the tableau data model, the perceptron
//! learner and the ranking analysis built on top of it.
//!
//! ## Harmony
//!
//! ```text
//! H(candidate) = Σ violations(c) × weight(c)
//! ```
//!
//! The candidate with the lowest harmony wins its tableau.
//!
//! ## Modules
//!
//! - [`model`]: constraints, candidates, tableaux, tableau sets
//! - [`ingest`]: the tab-separated grammar file reader
//! - [`learning`]: winner selection, sampling and the perceptron
//! - [`ranking`]: ERCs, Recursive Constraint Demotion, typology

pub mod ingest;
pub mod learning;
pub mod model;
pub mod ranking;

pub use ingest::{parse_tableau_set, read_tableau_set, ParseReport};
pub use learning::{
    find_optimal_candidate, random_tableau, sample_candidate, select_optimal, EvaluationMode,
    Perceptron, SolveStep, SolveSummary,
};
pub use model::{
    Candidate, CandidateRef, Cell, Constraint, ConstraintFamily, FamilyMultipliers, Tableau,
    TableauSet,
};
pub use ranking::{ComparativeTableau, Erc, Language, Mark, Ranking, RankingStatus};
