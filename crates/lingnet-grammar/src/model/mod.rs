//! Tableau data model
//!
//! Constraints, candidates and tableaux grouped into a [`TableauSet`] that
//! owns the single constraint list every tableau is evaluated against.

pub mod candidate;
pub mod constraint;
pub mod tableau;
pub mod tableau_set;

pub use candidate::{Candidate, CandidateRef, Cell};
pub use constraint::{Constraint, ConstraintFamily};
pub use tableau::Tableau;
pub use tableau_set::{FamilyMultipliers, TableauSet};
