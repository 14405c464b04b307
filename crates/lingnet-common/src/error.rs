//! Error types for Lingnet
//!
//! Provides a unified error type and domain-specific error variants

use thiserror::Error;

/// Result type alias using LingnetError
pub type Result<T> = std::result::Result<T, LingnetError>;

/// Unified error type for Lingnet operations
#[derive(Debug, Error)]
pub enum LingnetError {
    // Ingestion errors
    #[error("Ingestion error: {0}")]
    Ingest(#[from] IngestError),

    // Degenerate sampling conditions
    #[error("Sampling error: {0}")]
    Sampling(#[from] SamplingError),

    // Out-of-range handles
    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    // Ranking and typology errors
    #[error("Ranking error: {0}")]
    Ranking(#[from] RankingError),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Report and file errors
    #[error("I/O error: {0}")]
    Io(String),

    // Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LingnetError {
    /// Whether the error only invalidates the current learning cycle
    ///
    /// Sampling and lookup failures are confined to one agent/tableau; the
    /// simulator counts them and moves on.
    pub fn is_cycle_local(&self) -> bool {
        matches!(self, LingnetError::Sampling(_) | LingnetError::Lookup(_))
    }
}

/// Errors reading an input grammar file
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Could not read grammar file {path}: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("Grammar file {path} has no usable lines")]
    Empty { path: String },
}

/// Degenerate conditions met while sampling or selecting candidates
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SamplingError {
    #[error("Total winner frequency is zero, no tableau can be sampled")]
    ZeroTotalFrequency,

    #[error("Tableau {tableau} has no winner")]
    NoWinner { tableau: usize },

    #[error("Tableau {tableau} has {winners} winners, expected exactly one")]
    AmbiguousWinner { tableau: usize, winners: usize },

    #[error("Tableau {tableau} has no candidates")]
    EmptyTableau { tableau: usize },

    #[error("Tableau {tableau} has no candidate with positive frequency")]
    EmptyDistribution { tableau: usize },
}

/// Out-of-range indices and handles
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LookupError {
    #[error("Candidate number {number} out of range 1..={count}")]
    CandidateNumber { number: usize, count: usize },

    #[error("Tableau {index} out of range (tableau count {count})")]
    Tableau { index: usize, count: usize },

    #[error("Candidate {index} out of range in tableau {tableau} (candidate count {count})")]
    Candidate {
        tableau: usize,
        index: usize,
        count: usize,
    },

    #[error("Constraint {index} out of range (constraint count {count})")]
    Constraint { index: usize, count: usize },

    #[error("Agent {index} out of range (population {count})")]
    Agent { index: usize, count: usize },

    #[error("Connection {index} of agent {agent} out of range (connection count {count})")]
    Connection {
        agent: usize,
        index: usize,
        count: usize,
    },

    #[error("Agent {agent} has no connections")]
    NoConnections { agent: usize },

    #[error("Winner and loser belong to different tableaux ({winner} vs {loser})")]
    TableauMismatch { winner: usize, loser: usize },
}

/// Ranking and typology analysis errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RankingError {
    #[error("Typology of {languages} languages exceeds the enumeration limit {limit}")]
    TypologyTooLarge { languages: u128, limit: u128 },

    #[error("Language has {found} candidates but the tableau set has {expected} tableaux")]
    LanguageShape { found: usize, expected: usize },
}

impl From<std::io::Error> for LingnetError {
    fn from(err: std::io::Error) -> Self {
        LingnetError::Io(err.to_string())
    }
}

impl From<anyhow::Error> for LingnetError {
    fn from(err: anyhow::Error) -> Self {
        LingnetError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LingnetError::Sampling(SamplingError::AmbiguousWinner {
            tableau: 3,
            winners: 2,
        });
        assert!(err.to_string().contains("3 has 2 winners"));
    }

    #[test]
    fn test_lookup_error() {
        let err = LookupError::CandidateNumber {
            number: 9,
            count: 4,
        };
        assert!(err.to_string().contains("1..=4"));
    }

    #[test]
    fn test_cycle_local_classification() {
        assert!(LingnetError::from(SamplingError::ZeroTotalFrequency).is_cycle_local());
        assert!(LingnetError::from(LookupError::NoConnections { agent: 0 }).is_cycle_local());
        assert!(!LingnetError::Config("bad".into()).is_cycle_local());
    }
}
