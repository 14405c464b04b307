//! Languages and factorial typology
//!
//! A language picks one candidate per tableau. The typology of a tableau set
//! is every such combination, each tagged with whether some ranking makes
//! its candidates the winners.

use serde::{Deserialize, Serialize};
use tracing::info;

use lingnet_common::{RankingError, Result};

use super::comparative::{ComparativeTableau, RankingStatus};
use crate::model::{CandidateRef, TableauSet};

/// One candidate per tableau, in tableau order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    candidates: Vec<CandidateRef>,
    status: RankingStatus,
}

impl Language {
    pub fn new(candidates: Vec<CandidateRef>) -> Self {
        Self {
            candidates,
            status: RankingStatus::Unranked,
        }
    }

    pub fn candidates(&self) -> &[CandidateRef] {
        &self.candidates
    }

    pub fn status(&self) -> RankingStatus {
        self.status
    }

    pub fn set_status(&mut self, status: RankingStatus) {
        self.status = status;
    }

    /// Make this language's candidates the winners of `ts`
    pub fn apply_to(&self, ts: &mut TableauSet) -> Result<()> {
        if self.candidates.len() != ts.tableau_count() {
            return Err(RankingError::LanguageShape {
                found: self.candidates.len(),
                expected: ts.tableau_count(),
            }
            .into());
        }
        ts.set_winners(&self.candidates)
    }

    /// Output forms of the chosen candidates
    pub fn outputs(&self, ts: &TableauSet) -> Result<Vec<String>> {
        self.candidates
            .iter()
            .map(|r| ts.candidate(*r).map(|c| c.output().to_string()))
            .collect()
    }
}

/// Every language of `ts`, refusing sets with more than `limit` languages
pub fn enumerate_languages(ts: &TableauSet, limit: u128) -> Result<Vec<Language>> {
    let languages = ts.language_count();
    if languages > limit {
        return Err(RankingError::TypologyTooLarge { languages, limit }.into());
    }
    if languages == 0 {
        return Ok(Vec::new());
    }

    let sizes: Vec<usize> = ts.tableaux().iter().map(|t| t.candidate_count()).collect();
    let mut choice = vec![0usize; sizes.len()];
    let mut out = Vec::with_capacity(languages as usize);
    loop {
        out.push(Language::new(
            choice
                .iter()
                .enumerate()
                .map(|(t, c)| CandidateRef::new(t, *c))
                .collect(),
        ));

        // Odometer increment, last tableau fastest
        let mut position = sizes.len();
        loop {
            if position == 0 {
                return Ok(out);
            }
            position -= 1;
            choice[position] += 1;
            if choice[position] < sizes[position] {
                break;
            }
            choice[position] = 0;
        }
    }
}

/// Rank every language of `ts` on a private copy of the set
pub fn typology(ts: &TableauSet, limit: u128) -> Result<Vec<Language>> {
    let mut languages = enumerate_languages(ts, limit)?;
    let mut scratch = ts.clone();
    for language in &mut languages {
        language.apply_to(&mut scratch)?;
        let status = ComparativeTableau::from_tableau_set(&scratch).rank().status;
        language.set_status(status);
    }

    let rankable = languages
        .iter()
        .filter(|l| l.status() == RankingStatus::RankingFound)
        .count();
    info!(
        languages = languages.len(),
        rankable,
        "Typology computed"
    );
    Ok(languages)
}
