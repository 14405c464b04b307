//! A learner: one private grammar plus outbound connections

use lingnet_common::{LookupError, Result, SimRng};
use lingnet_grammar::TableauSet;

use crate::demographics::Demographics;

/// One member of the social network
#[derive(Debug, Clone)]
pub struct Agent {
    index: usize,
    grammar: TableauSet,
    /// Candidate frequencies as ingested, before any winner selection
    empirical: Vec<Vec<f64>>,
    connections: Vec<usize>,
    demographics: Option<Demographics>,
}

impl Agent {
    /// Create an agent owning `grammar`; its current frequencies become the
    /// agent's empirical distribution
    pub fn new(index: usize, grammar: TableauSet) -> Self {
        let empirical = grammar.candidate_frequencies();
        Self {
            index,
            grammar,
            empirical,
            connections: Vec::new(),
            demographics: None,
        }
    }

    /// Position in the network
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn grammar(&self) -> &TableauSet {
        &self.grammar
    }

    pub fn grammar_mut(&mut self) -> &mut TableauSet {
        &mut self.grammar
    }

    /// Ingestion-time frequencies of tableau `tableau`'s candidates
    pub fn empirical_frequencies(&self, tableau: usize) -> &[f64] {
        self.empirical.get(tableau).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn connections(&self) -> &[usize] {
        &self.connections
    }

    /// Connect to `peer`; false for self-connections and duplicates
    pub fn add_connection(&mut self, peer: usize) -> bool {
        if peer == self.index || self.connections.contains(&peer) {
            return false;
        }
        self.connections.push(peer);
        true
    }

    /// Drop the connection to `peer`; false when there was none
    pub fn remove_connection(&mut self, peer: usize) -> bool {
        match self.connections.iter().position(|c| *c == peer) {
            Some(pos) => {
                self.connections.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Peer behind connection slot `i`
    pub fn connection(&self, i: usize) -> Result<usize> {
        self.connections.get(i).copied().ok_or_else(|| {
            LookupError::Connection {
                agent: self.index,
                index: i,
                count: self.connections.len(),
            }
            .into()
        })
    }

    /// Uniformly chosen peer
    pub fn random_connection(&self, rng: &mut SimRng) -> Result<usize> {
        if self.connections.is_empty() {
            return Err(LookupError::NoConnections { agent: self.index }.into());
        }
        self.connection(rng.uniform_index(self.connections.len()))
    }

    pub fn demographics(&self) -> Option<&Demographics> {
        self.demographics.as_ref()
    }

    pub fn set_demographics(&mut self, demographics: Demographics) {
        self.demographics = Some(demographics);
    }
}
