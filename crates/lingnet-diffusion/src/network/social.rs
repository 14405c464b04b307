//! Social network: the owning container of all agents

use tracing::debug;

use lingnet_common::{LingnetError, LookupError, Result, SimRng};
use lingnet_grammar::TableauSet;

use super::agent::Agent;
use crate::demographics::DemographicAssigner;

/// Agents addressed by position; connections are agent indices
#[derive(Debug, Clone, Default)]
pub struct SocialNetwork {
    agents: Vec<Agent>,
}

impl SocialNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// `size` agents, each with a private copy of `grammar` and one
    /// connection to a uniformly chosen other agent
    pub fn build(size: usize, grammar: &TableauSet, rng: &mut SimRng) -> Result<Self> {
        if size < 2 {
            return Err(LingnetError::Config(format!(
                "a social network needs at least 2 agents, got {size}"
            )));
        }

        let mut network = Self::new();
        for _ in 0..size {
            network.add_agent(grammar.clone());
        }
        for i in 0..size {
            // Draw from the size-1 other agents, skipping i
            let mut peer = rng.uniform_index(size - 1);
            if peer >= i {
                peer += 1;
            }
            network.agents[i].add_connection(peer);
            debug!(agent = i, peer, "Connected agent");
        }
        Ok(network)
    }

    /// Append an agent owning `grammar`, returning its index
    pub fn add_agent(&mut self, grammar: TableauSet) -> usize {
        let index = self.agents.len();
        self.agents.push(Agent::new(index, grammar));
        index
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, index: usize) -> Result<&Agent> {
        let count = self.agents.len();
        self.agents
            .get(index)
            .ok_or_else(|| LookupError::Agent { index, count }.into())
    }

    pub fn agent_mut(&mut self, index: usize) -> Result<&mut Agent> {
        let count = self.agents.len();
        self.agents
            .get_mut(index)
            .ok_or_else(|| LookupError::Agent { index, count }.into())
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Uniformly chosen agent index
    pub fn random_agent(&self, rng: &mut SimRng) -> Result<usize> {
        if self.agents.is_empty() {
            return Err(LookupError::Agent { index: 0, count: 0 }.into());
        }
        Ok(rng.uniform_index(self.agents.len()))
    }

    /// Give every agent a demographic record
    pub fn assign_demographics(
        &mut self,
        assigner: &mut dyn DemographicAssigner,
        rng: &mut SimRng,
    ) {
        for agent in &mut self.agents {
            let demographics = assigner.assign(agent.index(), rng);
            agent.set_demographics(demographics);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demographics::QuotaAssigner;
    use lingnet_grammar::Constraint;

    fn grammar() -> TableauSet {
        let mut ts = TableauSet::new();
        ts.add_constraint(Constraint::new("A", "A"));
        let t = ts.add_tableau("x");
        ts.add_candidate(t, "x", 1.0, &[0.0]).unwrap();
        ts
    }

    #[test]
    fn test_build_wires_one_other_agent() {
        let mut rng = SimRng::seeded(6);
        for size in [2usize, 3, 10, 50] {
            let network = SocialNetwork::build(size, &grammar(), &mut rng).unwrap();
            assert_eq!(network.len(), size);
            for (i, agent) in network.agents().iter().enumerate() {
                assert_eq!(agent.index(), i);
                assert_eq!(agent.connections().len(), 1);
                assert_ne!(agent.connections()[0], i);
                assert!(agent.connections()[0] < size);
            }
        }
    }

    #[test]
    fn test_two_agents_connect_to_each_other() {
        let mut rng = SimRng::seeded(1);
        let network = SocialNetwork::build(2, &grammar(), &mut rng).unwrap();
        assert_eq!(network.agent(0).unwrap().connections(), &[1]);
        assert_eq!(network.agent(1).unwrap().connections(), &[0]);
    }

    #[test]
    fn test_build_rejects_tiny_population() {
        let mut rng = SimRng::seeded(1);
        assert!(SocialNetwork::build(1, &grammar(), &mut rng).is_err());
        assert!(SocialNetwork::build(0, &grammar(), &mut rng).is_err());
    }

    #[test]
    fn test_agents_own_independent_grammars() {
        let mut rng = SimRng::seeded(2);
        let mut network = SocialNetwork::build(3, &grammar(), &mut rng).unwrap();
        network.agent_mut(0).unwrap().grammar_mut().set_weights(&[1.0]);
        assert_eq!(network.agent(1).unwrap().grammar().weights(), vec![10.0]);
        assert!(network.agent(3).is_err());
    }

    #[test]
    fn test_assign_demographics() {
        let mut rng = SimRng::seeded(2);
        let mut network = SocialNetwork::build(4, &grammar(), &mut rng).unwrap();
        network.assign_demographics(&mut QuotaAssigner::island(), &mut rng);
        assert!(network.agents().iter().all(|a| a.demographics().is_some()));
    }
}
