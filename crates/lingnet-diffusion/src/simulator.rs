//! Diffusion simulator
//!
//! Strictly sequential: within a cycle agents are visited in index order and
//! every mutation of cycle i is in place before cycle i+1 starts. A peer's
//! grammar is only ever read, and it is read in whatever state the peer is
//! in at that moment.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use lingnet_common::{LingnetError, Result, SimRng};
use lingnet_grammar::learning::{find_optimal_candidate, sample_candidate, select_optimal};
use lingnet_grammar::{CandidateRef, Perceptron, TableauSet};

use crate::config::SimulationConfig;
use crate::network::SocialNetwork;

/// Learning regime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Targets sampled from the agent's own input distribution
    Childhood,
    /// Targets read from a connected peer's grammar
    Peer,
}

impl Stage {
    /// 1-based stage number used in report file names
    pub fn number(&self) -> usize {
        match self {
            Stage::Childhood => 1,
            Stage::Peer => 2,
        }
    }
}

/// Counts of skipped agent/tableau steps, by cause
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegenerateStats {
    /// No target could be sampled or selected
    pub sampling: usize,
    /// A peer, connection or candidate index did not resolve
    pub lookup: usize,
    /// A solve step found no usable tableau
    pub solve: usize,
}

impl DegenerateStats {
    pub fn total(&self) -> usize {
        self.sampling + self.lookup + self.solve
    }

    fn record(&mut self, err: &LingnetError) {
        match err {
            LingnetError::Sampling(_) => self.sampling += 1,
            LingnetError::Lookup(_) => self.lookup += 1,
            _ => {}
        }
    }
}

/// Percent-correct scores of every agent after one cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleRecord {
    /// 1-based cycle number across the whole run
    pub cycle: usize,
    pub stage: Stage,
    /// One score per agent, in agent order
    pub percent_correct: Vec<f64>,
}

impl CycleRecord {
    pub fn mean(&self) -> f64 {
        if self.percent_correct.is_empty() {
            return 0.0;
        }
        self.percent_correct.iter().sum::<f64>() / self.percent_correct.len() as f64
    }
}

/// Outcome of one stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: Stage,
    pub cycles: usize,
    /// Perceptron updates made by solve steps
    pub solve_updates: usize,
    /// Degenerate steps skipped during this stage
    pub skipped: usize,
    /// Percent correct per agent after the last cycle
    pub final_percent_correct: Vec<f64>,
}

/// Drives learning cycles over a social network
#[derive(Debug)]
pub struct DiffusionSimulator {
    network: SocialNetwork,
    perceptron: Perceptron,
    solve_iterations: usize,
    rng: SimRng,
    stats: DegenerateStats,
    series: Vec<CycleRecord>,
}

impl DiffusionSimulator {
    pub fn new(
        network: SocialNetwork,
        perceptron: Perceptron,
        solve_iterations: usize,
        rng: SimRng,
    ) -> Self {
        Self {
            network,
            perceptron,
            solve_iterations,
            rng,
            stats: DegenerateStats::default(),
            series: Vec::new(),
        }
    }

    /// Build the network from `grammar` according to `config`
    pub fn from_config(config: &SimulationConfig, grammar: &TableauSet) -> Result<Self> {
        config.validate()?;
        let mut grammar = grammar.clone();
        grammar.multipliers = config.multipliers(grammar.multipliers);

        let mut rng = SimRng::from_optional_seed(config.seed);
        let network = SocialNetwork::build(config.population_size, &grammar, &mut rng)?;
        info!(
            agents = network.len(),
            seed = ?config.seed,
            mode = ?config.evaluation_mode(),
            "Built social network"
        );
        Ok(Self::new(network, config.perceptron(), config.solve_iterations, rng))
    }

    pub fn network(&self) -> &SocialNetwork {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut SocialNetwork {
        &mut self.network
    }

    pub fn stats(&self) -> DegenerateStats {
        self.stats
    }

    /// Percent-correct records of every cycle run so far
    pub fn series(&self) -> &[CycleRecord] {
        &self.series
    }

    pub fn rng_mut(&mut self) -> &mut SimRng {
        &mut self.rng
    }

    /// One distribution-learning pass over the population
    ///
    /// Returns the number of solve updates made.
    #[instrument(skip(self))]
    pub fn run_distribution_cycle(&mut self) -> Result<usize> {
        let mut updates = 0;
        let mut scores = Vec::with_capacity(self.network.len());

        for a in 0..self.network.len() {
            let tableaux = self.network.agent(a)?.grammar().tableau_count();
            for t in 0..tableaux {
                let agent = self.network.agent(a)?;
                let empirical = agent.empirical_frequencies(t);
                let target = match sample_candidate(agent.grammar(), t, empirical, &mut self.rng) {
                    Ok(target) => target,
                    Err(err) => {
                        self.skip(a, t, err)?;
                        continue;
                    }
                };
                updates += self.learn_toward(a, t, target)?;
            }
            scores.push(self.percent_correct(a)?);
        }

        self.push_record(Stage::Childhood, scores);
        Ok(updates)
    }

    /// One peer-learning pass over the population
    ///
    /// Returns the number of solve updates made.
    #[instrument(skip(self))]
    pub fn run_peer_cycle(&mut self) -> Result<usize> {
        let mut updates = 0;
        let mut scores = Vec::with_capacity(self.network.len());

        for a in 0..self.network.len() {
            let tableaux = self.network.agent(a)?.grammar().tableau_count();
            for t in 0..tableaux {
                let target = match self.peer_target(a, t) {
                    Ok(target) => target,
                    Err(err) => {
                        self.skip(a, t, err)?;
                        continue;
                    }
                };
                updates += self.learn_toward(a, t, target)?;
            }
            scores.push(self.percent_correct(a)?);
        }

        self.push_record(Stage::Peer, scores);
        Ok(updates)
    }

    /// Run `cycles` cycles of `stage`
    pub fn run_stage(&mut self, stage: Stage, cycles: usize) -> Result<StageReport> {
        info!(?stage, cycles, agents = self.network.len(), "Starting stage");
        let skipped_before = self.stats.total();

        let mut solve_updates = 0;
        for _ in 0..cycles {
            solve_updates += match stage {
                Stage::Childhood => self.run_distribution_cycle()?,
                Stage::Peer => self.run_peer_cycle()?,
            };
        }

        let final_percent_correct = self
            .series
            .last()
            .map(|r| r.percent_correct.clone())
            .unwrap_or_default();
        let report = StageReport {
            stage,
            cycles,
            solve_updates,
            skipped: self.stats.total() - skipped_before,
            final_percent_correct,
        };
        info!(
            ?stage,
            solve_updates = report.solve_updates,
            skipped = report.skipped,
            "Finished stage"
        );
        Ok(report)
    }

    /// Childhood stage then peer stage
    ///
    /// `on_stage_end` sees the network after each stage, e.g. to write
    /// snapshots.
    pub fn run<F>(
        &mut self,
        childhood_cycles: usize,
        peer_cycles: usize,
        mut on_stage_end: F,
    ) -> Result<Vec<StageReport>>
    where
        F: FnMut(Stage, &SocialNetwork) -> Result<()>,
    {
        let mut reports = Vec::with_capacity(2);
        for (stage, cycles) in [(Stage::Childhood, childhood_cycles), (Stage::Peer, peer_cycles)] {
            reports.push(self.run_stage(stage, cycles)?);
            on_stage_end(stage, &self.network)?;
        }
        Ok(reports)
    }

    /// Fraction of agent `a`'s tableaux whose optimal output equals the input
    ///
    /// This compares against the input text, not against a target output,
    /// so it is a self-consistency score. Selecting the optimum makes it the
    /// agent's winner, as any optimum selection on an agent's own grammar
    /// does.
    pub fn percent_correct(&mut self, a: usize) -> Result<f64> {
        let tableaux = self.network.agent(a)?.grammar().tableau_count();
        if tableaux == 0 {
            return Ok(0.0);
        }

        let mut correct = 0;
        for t in 0..tableaux {
            let grammar = self.network.agent_mut(a)?.grammar_mut();
            let optimal = match find_optimal_candidate(grammar, t, &mut self.rng) {
                Ok(optimal) => optimal,
                Err(err) => {
                    self.skip(a, t, err)?;
                    continue;
                }
            };
            if grammar.candidate(optimal)?.output() == grammar.tableau(t)?.input() {
                correct += 1;
            }
        }
        Ok(correct as f64 / tableaux as f64)
    }

    // ---- internals ----

    /// Optimum of tableau `t` in a randomly connected peer's grammar
    fn peer_target(&mut self, a: usize, t: usize) -> Result<CandidateRef> {
        let peer = self.network.agent(a)?.random_connection(&mut self.rng)?;
        select_optimal(self.network.agent(peer)?.grammar(), t, &mut self.rng)
    }

    /// Learn toward `target` against the agent's own optimum, then solve
    ///
    /// Degenerate conditions are counted and skipped; returns solve updates.
    fn learn_toward(&mut self, a: usize, t: usize, target: CandidateRef) -> Result<usize> {
        let grammar = self.network.agent_mut(a)?.grammar_mut();

        let own = match find_optimal_candidate(grammar, t, &mut self.rng) {
            Ok(own) => own,
            Err(err) => {
                self.skip(a, t, err)?;
                return Ok(0);
            }
        };
        if let Err(err) = self.perceptron.learn(grammar, target, own) {
            self.skip(a, t, err)?;
            return Ok(0);
        }

        match self.perceptron.solve(grammar, self.solve_iterations, &mut self.rng) {
            Ok(summary) => Ok(summary.updates),
            Err(err) if err.is_cycle_local() => {
                warn!(agent = a, tableau = t, error = %err, "Solve step skipped");
                self.stats.solve += 1;
                Ok(0)
            }
            Err(err) => Err(err),
        }
    }

    /// Count a cycle-local failure; anything else aborts the run
    fn skip(&mut self, a: usize, t: usize, err: LingnetError) -> Result<()> {
        if !err.is_cycle_local() {
            return Err(err);
        }
        warn!(agent = a, tableau = t, error = %err, "Learning step skipped");
        self.stats.record(&err);
        Ok(())
    }

    fn push_record(&mut self, stage: Stage, percent_correct: Vec<f64>) {
        let record = CycleRecord {
            cycle: self.series.len() + 1,
            stage,
            percent_correct,
        };
        debug!(cycle = record.cycle, ?stage, mean = record.mean(), "Cycle finished");
        self.series.push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lingnet_grammar::{Constraint, EvaluationMode};

    fn grammar() -> TableauSet {
        let mut ts = TableauSet::new();
        ts.add_constraint(Constraint::new("Max", "Max"));
        ts.add_constraint(Constraint::new("NoCoda", "*Coda"));
        let t = ts.add_tableau("tap");
        ts.add_candidate(t, "tap", 1.0, &[0.0, 1.0]).unwrap();
        ts.add_candidate(t, "ta", 0.0, &[1.0, 0.0]).unwrap();
        ts
    }

    fn simulator(grammar: &TableauSet, seed: u64) -> DiffusionSimulator {
        let config = SimulationConfig {
            population_size: 3,
            seed: Some(seed),
            ..Default::default()
        };
        DiffusionSimulator::from_config(&config, grammar).unwrap()
    }

    #[test]
    fn test_stage_numbers() {
        assert_eq!(Stage::Childhood.number(), 1);
        assert_eq!(Stage::Peer.number(), 2);
    }

    #[test]
    fn test_distribution_cycle_records_scores() {
        let mut sim = simulator(&grammar(), 1);
        sim.run_distribution_cycle().unwrap();
        assert_eq!(sim.series().len(), 1);
        assert_eq!(sim.series()[0].cycle, 1);
        assert_eq!(sim.series()[0].percent_correct.len(), 3);
        assert_eq!(sim.stats().total(), 0);
    }

    #[test]
    fn test_childhood_keeps_harmonically_bounded_winner() {
        let mut ts = TableauSet::new();
        ts.add_constraint(Constraint::new("Max", "Max"));
        ts.add_constraint(Constraint::new("NoCoda", "*Coda"));
        let t = ts.add_tableau("tap");
        ts.add_candidate(t, "tap", 1.0, &[0.0, 0.0]).unwrap();
        ts.add_candidate(t, "ta", 0.0, &[1.0, 0.0]).unwrap();

        let mut sim = simulator(&ts, 2);
        for _ in 0..20 {
            sim.run_distribution_cycle().unwrap();
        }
        assert!(sim.series().last().unwrap().percent_correct.iter().all(|p| *p == 1.0));
        for agent in sim.network().agents() {
            assert_eq!(agent.grammar().weights(), vec![10.0, 10.0]);
        }
    }

    #[test]
    fn test_zero_distribution_is_counted_not_fatal() {
        let mut ts = grammar();
        let u = ts.add_tableau("pa");
        ts.add_candidate(u, "pa", 0.0, &[0.0, 0.0]).unwrap();
        let mut sim = simulator(&ts, 3);
        sim.run_distribution_cycle().unwrap();
        assert_eq!(sim.stats().sampling, 3);
        assert_eq!(sim.series().len(), 1);
    }

    #[test]
    fn test_peer_cycle_without_connections_is_counted() {
        let mut sim = simulator(&grammar(), 4);
        for a in 0..3 {
            let peers: Vec<usize> = sim.network().agent(a).unwrap().connections().to_vec();
            for p in peers {
                sim.network_mut().agent_mut(a).unwrap().remove_connection(p);
            }
        }
        sim.run_peer_cycle().unwrap();
        assert_eq!(sim.stats().lookup, 3);
    }

    #[test]
    fn test_percent_correct_compares_input_text() {
        let mut ts = TableauSet::new();
        ts.add_constraint(Constraint::new("A", "A"));
        let t = ts.add_tableau("/tap/");
        ts.add_candidate(t, "tap", 1.0, &[0.0]).unwrap();
        let u = ts.add_tableau("pa");
        ts.add_candidate(u, "pa", 1.0, &[0.0]).unwrap();
        let mut sim = simulator(&ts, 5);
        // Only the tableau whose input text is literally its winner counts
        assert_eq!(sim.percent_correct(0).unwrap(), 0.5);
    }

    #[test]
    fn test_percent_correct_counts_empty_tableau() {
        let mut ts = grammar();
        ts.add_tableau("pa");
        let mut sim = simulator(&ts, 8);
        // Only /tap/ can be scored; the empty tableau is skipped and counted
        let score = sim.percent_correct(0).unwrap();
        assert!(score == 0.0 || score == 0.5);
        assert_eq!(sim.stats().sampling, 1);
        assert_eq!(sim.stats().total(), 1);
    }

    #[test]
    fn test_run_calls_back_per_stage() {
        let mut sim = simulator(&grammar(), 6);
        let mut seen = Vec::new();
        let reports = sim
            .run(3, 4, |stage, network| {
                seen.push((stage, network.len()));
                Ok(())
            })
            .unwrap();
        assert_eq!(seen, vec![(Stage::Childhood, 3), (Stage::Peer, 3)]);
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[1].cycles, 4);
        assert_eq!(sim.series().len(), 7);
        assert_eq!(sim.series()[6].stage, Stage::Peer);
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let run = |seed| {
            let mut sim = simulator(&grammar(), seed);
            sim.run(5, 5, |_, _| Ok(())).unwrap();
            sim.network()
                .agents()
                .iter()
                .map(|a| a.grammar().weights())
                .collect::<Vec<_>>()
        };
        assert_eq!(run(9), run(9));
    }

    #[test]
    fn test_deterministic_mode_from_config() {
        let config = SimulationConfig {
            evaluation_noise: false,
            seed: Some(1),
            ..Default::default()
        };
        let sim = DiffusionSimulator::from_config(&config, &grammar()).unwrap();
        assert_eq!(sim.perceptron.mode, EvaluationMode::Deterministic);
    }
}
