//! Integration tests for the diffusion crate
//!
//! Network wiring, reproducibility, degenerate-input handling and report
//! output, driven through the public API.

use lingnet_common::SimRng;
use lingnet_diffusion::report::ReportWriter;
use lingnet_diffusion::{DiffusionSimulator, SimulationConfig, SocialNetwork, Stage};
use lingnet_grammar::{read_tableau_set, Constraint, EvaluationMode, Perceptron, TableauSet};
use proptest::prelude::*;

fn data_file() -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/coda.txt")
}

fn sample_grammar() -> TableauSet {
    let report = read_tableau_set(data_file()).unwrap();
    assert!(report.success);
    report.tableau_set
}

fn config(population_size: usize, seed: u64) -> SimulationConfig {
    SimulationConfig {
        population_size,
        seed: Some(seed),
        write_reports: false,
        ..Default::default()
    }
}

// ============ NETWORK ============

proptest! {
    #[test]
    fn prop_every_agent_has_one_foreign_connection(size in 2usize..60, seed in any::<u64>()) {
        let mut rng = SimRng::seeded(seed);
        let network = SocialNetwork::build(size, &sample_grammar(), &mut rng).unwrap();
        for agent in network.agents() {
            prop_assert_eq!(agent.connections().len(), 1);
            prop_assert_ne!(agent.connections()[0], agent.index());
            prop_assert!(agent.connections()[0] < size);
        }
    }
}

#[test]
fn test_population_of_one_is_rejected() {
    let grammar = sample_grammar();
    assert!(DiffusionSimulator::from_config(&config(1, 1), &grammar).is_err());
}

// ============ RUNS ============

#[test]
fn test_fixed_seed_reproduces_run() {
    let grammar = sample_grammar();
    let run = || {
        let mut sim = DiffusionSimulator::from_config(&config(4, 77), &grammar).unwrap();
        sim.run(10, 20, |_, _| Ok(())).unwrap();
        let weights: Vec<Vec<f64>> = sim
            .network()
            .agents()
            .iter()
            .map(|a| a.grammar().weights())
            .collect();
        (weights, sim.series().to_vec())
    };
    assert_eq!(run(), run());
}

#[test]
fn test_series_covers_every_cycle() {
    let grammar = sample_grammar();
    let mut sim = DiffusionSimulator::from_config(&config(3, 5), &grammar).unwrap();
    let reports = sim.run(4, 6, |_, _| Ok(())).unwrap();

    assert_eq!(reports[0].stage, Stage::Childhood);
    assert_eq!(reports[1].stage, Stage::Peer);
    assert_eq!(sim.series().len(), 10);
    for (i, record) in sim.series().iter().enumerate() {
        assert_eq!(record.cycle, i + 1);
        assert_eq!(record.percent_correct.len(), 3);
        // 3 tableaux, so scores are thirds
        for p in &record.percent_correct {
            assert!((0.0..=1.0).contains(p));
            assert!(((p * 3.0).round() - p * 3.0).abs() < 1e-9);
        }
    }
    assert_eq!(sim.stats().total(), 0);
}

#[test]
fn test_zero_frequency_grammar_completes() {
    let mut ts = TableauSet::new();
    ts.add_constraint(Constraint::new("Max", "Max"));
    ts.add_constraint(Constraint::new("NoCoda", "*Coda"));
    for input in ["tap", "kat"] {
        let t = ts.add_tableau(input);
        ts.add_candidate(t, input, 0.0, &[0.0, 1.0]).unwrap();
        ts.add_candidate(t, &input[..2], 0.0, &[1.0, 0.0]).unwrap();
    }

    let mut sim = DiffusionSimulator::from_config(&config(3, 9), &ts).unwrap();
    sim.run(5, 5, |_, _| Ok(())).unwrap();

    // Every childhood step has nothing to sample from; peer steps are fine
    let stats = sim.stats();
    assert_eq!(stats.sampling, 3 * 2 * 5);
    assert_eq!(stats.total(), stats.sampling);
    assert_eq!(sim.series().len(), 10);
}

#[test]
fn test_peer_stage_spreads_a_categorical_grammar() {
    // Agent 0 strongly prefers deletion; agent 1 learns only from agent 0
    let mut ts = TableauSet::new();
    ts.add_constraint(Constraint::new("Max", "Max"));
    ts.add_constraint(Constraint::new("NoCoda", "*Coda"));
    let t = ts.add_tableau("tap");
    ts.add_candidate(t, "tap", 1.0, &[0.0, 1.0]).unwrap();
    ts.add_candidate(t, "ta", 0.0, &[1.0, 0.0]).unwrap();

    let mut speaker = ts.clone();
    speaker.set_weights(&[0.0, 1000.0]);
    let mut network = SocialNetwork::new();
    network.add_agent(speaker);
    network.add_agent(ts);
    network.agent_mut(1).unwrap().add_connection(0);

    let config = SimulationConfig {
        evaluation_noise: false,
        ..config(2, 3)
    };
    let mut sim = DiffusionSimulator::new(network, config.perceptron(), 1, SimRng::seeded(3));
    sim.run_stage(Stage::Peer, 200).unwrap();

    // Agent 0 has no connection; each of its steps is skipped
    assert_eq!(sim.stats().lookup, 200);
    let learner = sim.network().agent(1).unwrap().grammar();
    assert!(learner.weights()[0] < learner.weights()[1]);
    assert_eq!(sim.series().last().unwrap().percent_correct[1], 0.0);
}

/// Agents with the given weights over /tap/ -> [tap] [0,1] | [ta] [1,0];
/// `links` are (learner, peer) connections
fn chain(weights: &[[f64; 2]], links: &[(usize, usize)]) -> DiffusionSimulator {
    let mut ts = TableauSet::new();
    ts.add_constraint(Constraint::new("Max", "Max"));
    ts.add_constraint(Constraint::new("NoCoda", "*Coda"));
    let t = ts.add_tableau("tap");
    ts.add_candidate(t, "tap", 1.0, &[0.0, 1.0]).unwrap();
    ts.add_candidate(t, "ta", 0.0, &[1.0, 0.0]).unwrap();

    let mut network = SocialNetwork::new();
    for w in weights {
        let mut grammar = ts.clone();
        grammar.set_weights(w);
        network.add_agent(grammar);
    }
    for (learner, peer) in links {
        network.agent_mut(*learner).unwrap().add_connection(*peer);
    }
    // One unit step and no solve steps: a single update flips a near tie
    let perceptron = Perceptron::new(1.0, EvaluationMode::Deterministic);
    DiffusionSimulator::new(network, perceptron, 0, SimRng::seeded(1))
}

#[test]
fn test_peer_read_sees_update_made_earlier_in_cycle() {
    // 0 prefers [ta]; 1 and 2 narrowly prefer [tap]; 2 -> 1 -> 0
    let mut sim = chain(&[[0.0, 1000.0], [10.5, 10.0], [10.5, 10.0]], &[(1, 0), (2, 1)]);
    sim.run_peer_cycle().unwrap();

    let weights = |sim: &DiffusionSimulator, a: usize| {
        sim.network().agent(a).unwrap().grammar().weights()
    };
    // 1 learned [ta] from 0, then 2 read 1's new optimum in the same pass
    assert_eq!(weights(&sim, 1), vec![9.5, 11.0]);
    assert_eq!(weights(&sim, 2), vec![9.5, 11.0]);
    assert_eq!(sim.series()[0].percent_correct, vec![0.0, 0.0, 0.0]);

    // Reads left 0 alone; only its own scoring made [ta] its winner
    assert_eq!(weights(&sim, 0), vec![0.0, 1000.0]);
    assert_eq!(
        sim.network().agent(0).unwrap().grammar().candidate_frequencies(),
        vec![vec![0.0, 1.0]]
    );
    assert_eq!(sim.stats().lookup, 1);
}

#[test]
fn test_peer_read_before_update_sees_old_state() {
    // Same chain in reverse index order: 0 -> 1 -> 2, with 2 preferring [ta]
    let mut sim = chain(&[[10.5, 10.0], [10.5, 10.0], [0.0, 1000.0]], &[(0, 1), (1, 2)]);
    sim.run_peer_cycle().unwrap();

    let network = sim.network();
    // 0 read 1 before 1 moved, so it learned nothing this cycle
    assert_eq!(network.agent(0).unwrap().grammar().weights(), vec![10.5, 10.0]);
    assert_eq!(network.agent(1).unwrap().grammar().weights(), vec![9.5, 11.0]);
    assert_eq!(sim.series()[0].percent_correct, vec![1.0, 0.0, 0.0]);

    // Next cycle 0 catches up with 1
    sim.run_peer_cycle().unwrap();
    assert_eq!(sim.network().agent(0).unwrap().grammar().weights(), vec![9.5, 11.0]);
}

// ============ REPORTS ============

#[test]
fn test_reports_written_per_stage() {
    let dir = std::env::temp_dir().join(format!("lingnet-sim-{}", std::process::id()));
    let writer = ReportWriter::new(&dir).unwrap();
    let grammar = sample_grammar();

    let mut sim = DiffusionSimulator::from_config(&config(2, 11), &grammar).unwrap();
    sim.run(2, 3, |stage, network| writer.write_snapshots(stage, network))
        .unwrap();
    let series = writer.write_percent_series(sim.series()).unwrap();

    for agent in 0..2 {
        for stage in [Stage::Childhood, Stage::Peer] {
            let text = std::fs::read_to_string(writer.snapshot_path(agent, stage)).unwrap();
            // weights row, names row, 7 candidates
            assert_eq!(text.lines().count(), 9);
            assert!(text.lines().nth(1).unwrap().contains("*Coda"));
        }
    }
    assert_eq!(std::fs::read_to_string(series).unwrap().lines().count(), 1 + 5);

    std::fs::remove_dir_all(&dir).unwrap();
}
