//! Lingnet - grammar diffusion simulator

use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lingnet_common::DEFAULT_TYPOLOGY_LIMIT;
use lingnet_diffusion::report::{ReportWriter, RunSummary};
use lingnet_diffusion::{DiffusionSimulator, SimulationConfig, DIFFUSION_VERSION};
use lingnet_grammar::ranking::typology;
use lingnet_grammar::{read_tableau_set, ComparativeTableau, RankingStatus, TableauSet};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// Grammar file (overrides config)
    #[arg(value_name = "GRAMMAR_PATH")]
    pub input: Option<PathBuf>,

    /// Path to config TOML
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Seed for a reproducible run
    #[arg(long)]
    pub seed: Option<u64>,

    /// Directory for report files
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Number of agents
    #[arg(long)]
    pub population: Option<usize>,

    /// Cycles of learning from the input distribution
    #[arg(long)]
    pub childhood_cycles: Option<usize>,

    /// Cycles of learning from peers
    #[arg(long)]
    pub peer_cycles: Option<usize>,

    /// Compare harmonies without evaluation noise
    #[arg(long, default_value_t = false)]
    pub no_noise: bool,

    /// Skip writing report files
    #[arg(long, default_value_t = false)]
    pub no_reports: bool,

    /// Print ERCs, an RCD ranking and the typology, then exit
    #[arg(long, default_value_t = false)]
    pub analyze: bool,
}

impl Args {
    fn apply(&self, config: &mut SimulationConfig) {
        if let Some(input) = &self.input {
            config.input_path = input.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(n) = self.population {
            config.population_size = n;
        }
        if let Some(n) = self.childhood_cycles {
            config.childhood_cycles = n;
        }
        if let Some(n) = self.peer_cycles {
            config.peer_cycles = n;
        }
        if self.no_noise {
            config.evaluation_noise = false;
        }
        if self.no_reports {
            config.write_reports = false;
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let mut config = SimulationConfig::load(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate()?;

    tracing::info!(
        version = DIFFUSION_VERSION,
        input = %config.input_path.display(),
        "Starting Lingnet"
    );

    let report = read_tableau_set(&config.input_path)?;
    if !report.success {
        for e in report.tableau_set.errors() {
            tracing::error!("{e}");
        }
        bail!("{} could not be parsed", config.input_path.display());
    }
    let grammar = report.tableau_set;

    if args.analyze {
        analyze(&grammar)?;
        return Ok(());
    }

    let started_at = Utc::now();
    let writer = if config.write_reports {
        Some(ReportWriter::new(&config.output_dir).context("Could not create output directory")?)
    } else {
        None
    };

    let mut sim = DiffusionSimulator::from_config(&config, &grammar)?;
    let stages = sim.run(config.childhood_cycles, config.peer_cycles, |stage, network| {
        match &writer {
            Some(w) => w.write_snapshots(stage, network),
            None => Ok(()),
        }
    })?;

    let stats = sim.stats();
    if stats.total() > 0 {
        tracing::warn!(?stats, "Some learning steps were skipped");
    }

    if let Some(w) = &writer {
        w.write_percent_series(sim.series())?;
        let summary = RunSummary::new(
            &config,
            config.input_path.display().to_string(),
            started_at,
            stages,
            sim.network(),
            stats,
        );
        w.write_summary(&summary)?;
    }

    for agent in sim.network().agents() {
        tracing::info!(
            agent = agent.index(),
            weights = ?agent.grammar().weights(),
            "Final grammar"
        );
    }
    tracing::info!("Lingnet finished");
    Ok(())
}

fn analyze(grammar: &TableauSet) -> anyhow::Result<()> {
    let mut comparative = ComparativeTableau::from_tableau_set(grammar);
    comparative.mark_equivalents();
    let ranking = comparative.rank();

    println!("{}", comparative.render(grammar));
    match ranking.status {
        RankingStatus::RankingFound => {
            for (i, stratum) in ranking.strata.iter().enumerate() {
                let names: Vec<&str> = stratum
                    .iter()
                    .filter_map(|c| grammar.constraint(*c).ok())
                    .map(|c| c.short_name.as_str())
                    .collect();
                println!("Stratum {}: {}", i + 1, names.join(", "));
            }
        }
        _ => println!("No ranking found"),
    }

    let languages = typology(grammar, DEFAULT_TYPOLOGY_LIMIT)?;
    let rankable: Vec<_> = languages
        .iter()
        .filter(|l| l.status() == RankingStatus::RankingFound)
        .collect();
    println!("{} of {} languages are rankable", rankable.len(), languages.len());
    for language in rankable {
        println!("  {}", language.outputs(grammar)?.join(" "));
    }
    Ok(())
}
