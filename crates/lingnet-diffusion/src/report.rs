//! Report files
//!
//! - `lingnet_agent{a}_stage{s}.txt`: one agent's grammar after a stage, in
//!   the tab-separated layout of the input file (weights row, names row,
//!   one row per candidate)
//! - `lingnet_percent_correct.txt`: per-cycle percent-correct series
//! - `lingnet_summary.json`: run metadata, stage reports, final weights

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use lingnet_common::{LingnetError, Result};
use lingnet_grammar::TableauSet;

use crate::config::SimulationConfig;
use crate::network::SocialNetwork;
use crate::simulator::{CycleRecord, DegenerateStats, Stage, StageReport};

/// Tab-separated rendering of a tableau set
pub fn snapshot(ts: &TableauSet) -> String {
    let mut out = String::new();

    out.push_str("\t\t\t");
    for c in ts.constraints() {
        let _ = write!(out, "{:?}\t", c.rounded_weight());
    }
    out.push('\n');

    out.push_str("\t\t\t");
    for c in ts.constraints() {
        let _ = write!(out, "{}\t", c.short_name);
    }
    out.push('\n');

    for tableau in ts.tableaux() {
        for (i, cand) in tableau.candidates().iter().enumerate() {
            if i == 0 {
                let _ = write!(out, "{}\t", tableau.input());
            } else {
                out.push('\t');
            }
            let _ = write!(out, "{}\t{:?}\t", cand.output(), cand.frequency());
            for v in cand.violations() {
                let _ = write!(out, "{v:?}\t");
            }
            out.push('\n');
        }
    }
    out
}

/// One row per cycle: cycle, stage, mean, then every agent's score
pub fn percent_series(records: &[CycleRecord]) -> String {
    let agents = records.first().map_or(0, |r| r.percent_correct.len());
    let mut out = String::from("cycle\tstage\tmean");
    for a in 0..agents {
        let _ = write!(out, "\tagent{a}");
    }
    out.push('\n');

    for r in records {
        let _ = write!(out, "{}\t{}\t{:.4}", r.cycle, r.stage.number(), r.mean());
        for p in &r.percent_correct {
            let _ = write!(out, "\t{p:.4}");
        }
        out.push('\n');
    }
    out
}

/// Machine-readable record of a finished run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub source: String,
    pub config: SimulationConfig,
    pub stages: Vec<StageReport>,
    /// Final constraint weights, one vector per agent
    pub final_weights: Vec<Vec<f64>>,
    pub skipped: DegenerateStats,
}

impl RunSummary {
    pub fn new(
        config: &SimulationConfig,
        source: impl Into<String>,
        started_at: DateTime<Utc>,
        stages: Vec<StageReport>,
        network: &SocialNetwork,
        skipped: DegenerateStats,
    ) -> Self {
        Self {
            run_id: Uuid::now_v7(),
            started_at,
            finished_at: Utc::now(),
            source: source.into(),
            config: config.clone(),
            stages,
            final_weights: network.agents().iter().map(|a| a.grammar().weights()).collect(),
            skipped,
        }
    }
}

/// Writes report files into one directory
#[derive(Debug, Clone)]
pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    /// Create `dir` if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn snapshot_path(&self, agent: usize, stage: Stage) -> PathBuf {
        self.dir
            .join(format!("lingnet_agent{agent}_stage{}.txt", stage.number()))
    }

    /// One snapshot file per agent
    pub fn write_snapshots(&self, stage: Stage, network: &SocialNetwork) -> Result<()> {
        for agent in network.agents() {
            let path = self.snapshot_path(agent.index(), stage);
            fs::write(&path, snapshot(agent.grammar()))?;
        }
        info!(?stage, agents = network.len(), dir = %self.dir.display(), "Wrote grammar snapshots");
        Ok(())
    }

    pub fn write_percent_series(&self, records: &[CycleRecord]) -> Result<PathBuf> {
        let path = self.dir.join("lingnet_percent_correct.txt");
        fs::write(&path, percent_series(records))?;
        Ok(path)
    }

    pub fn write_summary(&self, summary: &RunSummary) -> Result<PathBuf> {
        let path = self.dir.join("lingnet_summary.json");
        let json = serde_json::to_string_pretty(summary)
            .map_err(|e| LingnetError::Io(format!("Could not serialize run summary: {e}")))?;
        fs::write(&path, json)?;
        info!(run_id = %summary.run_id, path = %path.display(), "Wrote run summary");
        Ok(path)
    }
}
