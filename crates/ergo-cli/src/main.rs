//! `ergo-risk`: score recorded pose data for ergonomic risk.
//!
//! Reads a landmark export (tabular `.csv` or detector `.jsonl`), scores
//! every frame and appends `Frame, Ergonomic Risk Score, Action Level` rows
//! to the output store.

mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use ergo_pipeline::{open_source, CsvRecordSink, LandmarkAdapter, Pipeline, RunSummary};
use ergo_rula::{ActionLevel, RiskScorer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::ErgoConfig;

const DEFAULT_FILTER: &str = "ergo_risk=info,ergo_pipeline=info,ergo_rula=warn";

/// Ergonomic risk assessment for recorded pose data
#[derive(Debug, Parser)]
#[command(name = "ergo-risk")]
#[command(about = "Per-frame RULA-style ergonomic risk scoring", long_about = None)]
#[command(version)]
struct Cli {
    /// Landmark export to assess (.csv tabular or .jsonl detector output)
    input: PathBuf,

    /// Result store; appended to if it already exists
    #[arg(short, long, default_value = "ergonomic_risk_scores.csv")]
    output: PathBuf,

    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write a JSON run summary to this path
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Omit the Frame column from the result store
    #[arg(long)]
    no_frame_index: bool,

    /// Treat detector landmarks below this confidence as absent
    #[arg(long)]
    min_confidence: Option<f32>,
}

impl Cli {
    fn load_config(&self) -> Result<ErgoConfig> {
        let mut config = match &self.config {
            Some(path) => ErgoConfig::from_file(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?,
            None => ErgoConfig::from_env().context("failed to read ERGO_* environment")?,
        };

        if self.no_frame_index {
            config.output.include_frame_index = false;
        }
        if let Some(min) = self.min_confidence {
            config.adapter.min_confidence = min;
        }

        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

fn run(cli: &Cli, config: &ErgoConfig) -> Result<RunSummary> {
    let source = open_source(&cli.input)
        .with_context(|| format!("cannot read {}", cli.input.display()))?;
    let sink = CsvRecordSink::append_to(&cli.output, config.output)?;
    let scorer = RiskScorer::new(config.scoring.clone())?;

    info!(
        input = %cli.input.display(),
        output = %cli.output.display(),
        "assessing ergonomic risk"
    );

    let mut pipeline = Pipeline::new(LandmarkAdapter::new(config.adapter), scorer, sink);
    let summary = pipeline
        .run(source)
        .with_context(|| format!("run aborted while writing {}", cli.output.display()))?;

    Ok(summary)
}

fn report(summary: &RunSummary) {
    info!(
        scored = summary.frames_scored,
        skipped = summary.frames_skipped,
        mean = summary.mean_score,
        max = summary.max_score.unwrap_or(0),
        "assessment finished"
    );
    for level in ActionLevel::ALL {
        info!(count = summary.count(level), "{level}");
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.load_config()?;
    let summary = run(&cli, &config)?;
    report(&summary);

    if let Some(path) = &cli.summary {
        let json = serde_json::to_string_pretty(&summary)?;
        std::fs::write(path, json)
            .with_context(|| format!("cannot write summary to {}", path.display()))?;
    }

    Ok(())
}
