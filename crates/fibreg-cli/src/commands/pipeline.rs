use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use fibreg_core::pipeline::config::BatchConfig;
use fibreg_core::pipeline::run_batch;
use tracing::info;

use crate::progress::BarReporter;
use crate::summary::{print_batch_summary, print_batch_total, print_experiment_report};

#[derive(Args)]
pub struct RunArgs {
    /// Batch config file (TOML)
    pub config: PathBuf,
}

pub fn run(args: &RunArgs, workers: Option<usize>) -> Result<()> {
    let contents = std::fs::read_to_string(&args.config)
        .with_context(|| format!("Failed to read config {}", args.config.display()))?;
    let mut config: BatchConfig = toml::from_str(&contents).context("Invalid batch config")?;
    if workers.is_some() {
        config.workers = workers;
    }
    info!(
        config = %args.config.display(),
        task = %config.task,
        experiments = config.experiments.len(),
        "Loaded batch config"
    );

    execute(&config)
}

/// Print the summary, run every experiment with a progress bar, then print
/// the per-experiment results.
pub fn execute(config: &BatchConfig) -> Result<()> {
    print_batch_summary(config);

    let reporter = BarReporter::new()?;
    let started = Instant::now();
    let reports = run_batch(config, &reporter);
    reporter.finish();
    let reports = reports.context("Batch failed")?;

    for report in &reports {
        if let Some(experiment) = config.experiments.get(report.index - 1) {
            print_experiment_report(report, experiment);
        }
    }
    print_batch_total(reports.len(), started.elapsed());

    Ok(())
}
