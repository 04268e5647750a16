use std::path::Path;
use std::time::Instant;

use tracing::{info, warn};

use crate::align::estimate_translations;
use crate::error::Result;
use crate::frame::Translation;
use crate::io::{ensure_dir, FileSequence};
use crate::parallel::WorkerPool;
use crate::preprocess::{
    classify_polarity, crop_sequence, detect_bounds_with, invert_sequence, normalize_sequence,
};
use crate::register::register_sequence;

use super::config::{BatchConfig, ExperimentConfig, PreprocessingConfig, RegistrationConfig, Task};
use super::types::{ExperimentReport, ProgressReporter};

/// Validate `config` and run its experiments one after another.
///
/// The first failing experiment aborts the batch; its error carries the
/// experiment index. Experiments that already finished keep their output.
pub fn run_batch(
    config: &BatchConfig,
    reporter: &dyn ProgressReporter,
) -> Result<Vec<ExperimentReport>> {
    config.validate()?;
    let pool = config.worker_pool();
    let total = config.experiments.len();
    let started = Instant::now();

    info!(
        task = %config.task,
        experiments = total,
        workers = pool.max_workers(),
        "Starting batch"
    );

    let mut reports = Vec::with_capacity(total);
    for (i, experiment) in config.experiments.iter().enumerate() {
        let index = i + 1;
        reporter.begin_experiment(index, total);
        let report = run_experiment(config, experiment, index, &pool, reporter)
            .map_err(|e| e.in_experiment(index))?;
        info!(
            experiment = index,
            frames = report.frames,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Experiment finished"
        );
        reports.push(report);
    }

    info!(
        experiments = total,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Batch finished"
    );
    Ok(reports)
}

/// Run the configured task on a single experiment.
pub fn run_experiment(
    config: &BatchConfig,
    experiment: &ExperimentConfig,
    index: usize,
    pool: &WorkerPool,
    reporter: &dyn ProgressReporter,
) -> Result<ExperimentReport> {
    let started = Instant::now();
    let sequence = FileSequence::resolve(
        &experiment.load_path,
        &config.extension,
        experiment.crop_start,
        experiment.crop_end,
    )?;
    ensure_dir(&experiment.save_path)?;

    let mut report = ExperimentReport {
        index,
        frames: sequence.len(),
        ..Default::default()
    };

    if sequence.is_empty() {
        warn!(
            experiment = index,
            directory = %experiment.load_path.display(),
            extension = %config.extension,
            "No slices found; nothing to do"
        );
    } else {
        match config.task {
            Task::Preprocessing => {
                run_preprocessing(
                    &sequence,
                    &config.preprocessing,
                    &experiment.save_path,
                    pool,
                    reporter,
                    &mut report,
                )?;
            }
            Task::Registration => {
                let translations = run_registration(
                    &sequence,
                    &config.registration,
                    &experiment.save_path,
                    pool,
                    reporter,
                )?;
                report.translations = Some(translations);
            }
        }
    }

    report.elapsed = started.elapsed();
    Ok(report)
}

/// Crop, normalize and invert, each step reading the previous step's output.
pub fn run_preprocessing(
    sequence: &FileSequence,
    params: &PreprocessingConfig,
    destination: &Path,
    pool: &WorkerPool,
    reporter: &dyn ProgressReporter,
    report: &mut ExperimentReport,
) -> Result<FileSequence> {
    ensure_dir(destination)?;
    let mut current = sequence.clone();

    if params.crop {
        let polarity = classify_polarity(&current)?;
        let bounds = detect_bounds_with(&current, polarity, params.padding, pool, reporter)?;
        current = crop_sequence(&current, &bounds, destination, pool, reporter)?;
        report.polarity = Some(polarity);
        report.bounds = Some(bounds);
    }
    if params.normalize {
        current = normalize_sequence(&current, params.mean_smoothing, destination, pool, reporter)?;
    }
    if params.invert {
        current = invert_sequence(&current, destination, pool, reporter)?;
    }

    Ok(current)
}

/// Estimate cumulative drift and resample every slice into `destination`.
pub fn run_registration(
    sequence: &FileSequence,
    params: &RegistrationConfig,
    destination: &Path,
    pool: &WorkerPool,
    reporter: &dyn ProgressReporter,
) -> Result<Vec<Translation>> {
    let translations = estimate_translations(
        sequence,
        params.upsample_factor,
        params.mask_crop_step,
        pool,
        reporter,
    )?;
    register_sequence(sequence, &translations, destination, pool, reporter)?;
    Ok(translations)
}
