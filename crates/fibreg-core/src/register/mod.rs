//! Resampling of a slice stack onto a shared, drift-corrected canvas.

pub mod envelope;
pub mod resample;

use std::path::Path;

use tracing::info;

use crate::error::{FibregError, Result};
use crate::frame::Translation;
use crate::io::{ensure_dir, load_frame, save_as_sibling, FileSequence};
use crate::parallel::WorkerPool;
use crate::pipeline::{PipelineStage, ProgressReporter};

pub use envelope::PaddingEnvelope;
pub use resample::{cubic_sample, pad_edge, register_frame, shift_cubic, shift_mask_nearest};

/// Shift every slice by its cumulative translation into a canvas large
/// enough for the whole series, and write it into `destination`.
pub fn register_sequence(
    sequence: &FileSequence,
    translations: &[Translation],
    destination: &Path,
    pool: &WorkerPool,
    reporter: &dyn ProgressReporter,
) -> Result<FileSequence> {
    if translations.len() != sequence.len() {
        return Err(FibregError::InvalidConfig(format!(
            "{} translations for {} slices",
            translations.len(),
            sequence.len()
        )));
    }
    ensure_dir(destination)?;

    let envelope = PaddingEnvelope::from_translations(translations);
    let jobs: Vec<(usize, &Path, Translation)> = sequence
        .indexed()
        .into_iter()
        .zip(translations.iter().copied())
        .map(|((index, path), t)| (index, path, t))
        .collect();

    reporter.begin_stage(PipelineStage::Registering, Some(jobs.len()));
    let written = pool.try_map(&jobs, reporter, |&(index, path, offset)| {
        let frame = load_frame(path, index)?;
        save_as_sibling(&register_frame(&frame.data, &envelope, &offset), path, destination)
    });
    reporter.finish_stage();
    written?;

    info!(
        frames = sequence.len(),
        %envelope,
        destination = %destination.display(),
        "Registered sequence"
    );
    Ok(sequence.rebased(destination))
}
