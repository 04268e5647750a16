use std::path::Path;

use ndarray::Array2;
use tracing::info;

use crate::consts::BACKGROUND_HIGH;
use crate::error::Result;
use crate::io::{ensure_dir, load_frame, save_as_sibling, FileSequence};
use crate::parallel::WorkerPool;
use crate::pipeline::{PipelineStage, ProgressReporter};

/// 8-bit complement of a slice.
pub fn invert_frame(data: &Array2<u8>) -> Array2<u8> {
    data.mapv(|v| BACKGROUND_HIGH - v)
}

/// Invert every slice of `sequence` into `destination`.
pub fn invert_sequence(
    sequence: &FileSequence,
    destination: &Path,
    pool: &WorkerPool,
    reporter: &dyn ProgressReporter,
) -> Result<FileSequence> {
    ensure_dir(destination)?;

    reporter.begin_stage(PipelineStage::Inverting, Some(sequence.len()));
    let written = pool.try_map(&sequence.indexed(), reporter, |&(index, path)| {
        let frame = load_frame(path, index)?;
        save_as_sibling(&invert_frame(&frame.data), path, destination)
    });
    reporter.finish_stage();
    written?;

    info!(frames = sequence.len(), destination = %destination.display(), "Inverted sequence");
    Ok(sequence.rebased(destination))
}
