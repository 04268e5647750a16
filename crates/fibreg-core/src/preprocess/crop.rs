use std::path::Path;

use ndarray::{s, Array2};
use tracing::info;

use crate::error::Result;
use crate::frame::Bounds;
use crate::io::{ensure_dir, load_frame, save_as_sibling, FileSequence};
use crate::parallel::WorkerPool;
use crate::pipeline::{PipelineStage, ProgressReporter};

/// Extract the `bounds` window of a slice. The window is clipped to the
/// slice, so bounds computed on a larger frame never index out of range.
pub fn crop_frame(data: &Array2<u8>, bounds: &Bounds) -> Array2<u8> {
    let (h, w) = data.dim();
    let row_max = bounds.row_max.min(h);
    let col_max = bounds.col_max.min(w);
    let row_min = bounds.row_min.min(row_max);
    let col_min = bounds.col_min.min(col_max);
    data.slice(s![row_min..row_max, col_min..col_max]).to_owned()
}

/// Crop every slice to `bounds` and write it into `destination` under its
/// original file name. Returns the written sequence.
pub fn crop_sequence(
    sequence: &FileSequence,
    bounds: &Bounds,
    destination: &Path,
    pool: &WorkerPool,
    reporter: &dyn ProgressReporter,
) -> Result<FileSequence> {
    ensure_dir(destination)?;

    reporter.begin_stage(PipelineStage::Cropping, Some(sequence.len()));
    let written = pool.try_map(&sequence.indexed(), reporter, |&(index, path)| {
        let frame = load_frame(path, index)?;
        save_as_sibling(&crop_frame(&frame.data, bounds), path, destination)
    });
    reporter.finish_stage();
    written?;

    info!(
        frames = sequence.len(),
        %bounds,
        destination = %destination.display(),
        "Cropped sequence"
    );
    Ok(sequence.rebased(destination))
}
