use std::path::Path;

use ndarray::Array2;
use tracing::{debug, info};

use crate::error::{FibregError, Result};
use crate::frame::{Bounds, Polarity};
use crate::io::{load_frame, FileSequence};
use crate::parallel::WorkerPool;
use crate::pipeline::{PipelineStage, ProgressReporter};

/// Classify the dataset polarity from its first slice.
pub fn classify_polarity(sequence: &FileSequence) -> Result<Polarity> {
    let first = sequence.read_frame(0)?;
    let polarity = Polarity::detect(&first.data);
    debug!(%polarity, file = %first.source.display(), "Classified polarity");
    Ok(polarity)
}

/// Find the smallest box containing the foreground of every slice, grown by
/// `padding` pixels per side and clipped to the frame.
///
/// Polarity is classified from slice 0 and applied to the whole sequence.
pub fn detect_bounds(
    sequence: &FileSequence,
    padding: usize,
    pool: &WorkerPool,
    reporter: &dyn ProgressReporter,
) -> Result<Bounds> {
    if sequence.is_empty() {
        return Err(FibregError::EmptySequence);
    }
    let polarity = classify_polarity(sequence)?;
    detect_bounds_with(sequence, polarity, padding, pool, reporter)
}

/// [`detect_bounds`] with an explicit polarity.
pub fn detect_bounds_with(
    sequence: &FileSequence,
    polarity: Polarity,
    padding: usize,
    pool: &WorkerPool,
    reporter: &dyn ProgressReporter,
) -> Result<Bounds> {
    if sequence.is_empty() {
        return Err(FibregError::EmptySequence);
    }

    let first = sequence.read_frame(0)?;
    let shape = first.data.dim();

    reporter.begin_stage(PipelineStage::DetectingBounds, Some(sequence.len()));
    let extents = pool.try_map(&sequence.indexed(), reporter, |&(index, path)| {
        frame_extent(path, index, shape, polarity)
    });
    reporter.finish_stage();

    let content = extents?
        .into_iter()
        .reduce(|a, b| a.union(&b))
        .ok_or(FibregError::EmptySequence)?;
    let bounds = content.padded(padding, shape.0, shape.1);

    info!(
        frames = sequence.len(),
        %polarity,
        padding,
        %bounds,
        "Detected content bounds"
    );
    Ok(bounds)
}

fn frame_extent(
    path: &Path,
    index: usize,
    expected: (usize, usize),
    polarity: Polarity,
) -> Result<Bounds> {
    let frame = load_frame(path, index)?;
    let found = frame.data.dim();
    if found != expected {
        return Err(FibregError::DimensionMismatch {
            path: path.to_path_buf(),
            expected,
            found,
        });
    }
    foreground_extent(&frame.data, polarity).ok_or_else(|| FibregError::EmptyForeground {
        path: path.to_path_buf(),
    })
}

/// Bounding box (exclusive ends) of the foreground pixels of one slice.
pub fn foreground_extent(data: &Array2<u8>, polarity: Polarity) -> Option<Bounds> {
    let mut extent: Option<Bounds> = None;

    for (row, line) in data.outer_iter().enumerate() {
        let first = line.iter().position(|&v| polarity.is_foreground(v));
        let Some(first) = first else {
            continue;
        };
        // A foreground pixel exists in this row, so rposition succeeds.
        let last = line
            .iter()
            .rposition(|&v| polarity.is_foreground(v))
            .unwrap_or(first);
        let row_box = Bounds::new(row, row + 1, first, last + 1);
        extent = Some(match extent {
            Some(b) => b.union(&row_box),
            None => row_box,
        });
    }

    extent
}
