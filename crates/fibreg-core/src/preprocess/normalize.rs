use std::path::Path;

use ndarray::Array2;
use tracing::{info, warn};

use crate::consts::BACKGROUND_LOW;
use crate::error::{FibregError, Result};
use crate::filters::gaussian_smooth_1d;
use crate::io::{ensure_dir, load_frame, save_as_sibling, FileSequence};
use crate::parallel::WorkerPool;
use crate::pipeline::{PipelineStage, ProgressReporter};

/// Mean of the non-zero pixels of a slice, or `None` if every pixel is zero.
pub fn foreground_mean(data: &Array2<u8>) -> Option<f64> {
    let (sum, count) = data
        .iter()
        .filter(|&&v| v > BACKGROUND_LOW)
        .fold((0u64, 0u64), |(s, c), &v| (s + v as u64, c + 1));
    (count > 0).then(|| sum as f64 / count as f64)
}

/// Per-slice foreground means, smoothed along the stack with a Gaussian of
/// standard deviation `smoothing`.
///
/// Slices without foreground take the mean of the closest preceding slice
/// that has one (leading gaps take the first defined mean). A sequence with
/// no foreground at all is an error.
pub fn profile_means(
    sequence: &FileSequence,
    smoothing: u32,
    pool: &WorkerPool,
    reporter: &dyn ProgressReporter,
) -> Result<Vec<f64>> {
    reporter.begin_stage(PipelineStage::ProfilingMeans, Some(sequence.len()));
    let raw = pool.try_map(&sequence.indexed(), reporter, |&(index, path)| {
        let frame = load_frame(path, index)?;
        Ok(foreground_mean(&frame.data))
    });
    reporter.finish_stage();

    let means = fill_missing_means(&raw?, sequence)?;
    Ok(gaussian_smooth_1d(&means, smoothing as f64))
}

fn fill_missing_means(raw: &[Option<f64>], sequence: &FileSequence) -> Result<Vec<f64>> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    let Some(first_defined) = raw.iter().flatten().next().copied() else {
        return Err(FibregError::EmptyForeground {
            path: sequence
                .get(0)
                .map(Path::to_path_buf)
                .unwrap_or_else(|| sequence.directory().to_path_buf()),
        });
    };

    let mut carried = first_defined;
    let mut filled = Vec::with_capacity(raw.len());
    for (i, mean) in raw.iter().enumerate() {
        match mean {
            Some(m) => carried = *m,
            None => {
                warn!(
                    slice = i,
                    file = ?sequence.get(i),
                    fill = carried,
                    "Slice has no foreground; reusing neighbouring mean"
                );
            }
        }
        filled.push(carried);
    }
    Ok(filled)
}

/// Shift every foreground pixel by `offset`, rounding and clamping to the
/// 8-bit range. Pixels that are exactly zero stay zero.
///
/// Values are rounded to the nearest level rather than truncated, so a
/// near-zero offset such as `-1e-9` from smoothing round-off leaves the
/// slice unchanged instead of darkening it by one level.
pub fn normalize_frame(data: &Array2<u8>, offset: f64) -> Array2<u8> {
    data.mapv(|v| {
        if v == BACKGROUND_LOW {
            BACKGROUND_LOW
        } else {
            (v as f64 + offset).round().clamp(0.0, 255.0) as u8
        }
    })
}

/// Equalize slice intensities to the stack-wide mean and write the result
/// into `destination`.
pub fn normalize_sequence(
    sequence: &FileSequence,
    smoothing: u32,
    destination: &Path,
    pool: &WorkerPool,
    reporter: &dyn ProgressReporter,
) -> Result<FileSequence> {
    ensure_dir(destination)?;
    if sequence.is_empty() {
        return Ok(sequence.rebased(destination));
    }

    let curve = profile_means(sequence, smoothing, pool, reporter)?;
    let target = curve.iter().sum::<f64>() / curve.len() as f64;

    let jobs: Vec<(usize, &Path, f64)> = sequence
        .indexed()
        .into_iter()
        .zip(curve.iter())
        .map(|((index, path), &mean)| (index, path, target - mean))
        .collect();

    reporter.begin_stage(PipelineStage::Normalizing, Some(jobs.len()));
    let written = pool.try_map(&jobs, reporter, |&(index, path, offset)| {
        let frame = load_frame(path, index)?;
        save_as_sibling(&normalize_frame(&frame.data, offset), path, destination)
    });
    reporter.finish_stage();
    written?;

    info!(
        frames = sequence.len(),
        smoothing,
        target_mean = target,
        destination = %destination.display(),
        "Normalized sequence"
    );
    Ok(sequence.rebased(destination))
}
