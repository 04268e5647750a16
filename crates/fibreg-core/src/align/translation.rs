use ndarray::{s, Array2, Zip};
use tracing::{debug, info};

use crate::consts::BACKGROUND_HIGH;
use crate::error::{FibregError, Result};
use crate::frame::{Frame, Translation};
use crate::io::FileSequence;
use crate::parallel::WorkerPool;
use crate::pipeline::{PipelineStage, ProgressReporter};

use super::inner_rect::find_inner_rectangle;
use super::phase_correlation::phase_cross_correlation;

/// Pixels that are foreground (`< 255`) in both slices.
pub fn overlap_mask(reference: &Array2<u8>, moving: &Array2<u8>) -> Array2<bool> {
    Zip::from(reference)
        .and(moving)
        .map_collect(|&r, &m| r < BACKGROUND_HIGH && m < BACKGROUND_HIGH)
}

/// Translation that aligns `moving` onto `reference`, measured inside the
/// inner rectangle of their shared foreground.
pub fn estimate_pair(
    reference: &Frame,
    moving: &Frame,
    upsample_factor: u32,
    mask_crop_step: usize,
) -> Result<Translation> {
    if reference.data.dim() != moving.data.dim() {
        return Err(FibregError::DimensionMismatch {
            path: moving.source.clone(),
            expected: reference.data.dim(),
            found: moving.data.dim(),
        });
    }

    let mask = overlap_mask(&reference.data, &moving.data);
    let window = find_inner_rectangle(&mask, mask_crop_step).ok_or_else(|| {
        FibregError::MaskExhausted {
            reference: reference.source.clone(),
            moving: moving.source.clone(),
        }
    })?;

    let region = s![window.row_min..window.row_max, window.col_min..window.col_max];
    let ref_window = reference.data.slice(region).mapv(f64::from);
    let mov_window = moving.data.slice(region).mapv(f64::from);
    let shift = phase_cross_correlation(ref_window.view(), mov_window.view(), upsample_factor)?;

    debug!(
        slice = moving.index,
        %window,
        dy = shift.dy,
        dx = shift.dx,
        "Estimated pairwise shift"
    );
    Ok(shift)
}

/// Running sum of pairwise shifts, starting at `(0, 0)` for slice 0.
///
/// `pairwise[i]` is the shift of slice `i + 1` relative to slice `i`.
pub fn accumulate(pairwise: &[Translation]) -> Vec<Translation> {
    let mut series = Vec::with_capacity(pairwise.len() + 1);
    let mut total = Translation::ZERO;
    series.push(total);
    for &step in pairwise {
        total += step;
        series.push(total);
    }
    series
}

/// Cumulative drift of every slice relative to slice 0.
///
/// Pairs are estimated independently on the worker pool; the prefix sum
/// runs afterwards in slice order.
pub fn estimate_translations(
    sequence: &FileSequence,
    upsample_factor: u32,
    mask_crop_step: usize,
    pool: &WorkerPool,
    reporter: &dyn ProgressReporter,
) -> Result<Vec<Translation>> {
    if sequence.is_empty() {
        return Ok(Vec::new());
    }

    let pairs: Vec<usize> = (1..sequence.len()).collect();
    reporter.begin_stage(PipelineStage::EstimatingTranslation, Some(pairs.len()));
    let pairwise = pool.try_map(&pairs, reporter, |&i| {
        let reference = sequence.read_frame(i - 1)?;
        let moving = sequence.read_frame(i)?;
        estimate_pair(&reference, &moving, upsample_factor, mask_crop_step)
    });
    reporter.finish_stage();

    let series = accumulate(&pairwise?);
    if let Some(last) = series.last() {
        info!(
            frames = sequence.len(),
            upsample_factor,
            mask_crop_step,
            total_dy = last.dy,
            total_dx = last.dx,
            "Estimated cumulative drift"
        );
    }
    Ok(series)
}
