use ndarray::{s, Array2, ArrayView1};
use tracing::trace;

use crate::frame::Bounds;

const TOP: usize = 0;
const BOTTOM: usize = 1;
const LEFT: usize = 2;
const RIGHT: usize = 3;

/// Shrink the foreground of `mask` until every edge of its bounding box is a
/// flat line, and return that box (exclusive ends).
///
/// Each pass inspects the one-pixel line along every unfinished edge of the
/// current bounding box. A constant line marks the edge finished; otherwise
/// a band of `step` rows or columns is cleared from that side. Finished
/// edges stay finished. The result is a rectangle fully inside the mask,
/// not necessarily the largest one.
///
/// Returns `None` when the mask is empty or erosion clears it.
pub fn find_inner_rectangle(mask: &Array2<bool>, step: usize) -> Option<Bounds> {
    let (h, w) = mask.dim();
    let step = step.max(1);
    // Every eroding pass shrinks the box by at least `step` on some side.
    let max_passes = h.div_ceil(step) + w.div_ceil(step) + 2;

    let mut mask = mask.to_owned();
    let mut done = [false; 4];

    for pass in 0..max_passes {
        let bounds = Bounds::of_mask(&mask)?;
        if done.iter().all(|&d| d) {
            trace!(pass, %bounds, "Inner rectangle converged");
            return Some(bounds);
        }

        let (r0, r1) = (bounds.row_min, bounds.row_max - 1);
        let (c0, c1) = (bounds.col_min, bounds.col_max - 1);
        let mut eroded = mask.clone();

        if !done[TOP] {
            if is_flat(mask.slice(s![r0, c0..=c1])) {
                done[TOP] = true;
            } else {
                eroded.slice_mut(s![..(r0 + step).min(h), ..]).fill(false);
            }
        }
        if !done[BOTTOM] {
            if is_flat(mask.slice(s![r1, c0..=c1])) {
                done[BOTTOM] = true;
            } else {
                eroded.slice_mut(s![(r1 + 1).saturating_sub(step).., ..]).fill(false);
            }
        }
        if !done[LEFT] {
            if is_flat(mask.slice(s![r0..=r1, c0])) {
                done[LEFT] = true;
            } else {
                eroded.slice_mut(s![.., ..(c0 + step).min(w)]).fill(false);
            }
        }
        if !done[RIGHT] {
            if is_flat(mask.slice(s![r0..=r1, c1])) {
                done[RIGHT] = true;
            } else {
                eroded.slice_mut(s![.., (c1 + 1).saturating_sub(step)..]).fill(false);
            }
        }

        mask = eroded;
    }

    None
}

fn is_flat(line: ArrayView1<bool>) -> bool {
    match line.first() {
        Some(&first) => line.iter().all(|&v| v == first),
        None => true,
    }
}
