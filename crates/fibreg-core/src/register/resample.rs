use ndarray::{Array2, ArrayViewMut1, Axis, Zip};
use rayon::prelude::*;

use crate::consts::{BACKGROUND_HIGH, CUBIC_A, PARALLEL_PIXEL_THRESHOLD};
use crate::frame::Translation;

use super::envelope::PaddingEnvelope;

/// Samples this close outside the grid still count as inside.
const EDGE_EPSILON: f64 = 1e-9;

/// Pad a slice by replicating its edge pixels.
pub fn pad_edge(data: &Array2<u8>, envelope: &PaddingEnvelope) -> Array2<u8> {
    let (h, w) = data.dim();
    if h == 0 || w == 0 {
        return data.clone();
    }
    let shape = envelope.padded_dim(h, w);
    Array2::from_shape_fn(shape, |(r, c)| {
        let src_r = r.saturating_sub(envelope.row_before).min(h - 1);
        let src_c = c.saturating_sub(envelope.col_before).min(w - 1);
        data[[src_r, src_c]]
    })
}

/// Shift a boolean mask by whole pixels; exposed pixels are false.
pub fn shift_mask_nearest(mask: &Array2<bool>, dy: i64, dx: i64) -> Array2<bool> {
    let (h, w) = mask.dim();
    Array2::from_shape_fn((h, w), |(r, c)| {
        let src_r = r as i64 - dy;
        let src_c = c as i64 - dx;
        src_r >= 0
            && src_r < h as i64
            && src_c >= 0
            && src_c < w as i64
            && mask[[src_r as usize, src_c as usize]]
    })
}

/// Shift a slice by a sub-pixel translation using cubic convolution.
/// Pixels that map outside the source take `fill`.
pub fn shift_cubic(data: &Array2<u8>, offset: &Translation, fill: u8) -> Array2<u8> {
    let (h, w) = data.dim();
    let mut result = Array2::<u8>::from_elem((h, w), fill);

    let fill_row = |row: usize, mut line: ArrayViewMut1<u8>| {
        let src_y = row as f64 - offset.dy;
        for (col, out) in line.iter_mut().enumerate() {
            let src_x = col as f64 - offset.dx;
            let value = cubic_sample(data, src_y, src_x, fill as f64);
            *out = value.round().clamp(0.0, 255.0) as u8;
        }
    };

    if h * w >= PARALLEL_PIXEL_THRESHOLD {
        result
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(row, line)| fill_row(row, line));
    } else {
        for (row, line) in result.axis_iter_mut(Axis(0)).enumerate() {
            fill_row(row, line);
        }
    }

    result
}

/// Keys cubic convolution at `(y, x)`. Neighbours past the border repeat the
/// edge; points outside the grid return `fill`.
pub fn cubic_sample(data: &Array2<u8>, y: f64, x: f64, fill: f64) -> f64 {
    let (h, w) = data.dim();
    if h == 0
        || w == 0
        || y < -EDGE_EPSILON
        || x < -EDGE_EPSILON
        || y > (h - 1) as f64 + EDGE_EPSILON
        || x > (w - 1) as f64 + EDGE_EPSILON
    {
        return fill;
    }

    let y0 = y.floor() as i64;
    let x0 = x.floor() as i64;
    let fy = y - y0 as f64;
    let fx = x - x0 as f64;

    let mut sum = 0.0;
    for ky in -1..=2_i64 {
        let wy = cubic_weight(fy - ky as f64);
        if wy == 0.0 {
            continue;
        }
        let r = (y0 + ky).clamp(0, h as i64 - 1) as usize;
        for kx in -1..=2_i64 {
            let wx = cubic_weight(fx - kx as f64);
            if wx == 0.0 {
                continue;
            }
            let c = (x0 + kx).clamp(0, w as i64 - 1) as usize;
            sum += wy * wx * data[[r, c]] as f64;
        }
    }
    sum
}

fn cubic_weight(t: f64) -> f64 {
    let t = t.abs();
    let a = CUBIC_A;
    if t <= 1.0 {
        (a + 2.0) * t * t * t - (a + 3.0) * t * t + 1.0
    } else if t < 2.0 {
        a * t * t * t - 5.0 * a * t * t + 8.0 * a * t - 4.0 * a
    } else {
        0.0
    }
}

/// Pad, shift and composite one slice onto the shared canvas.
///
/// The foreground mask moves by the rounded translation so it stays
/// strictly boolean; pixel data moves by the exact translation. Outside the
/// shifted mask the canvas is background (255).
pub fn register_frame(
    data: &Array2<u8>,
    envelope: &PaddingEnvelope,
    offset: &Translation,
) -> Array2<u8> {
    let padded = pad_edge(data, envelope);
    let mask = padded.mapv(|v| v < BACKGROUND_HIGH);

    let (dy, dx) = offset.rounded();
    let shifted_mask = shift_mask_nearest(&mask, dy, dx);
    let shifted = shift_cubic(&padded, offset, BACKGROUND_HIGH);

    Zip::from(&shifted_mask)
        .and(&shifted)
        .map_collect(|&keep, &v| if keep { v } else { BACKGROUND_HIGH })
}
