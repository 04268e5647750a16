#![allow(dead_code)]

use std::path::{Path, PathBuf};

use ndarray::Array2;

use fibreg_core::io::{save_gray8, FileSequence};

/// Deterministic pseudo-random intensity in `[10, 240]` (splitmix64 mix).
///
/// Never 0 or 255, so every pixel counts as foreground under both
/// polarities.
pub fn hash_value(row: usize, col: usize, seed: u64) -> u8 {
    let mut z = (row as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (col as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F)
        ^ seed.wrapping_mul(0x1656_67B1_9E37_79F9);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^= z >> 31;
    (10 + z % 231) as u8
}

/// Textured field used as the "specimen" that slices are cut from.
pub fn noise_field(height: usize, width: usize, seed: u64) -> Array2<u8> {
    Array2::from_shape_fn((height, width), |(r, c)| hash_value(r, c, seed))
}

/// `height` x `width` window of `field` starting at `(row, col)`.
pub fn window(field: &Array2<u8>, row: usize, col: usize, height: usize, width: usize) -> Array2<u8> {
    field
        .slice(ndarray::s![row..row + height, col..col + width])
        .to_owned()
}

/// Uniform background with a filled rectangle `[r0, r1) x [c0, c1)`.
pub fn rect_frame(
    height: usize,
    width: usize,
    rows: std::ops::Range<usize>,
    cols: std::ops::Range<usize>,
    value: u8,
    background: u8,
) -> Array2<u8> {
    Array2::from_shape_fn((height, width), |(r, c)| {
        if rows.contains(&r) && cols.contains(&c) {
            value
        } else {
            background
        }
    })
}

/// File name of slice `index`.
pub fn slice_name(index: usize) -> String {
    format!("slice_{index:04}.tif")
}

/// Write `frames` into `dir` as `slice_0000.tif`, `slice_0001.tif`, ...
pub fn write_stack(dir: &Path, frames: &[Array2<u8>]) -> Vec<PathBuf> {
    std::fs::create_dir_all(dir).expect("create stack dir");
    frames
        .iter()
        .enumerate()
        .map(|(i, frame)| {
            let path = dir.join(slice_name(i));
            save_gray8(frame, &path).expect("write slice");
            path
        })
        .collect()
}

/// Read every `.tif` slice of `dir` in file-name order.
pub fn read_stack(dir: &Path) -> Vec<Array2<u8>> {
    let sequence = FileSequence::resolve(dir, "tif", 0, None).expect("resolve stack");
    (0..sequence.len())
        .map(|i| sequence.read_frame(i).expect("read slice").data)
        .collect()
}

/// Mean absolute difference over a sub-window of two equally sized frames.
pub fn mean_abs_diff(
    a: &Array2<u8>,
    b: &Array2<u8>,
    rows: std::ops::Range<usize>,
    cols: std::ops::Range<usize>,
) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for r in rows {
        for c in cols.clone() {
            sum += (a[[r, c]] as f64 - b[[r, c]] as f64).abs();
            count += 1;
        }
    }
    sum / count.max(1) as f64
}
