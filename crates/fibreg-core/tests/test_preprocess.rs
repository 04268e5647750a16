mod common;

use ndarray::{array, Array2};

use fibreg_core::error::FibregError;
use fibreg_core::frame::{Bounds, Polarity};
use fibreg_core::io::FileSequence;
use fibreg_core::parallel::WorkerPool;
use fibreg_core::pipeline::NoOpReporter;
use fibreg_core::preprocess::{
    classify_polarity, crop_frame, crop_sequence, detect_bounds, foreground_extent,
    foreground_mean, invert_frame, invert_sequence, normalize_frame, normalize_sequence,
    profile_means,
};

use common::{noise_field, read_stack, rect_frame, write_stack};

fn sequence(dir: &std::path::Path) -> FileSequence {
    FileSequence::resolve(dir, "tif", 0, None).unwrap()
}

fn pool() -> WorkerPool {
    WorkerPool::new(2)
}

// ---------------------------------------------------------------------------
// Polarity and bounds
// ---------------------------------------------------------------------------

#[test]
fn test_polarity_detection() {
    let positive = rect_frame(10, 10, 2..5, 2..5, 100, 0);
    assert_eq!(Polarity::detect(&positive), Polarity::Positive);

    let inverted = rect_frame(10, 10, 2..5, 2..5, 100, 255);
    assert_eq!(Polarity::detect(&inverted), Polarity::Inverted);

    // Nothing at zero: the "> 0" rule does not split the slice.
    assert_eq!(Polarity::detect(&noise_field(8, 8, 1)), Polarity::Inverted);
}

#[test]
fn test_foreground_extent_exclusive_ends() {
    let frame = rect_frame(20, 30, 4..9, 10..25, 80, 0);
    let extent = foreground_extent(&frame, Polarity::Positive).unwrap();
    assert_eq!(extent, Bounds::new(4, 9, 10, 25));
    assert_eq!(extent.height(), 5);
    assert_eq!(extent.width(), 15);

    let empty = Array2::<u8>::zeros((5, 5));
    assert!(foreground_extent(&empty, Polarity::Positive).is_none());
}

#[test]
fn test_detect_bounds_union_with_padding() {
    let dir = tempfile::tempdir().unwrap();
    write_stack(
        dir.path(),
        &[
            rect_frame(40, 50, 10..20, 5..15, 100, 0),
            rect_frame(40, 50, 12..25, 8..30, 100, 0),
        ],
    );

    let bounds = detect_bounds(&sequence(dir.path()), 3, &pool(), &NoOpReporter).unwrap();
    assert_eq!(bounds, Bounds::new(7, 28, 2, 33));
}

#[test]
fn test_detect_bounds_padding_clips_to_frame() {
    let dir = tempfile::tempdir().unwrap();
    write_stack(dir.path(), &[rect_frame(40, 50, 2..20, 30..48, 100, 0)]);

    let bounds = detect_bounds(&sequence(dir.path()), 50, &pool(), &NoOpReporter).unwrap();
    assert_eq!(bounds, Bounds::new(0, 40, 0, 50));
}

#[test]
fn test_detect_bounds_inverted_dataset() {
    let dir = tempfile::tempdir().unwrap();
    write_stack(
        dir.path(),
        &[
            rect_frame(30, 30, 5..10, 6..12, 90, 255),
            rect_frame(30, 30, 8..14, 4..9, 90, 255),
        ],
    );

    let seq = sequence(dir.path());
    assert_eq!(classify_polarity(&seq).unwrap(), Polarity::Inverted);
    let bounds = detect_bounds(&seq, 0, &pool(), &NoOpReporter).unwrap();
    assert_eq!(bounds, Bounds::new(5, 14, 4, 12));
}

#[test]
fn test_detect_bounds_empty_slice_names_file() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_stack(
        dir.path(),
        &[
            rect_frame(20, 20, 5..10, 5..10, 100, 0),
            Array2::<u8>::zeros((20, 20)),
        ],
    );

    match detect_bounds(&sequence(dir.path()), 0, &pool(), &NoOpReporter) {
        Err(FibregError::EmptyForeground { path }) => assert_eq!(path, paths[1]),
        other => panic!("expected EmptyForeground, got {other:?}"),
    }
}

#[test]
fn test_detect_bounds_dimension_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    write_stack(
        dir.path(),
        &[
            rect_frame(20, 20, 5..10, 5..10, 100, 0),
            rect_frame(20, 24, 5..10, 5..10, 100, 0),
        ],
    );

    assert!(matches!(
        detect_bounds(&sequence(dir.path()), 0, &pool(), &NoOpReporter),
        Err(FibregError::DimensionMismatch {
            expected: (20, 20),
            found: (20, 24),
            ..
        })
    ));
}

#[test]
fn test_detect_bounds_empty_sequence() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        detect_bounds(&sequence(dir.path()), 0, &pool(), &NoOpReporter),
        Err(FibregError::EmptySequence)
    ));
}

// ---------------------------------------------------------------------------
// Cropping
// ---------------------------------------------------------------------------

#[test]
fn test_crop_frame_clips_to_slice() {
    let frame = noise_field(10, 12, 5);
    let cropped = crop_frame(&frame, &Bounds::new(2, 6, 3, 40));
    assert_eq!(cropped.dim(), (4, 9));
    assert_eq!(cropped[[0, 0]], frame[[2, 3]]);
    assert_eq!(cropped[[3, 8]], frame[[5, 11]]);
}

#[test]
fn test_crop_sequence_writes_destination() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let dest = out.path().join("nested/cropped");
    write_stack(
        src.path(),
        &[
            rect_frame(40, 50, 10..20, 5..15, 100, 0),
            rect_frame(40, 50, 12..25, 8..30, 120, 0),
        ],
    );

    let seq = sequence(src.path());
    let bounds = detect_bounds(&seq, 3, &pool(), &NoOpReporter).unwrap();
    let cropped = crop_sequence(&seq, &bounds, &dest, &pool(), &NoOpReporter).unwrap();

    assert_eq!(cropped.len(), 2);
    assert_eq!(cropped.directory(), dest.as_path());
    let frames = read_stack(&dest);
    assert_eq!(frames[0].dim(), (21, 31));
    // Content of slice 0 starts 3 pixels in from the crop origin.
    assert_eq!(frames[0][[3, 3]], 100);
    assert_eq!(frames[0][[2, 3]], 0);
}

#[test]
fn test_crop_is_idempotent() {
    let src = tempfile::tempdir().unwrap();
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    write_stack(
        src.path(),
        &[
            rect_frame(40, 50, 10..20, 5..15, 100, 0),
            rect_frame(40, 50, 12..25, 8..30, 120, 0),
        ],
    );

    let seq = sequence(src.path());
    let bounds = detect_bounds(&seq, 3, &pool(), &NoOpReporter).unwrap();
    let once = crop_sequence(&seq, &bounds, first.path(), &pool(), &NoOpReporter).unwrap();

    let again = detect_bounds(&once, 3, &pool(), &NoOpReporter).unwrap();
    assert_eq!(again, Bounds::new(0, bounds.height(), 0, bounds.width()));
    crop_sequence(&once, &again, second.path(), &pool(), &NoOpReporter).unwrap();

    assert_eq!(read_stack(first.path()), read_stack(second.path()));
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

#[test]
fn test_foreground_mean_ignores_zeros() {
    let data = array![[0u8, 10, 20], [0, 0, 30]];
    assert_eq!(foreground_mean(&data), Some(20.0));
    assert_eq!(foreground_mean(&Array2::<u8>::zeros((3, 3))), None);
}

#[test]
fn test_normalize_frame_keeps_zero_and_clamps() {
    let data = array![[0u8, 10, 250]];
    assert_eq!(normalize_frame(&data, 20.0), array![[0u8, 30, 255]]);
    assert_eq!(normalize_frame(&data, -50.0), array![[0u8, 0, 200]]);
    assert_eq!(normalize_frame(&data, 0.4), data);
    assert_eq!(normalize_frame(&data, -1e-9), data);
}

#[test]
fn test_normalize_equal_slices_unchanged() {
    let src = tempfile::tempdir().unwrap();
    let dst = tempfile::tempdir().unwrap();
    let frame = rect_frame(16, 16, 3..12, 4..10, 90, 0);
    write_stack(src.path(), &[frame.clone(), frame.clone(), frame.clone()]);

    normalize_sequence(&sequence(src.path()), 5, dst.path(), &pool(), &NoOpReporter).unwrap();
    for out in read_stack(dst.path()) {
        assert_eq!(out, frame);
    }
}

#[test]
fn test_normalize_pulls_slices_to_common_mean() {
    let src = tempfile::tempdir().unwrap();
    let dst = tempfile::tempdir().unwrap();
    write_stack(
        src.path(),
        &[
            rect_frame(12, 12, 2..10, 2..10, 100, 0),
            rect_frame(12, 12, 2..10, 2..10, 140, 0),
        ],
    );

    let seq = sequence(src.path());
    let curve = profile_means(&seq, 1, &pool(), &NoOpReporter).unwrap();
    assert_eq!(curve.len(), 2);
    approx::assert_abs_diff_eq!(curve[0] + curve[1], 240.0, epsilon = 1e-9);
    assert!(curve[0] > 100.0 && curve[0] < 120.0);

    normalize_sequence(&seq, 1, dst.path(), &pool(), &NoOpReporter).unwrap();
    let out = read_stack(dst.path());
    assert!((105..=107).contains(&out[0][[5, 5]]));
    assert!((133..=135).contains(&out[1][[5, 5]]));
    assert_eq!(out[0][[0, 0]], 0);
    assert_eq!(out[1][[11, 11]], 0);
}

#[test]
fn test_normalize_carries_mean_over_empty_slice() {
    let src = tempfile::tempdir().unwrap();
    let dst = tempfile::tempdir().unwrap();
    let frame = rect_frame(10, 10, 2..8, 2..8, 100, 0);
    write_stack(
        src.path(),
        &[frame.clone(), Array2::<u8>::zeros((10, 10)), frame.clone()],
    );

    let seq = sequence(src.path());
    let curve = profile_means(&seq, 2, &pool(), &NoOpReporter).unwrap();
    for mean in &curve {
        approx::assert_abs_diff_eq!(*mean, 100.0, epsilon = 1e-9);
    }

    normalize_sequence(&seq, 2, dst.path(), &pool(), &NoOpReporter).unwrap();
    let out = read_stack(dst.path());
    assert_eq!(out[0], frame);
    assert!(out[1].iter().all(|&v| v == 0));
    assert_eq!(out[2], frame);
}

#[test]
fn test_normalize_all_empty_fails() {
    let src = tempfile::tempdir().unwrap();
    let dst = tempfile::tempdir().unwrap();
    write_stack(
        src.path(),
        &[Array2::<u8>::zeros((6, 6)), Array2::<u8>::zeros((6, 6))],
    );

    assert!(matches!(
        normalize_sequence(&sequence(src.path()), 5, dst.path(), &pool(), &NoOpReporter),
        Err(FibregError::EmptyForeground { .. })
    ));
}

#[test]
fn test_normalize_empty_sequence_creates_destination() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let dest = out.path().join("normalized");

    let result =
        normalize_sequence(&sequence(src.path()), 5, &dest, &pool(), &NoOpReporter).unwrap();
    assert!(result.is_empty());
    assert!(dest.is_dir());
}

// ---------------------------------------------------------------------------
// Inversion
// ---------------------------------------------------------------------------

#[test]
fn test_invert_frame() {
    let data = array![[0u8, 1, 128, 255]];
    assert_eq!(invert_frame(&data), array![[255u8, 254, 127, 0]]);
}

#[test]
fn test_invert_sequence_twice_is_identity() {
    let src = tempfile::tempdir().unwrap();
    let once = tempfile::tempdir().unwrap();
    let twice = tempfile::tempdir().unwrap();
    let frames = vec![noise_field(9, 11, 1), noise_field(9, 11, 2)];
    write_stack(src.path(), &frames);

    let inverted = invert_sequence(&sequence(src.path()), once.path(), &pool(), &NoOpReporter).unwrap();
    assert_eq!(read_stack(once.path())[0], invert_frame(&frames[0]));

    invert_sequence(&inverted, twice.path(), &pool(), &NoOpReporter).unwrap();
    assert_eq!(read_stack(twice.path()), frames);
}
