use serde::{Deserialize, Serialize};

use crate::frame::Translation;

/// Shifts within this distance of a whole pixel do not need an extra row or
/// column of canvas.
const WHOLE_PIXEL_TOLERANCE: f64 = 1e-6;

/// Canvas margin added around every slice before resampling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaddingEnvelope {
    pub row_before: usize,
    pub row_after: usize,
    pub col_before: usize,
    pub col_after: usize,
}

impl PaddingEnvelope {
    /// Smallest margin that keeps every slice, shifted by its translation,
    /// inside the canvas. Negative shifts need room before, positive after.
    pub fn from_translations(translations: &[Translation]) -> Self {
        let mut env = Self::default();
        for t in translations {
            env.row_before = env.row_before.max(margin(-t.dy));
            env.row_after = env.row_after.max(margin(t.dy));
            env.col_before = env.col_before.max(margin(-t.dx));
            env.col_after = env.col_after.max(margin(t.dx));
        }
        env
    }

    /// Canvas size for a `height` x `width` slice.
    pub fn padded_dim(&self, height: usize, width: usize) -> (usize, usize) {
        (
            height + self.row_before + self.row_after,
            width + self.col_before + self.col_after,
        )
    }
}

fn margin(shift: f64) -> usize {
    if shift <= 0.0 {
        0
    } else {
        (shift - WHOLE_PIXEL_TOLERANCE).ceil().max(0.0) as usize
    }
}

impl std::fmt::Display for PaddingEnvelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "rows +{}/+{}, cols +{}/+{}",
            self.row_before, self.row_after, self.col_before, self.col_after
        )
    }
}
