use std::ops::{Add, AddAssign};
use std::path::PathBuf;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::consts::{BACKGROUND_HIGH, BACKGROUND_LOW};

/// A single 8-bit slice of a stack.
#[derive(Clone, Debug)]
pub struct Frame {
    /// Pixel data, row-major, shape = (height, width)
    pub data: Array2<u8>,
    /// Position of the slice within its sequence
    pub index: usize,
    /// File the slice was read from
    pub source: PathBuf,
}

impl Frame {
    pub fn new(data: Array2<u8>, index: usize, source: impl Into<PathBuf>) -> Self {
        Self {
            data,
            index,
            source: source.into(),
        }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }
}

/// Which pixel value marks empty mount in a dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Polarity {
    /// Background is 0; foreground is `value > 0`.
    Positive,
    /// Background is 255; foreground is `value < 255`.
    Inverted,
}

impl Polarity {
    /// Classify a sample slice. If the `> 0` rule splits the slice into two
    /// classes the data is positive, otherwise it is assumed inverted.
    pub fn detect(sample: &Array2<u8>) -> Self {
        let mut any_fg = false;
        let mut any_bg = false;
        for &v in sample.iter() {
            if v > BACKGROUND_LOW {
                any_fg = true;
            } else {
                any_bg = true;
            }
            if any_fg && any_bg {
                return Self::Positive;
            }
        }
        Self::Inverted
    }

    #[inline]
    pub fn is_foreground(self, value: u8) -> bool {
        match self {
            Self::Positive => value > BACKGROUND_LOW,
            Self::Inverted => value < BACKGROUND_HIGH,
        }
    }
}

impl std::fmt::Display for Polarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Positive => write!(f, "Positive (background 0)"),
            Self::Inverted => write!(f, "Inverted (background 255)"),
        }
    }
}

/// Axis-aligned box in frame coordinates. `row_max` and `col_max` are
/// exclusive, so the box covers `[row_min, row_max) x [col_min, col_max)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub row_min: usize,
    pub row_max: usize,
    pub col_min: usize,
    pub col_max: usize,
}

impl Bounds {
    pub fn new(row_min: usize, row_max: usize, col_min: usize, col_max: usize) -> Self {
        Self {
            row_min,
            row_max,
            col_min,
            col_max,
        }
    }

    /// Bounding box of the true pixels of a mask, or `None` if there are none.
    pub fn of_mask(mask: &Array2<bool>) -> Option<Self> {
        let mut bounds: Option<Self> = None;
        for ((row, col), &v) in mask.indexed_iter() {
            if !v {
                continue;
            }
            let cell = Self::new(row, row + 1, col, col + 1);
            bounds = Some(match bounds {
                Some(b) => b.union(&cell),
                None => cell,
            });
        }
        bounds
    }

    pub fn height(&self) -> usize {
        self.row_max.saturating_sub(self.row_min)
    }

    pub fn width(&self) -> usize {
        self.col_max.saturating_sub(self.col_min)
    }

    pub fn is_empty(&self) -> bool {
        self.height() == 0 || self.width() == 0
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            row_min: self.row_min.min(other.row_min),
            row_max: self.row_max.max(other.row_max),
            col_min: self.col_min.min(other.col_min),
            col_max: self.col_max.max(other.col_max),
        }
    }

    /// Grow by `padding` on every side, clipped to a `height` x `width` frame.
    pub fn padded(&self, padding: usize, height: usize, width: usize) -> Self {
        Self {
            row_min: self.row_min.saturating_sub(padding),
            row_max: self.row_max.saturating_add(padding).min(height),
            col_min: self.col_min.saturating_sub(padding),
            col_max: self.col_max.saturating_add(padding).min(width),
        }
    }
}

impl std::fmt::Display for Bounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "rows {}..{}, cols {}..{} ({}x{})",
            self.row_min,
            self.row_max,
            self.col_min,
            self.col_max,
            self.width(),
            self.height()
        )
    }
}

/// Sub-pixel translation, in pixels along rows (`dy`) and columns (`dx`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Translation {
    pub dy: f64,
    pub dx: f64,
}

impl Translation {
    pub const ZERO: Self = Self { dy: 0.0, dx: 0.0 };

    pub fn new(dy: f64, dx: f64) -> Self {
        Self { dy, dx }
    }

    /// Nearest whole-pixel translation.
    pub fn rounded(&self) -> (i64, i64) {
        (self.dy.round() as i64, self.dx.round() as i64)
    }
}

impl Add for Translation {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            dy: self.dy + rhs.dy,
            dx: self.dx + rhs.dx,
        }
    }
}

impl AddAssign for Translation {
    fn add_assign(&mut self, rhs: Self) {
        self.dy += rhs.dy;
        self.dx += rhs.dx;
    }
}
