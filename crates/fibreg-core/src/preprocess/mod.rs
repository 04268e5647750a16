//! Crop, intensity normalization and polarity inversion of slice stacks.

pub mod bounds;
pub mod crop;
pub mod invert;
pub mod normalize;

pub use bounds::{classify_polarity, detect_bounds, detect_bounds_with, foreground_extent};
pub use crop::{crop_frame, crop_sequence};
pub use invert::{invert_frame, invert_sequence};
pub use normalize::{foreground_mean, normalize_frame, normalize_sequence, profile_means};
