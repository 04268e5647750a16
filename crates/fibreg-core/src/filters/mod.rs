pub mod gaussian;

pub use gaussian::gaussian_smooth_1d;
