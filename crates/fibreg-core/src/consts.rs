/// Default padding (pixels per side) added around the detected content bounds.
pub const DEFAULT_CROP_PADDING: usize = 50;

/// Default Gaussian sigma applied to the per-slice mean curve.
pub const DEFAULT_MEAN_SMOOTHING: u32 = 5;

/// Default sub-pixel upsampling factor for phase correlation.
/// 10 gives ~0.1 px accuracy; 100 gives ~0.01 px accuracy.
pub const DEFAULT_UPSAMPLE_FACTOR: u32 = 100;

/// Default erosion step (pixels) for the inner rectangle search.
pub const DEFAULT_MASK_CROP_STEP: usize = 50;

/// Default slice file extension.
pub const DEFAULT_EXTENSION: &str = "tif";

/// Background value for positive-polarity data.
pub const BACKGROUND_LOW: u8 = 0;

/// Background value for inverted-polarity data, and the fill value for
/// regions exposed by registration.
pub const BACKGROUND_HIGH: u8 = 255;

/// Gaussian kernels are truncated at this many standard deviations.
pub const GAUSSIAN_TRUNCATE: f64 = 4.0;

/// Side of the upsampled DFT search region, in original pixels.
pub const UPSAMPLED_REGION_PIXELS: f64 = 1.5;

/// Free parameter of the Keys cubic convolution kernel.
pub const CUBIC_A: f64 = -0.5;

/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Correlation peaks within this relative distance of the maximum are
/// treated as ties.
pub const PEAK_TIE_TOLERANCE: f64 = 1e-9;
