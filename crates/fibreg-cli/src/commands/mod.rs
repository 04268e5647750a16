pub mod config;
pub mod info;
pub mod pipeline;
pub mod preprocess;
pub mod register;

use clap::Args;

/// Slice selection shared by the single-experiment commands.
#[derive(Args)]
pub struct RangeArgs {
    /// First slice index to process
    #[arg(long, default_value = "0")]
    pub start: usize,

    /// One past the last slice index to process
    #[arg(long)]
    pub end: Option<usize>,

    /// Slice file extension
    #[arg(long, default_value = "tif")]
    pub extension: String,
}
