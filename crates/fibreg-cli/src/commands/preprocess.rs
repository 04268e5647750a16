use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use fibreg_core::consts::{DEFAULT_CROP_PADDING, DEFAULT_MEAN_SMOOTHING};
use fibreg_core::pipeline::config::{BatchConfig, ExperimentConfig, PreprocessingConfig, Task};

use super::pipeline::execute;
use super::RangeArgs;

#[derive(Args)]
pub struct PreprocessArgs {
    /// Directory with the input slices
    pub load: PathBuf,

    /// Directory for the processed slices
    pub save: PathBuf,

    /// Crop every slice to the shared content bounds
    #[arg(long)]
    pub crop: bool,

    /// Equalize mean intensity along the stack
    #[arg(long)]
    pub normalize: bool,

    /// Invert 8-bit intensities
    #[arg(long)]
    pub invert: bool,

    /// Pixels kept around the detected content bounds
    #[arg(long, default_value_t = DEFAULT_CROP_PADDING)]
    pub padding: usize,

    /// Gaussian sigma for smoothing the mean-intensity curve
    #[arg(long, default_value_t = DEFAULT_MEAN_SMOOTHING)]
    pub smoothing: u32,

    #[command(flatten)]
    pub range: RangeArgs,
}

pub fn run(args: &PreprocessArgs, workers: Option<usize>) -> Result<()> {
    let mut experiment = ExperimentConfig::new(&args.load, &args.save);
    experiment.crop_start = args.range.start;
    experiment.crop_end = args.range.end;

    let mut config = BatchConfig::new(Task::Preprocessing, vec![experiment]);
    config.extension = args.range.extension.clone();
    config.workers = workers;
    config.preprocessing = PreprocessingConfig {
        crop: args.crop,
        normalize: args.normalize,
        invert: args.invert,
        padding: args.padding,
        mean_smoothing: args.smoothing,
    };

    execute(&config)
}
