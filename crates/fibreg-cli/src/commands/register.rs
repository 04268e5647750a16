use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use fibreg_core::consts::{DEFAULT_MASK_CROP_STEP, DEFAULT_UPSAMPLE_FACTOR};
use fibreg_core::pipeline::config::{BatchConfig, ExperimentConfig, RegistrationConfig, Task};

use super::pipeline::execute;
use super::RangeArgs;

#[derive(Args)]
pub struct RegisterArgs {
    /// Directory with the input slices
    pub load: PathBuf,

    /// Directory for the registered slices
    pub save: PathBuf,

    /// Sub-pixel precision as 1/N pixel
    #[arg(long, default_value_t = DEFAULT_UPSAMPLE_FACTOR)]
    pub upsample: u32,

    /// Erosion step of the overlap-window search, in pixels
    #[arg(long, default_value_t = DEFAULT_MASK_CROP_STEP)]
    pub mask_step: usize,

    #[command(flatten)]
    pub range: RangeArgs,
}

pub fn run(args: &RegisterArgs, workers: Option<usize>) -> Result<()> {
    let mut experiment = ExperimentConfig::new(&args.load, &args.save);
    experiment.crop_start = args.range.start;
    experiment.crop_end = args.range.end;

    let mut config = BatchConfig::new(Task::Registration, vec![experiment]);
    config.extension = args.range.extension.clone();
    config.workers = workers;
    config.registration = RegistrationConfig {
        upsample_factor: args.upsample,
        mask_crop_step: args.mask_step,
    };

    execute(&config)
}
