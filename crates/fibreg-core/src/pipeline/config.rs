use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_CROP_PADDING, DEFAULT_EXTENSION, DEFAULT_MASK_CROP_STEP, DEFAULT_MEAN_SMOOTHING,
    DEFAULT_UPSAMPLE_FACTOR,
};
use crate::error::{FibregError, Result};
use crate::parallel::WorkerPool;

/// Which pass a batch runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    Preprocessing,
    Registration,
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Preprocessing => write!(f, "Preprocessing"),
            Self::Registration => write!(f, "Registration"),
        }
    }
}

/// One stack to process.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub load_path: PathBuf,
    pub save_path: PathBuf,
    /// First slice index to keep.
    #[serde(default)]
    pub crop_start: usize,
    /// One past the last slice index to keep; `None` runs to the end.
    #[serde(default)]
    pub crop_end: Option<usize>,
}

impl ExperimentConfig {
    pub fn new(load_path: impl Into<PathBuf>, save_path: impl Into<PathBuf>) -> Self {
        Self {
            load_path: load_path.into(),
            save_path: save_path.into(),
            crop_start: 0,
            crop_end: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessingConfig {
    pub crop: bool,
    pub normalize: bool,
    pub invert: bool,
    /// Pixels added around the detected content bounds.
    pub padding: usize,
    /// Gaussian sigma of the mean-curve smoothing.
    pub mean_smoothing: u32,
}

impl PreprocessingConfig {
    pub fn any_step(&self) -> bool {
        self.crop || self.normalize || self.invert
    }
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            crop: false,
            normalize: false,
            invert: false,
            padding: DEFAULT_CROP_PADDING,
            mean_smoothing: DEFAULT_MEAN_SMOOTHING,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationConfig {
    /// Translations are resolved to `1 / upsample_factor` pixels.
    pub upsample_factor: u32,
    /// Erosion step of the inner rectangle search, in pixels.
    pub mask_crop_step: usize,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            upsample_factor: DEFAULT_UPSAMPLE_FACTOR,
            mask_crop_step: DEFAULT_MASK_CROP_STEP,
        }
    }
}

/// Full parameter record of a batch run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    pub task: Task,
    /// Slice file extension.
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Maximum worker threads; `None` uses every available core.
    #[serde(default)]
    pub workers: Option<usize>,
    pub experiments: Vec<ExperimentConfig>,
    #[serde(default)]
    pub preprocessing: PreprocessingConfig,
    #[serde(default)]
    pub registration: RegistrationConfig,
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

impl BatchConfig {
    pub fn new(task: Task, experiments: Vec<ExperimentConfig>) -> Self {
        Self {
            task,
            extension: default_extension(),
            workers: None,
            experiments,
            preprocessing: PreprocessingConfig::default(),
            registration: RegistrationConfig::default(),
        }
    }

    pub fn worker_pool(&self) -> WorkerPool {
        match self.workers {
            Some(n) => WorkerPool::new(n),
            None => WorkerPool::from_available_parallelism(),
        }
    }

    /// Check the record before any slice is touched.
    ///
    /// Per-experiment problems are wrapped in [`FibregError::Experiment`]
    /// with the 1-based experiment index.
    pub fn validate(&self) -> Result<()> {
        if self.experiments.is_empty() {
            return Err(FibregError::InvalidConfig(
                "at least one experiment is required".into(),
            ));
        }
        if self.task == Task::Preprocessing && !self.preprocessing.any_step() {
            return Err(FibregError::InvalidConfig(
                "select at least one preprocessing step (crop, normalize, invert)".into(),
            ));
        }
        if self.preprocessing.mean_smoothing < 1 {
            return Err(FibregError::InvalidConfig(
                "mean_smoothing must be at least 1".into(),
            ));
        }
        if self.registration.upsample_factor < 1 {
            return Err(FibregError::InvalidConfig(
                "upsample_factor must be at least 1".into(),
            ));
        }
        if self.registration.mask_crop_step < 1 {
            return Err(FibregError::InvalidConfig(
                "mask_crop_step must be at least 1".into(),
            ));
        }
        if self.workers == Some(0) {
            return Err(FibregError::InvalidConfig(
                "workers must be at least 1".into(),
            ));
        }
        if self.extension.trim_start_matches('.').is_empty() {
            return Err(FibregError::InvalidConfig("extension is empty".into()));
        }

        for (i, exp) in self.experiments.iter().enumerate() {
            validate_experiment(exp).map_err(|e| e.in_experiment(i + 1))?;
        }
        Ok(())
    }
}

fn validate_experiment(exp: &ExperimentConfig) -> Result<()> {
    if !exp.load_path.is_dir() {
        return Err(FibregError::DirectoryNotFound {
            path: exp.load_path.clone(),
        });
    }
    if exp.save_path.as_os_str().is_empty() {
        return Err(FibregError::InvalidConfig("save path is empty".into()));
    }
    if let Some(end) = exp.crop_end {
        if end <= exp.crop_start {
            return Err(FibregError::InvalidRange {
                start: exp.crop_start,
                end,
            });
        }
    }
    Ok(())
}
