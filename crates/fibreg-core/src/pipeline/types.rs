use std::time::Duration;

use crate::frame::{Bounds, Polarity, Translation};

/// Pipeline processing stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    DetectingBounds,
    Cropping,
    ProfilingMeans,
    Normalizing,
    Inverting,
    EstimatingTranslation,
    Registering,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DetectingBounds => write!(f, "Detecting bounds"),
            Self::Cropping => write!(f, "Cropping"),
            Self::ProfilingMeans => write!(f, "Profiling means"),
            Self::Normalizing => write!(f, "Normalizing"),
            Self::Inverting => write!(f, "Inverting"),
            Self::EstimatingTranslation => write!(f, "Estimating drift"),
            Self::Registering => write!(f, "Registering"),
        }
    }
}

/// Thread-safe progress reporting for the pipeline.
///
/// Implementors can use this to drive progress bars, logging, or any other
/// UI feedback. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// An experiment of the batch has started (1-based index).
    fn begin_experiment(&self, _index: usize, _total: usize) {}

    /// A new pipeline stage has started. `total_items` is the number of
    /// work items in this stage (e.g., frame count), if known.
    fn begin_stage(&self, _stage: PipelineStage, _total_items: Option<usize>) {}

    /// One work item within the current stage has completed.
    fn advance(&self, _items_done: usize) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}
}

/// Reporter that ignores every event.
pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}

/// Outcome of one experiment of a batch.
#[derive(Clone, Debug, Default)]
pub struct ExperimentReport {
    /// 1-based experiment index.
    pub index: usize,
    pub frames: usize,
    pub elapsed: Duration,
    pub polarity: Option<Polarity>,
    /// Crop box, when the crop step ran.
    pub bounds: Option<Bounds>,
    /// Cumulative drift, when registration ran.
    pub translations: Option<Vec<Translation>>,
}
