pub mod config;
mod orchestrator;
mod types;

pub use orchestrator::{run_batch, run_experiment, run_preprocessing, run_registration};
pub use types::{ExperimentReport, NoOpReporter, PipelineStage, ProgressReporter};
