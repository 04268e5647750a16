use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FibregError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read {}: {source}", path.display())]
    ImageRead {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to write {}: {source}", path.display())]
    ImageWrite {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Directory not found: {}", path.display())]
    DirectoryNotFound { path: PathBuf },

    #[error("Invalid slice range: end ({end}) must be greater than start ({start})")]
    InvalidRange { start: usize, end: usize },

    #[error("No foreground pixels in {}", path.display())]
    EmptyForeground { path: PathBuf },

    #[error(
        "Overlap mask exhausted while searching the inner rectangle of {} / {}",
        reference.display(),
        moving.display()
    )]
    MaskExhausted { reference: PathBuf, moving: PathBuf },

    #[error(
        "Frame {} is {}x{}, expected {}x{}",
        path.display(),
        found.1,
        found.0,
        expected.1,
        expected.0
    )]
    DimensionMismatch {
        path: PathBuf,
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("Empty slice sequence")]
    EmptySequence,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Worker pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Experiment #{index}: {source}")]
    Experiment {
        index: usize,
        #[source]
        source: Box<FibregError>,
    },
}

impl FibregError {
    /// Wrap an error with the (1-based) experiment it belongs to.
    pub fn in_experiment(self, index: usize) -> Self {
        Self::Experiment {
            index,
            source: Box::new(self),
        }
    }
}

pub type Result<T> = std::result::Result<T, FibregError>;
