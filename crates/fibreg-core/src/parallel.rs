use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use tracing::debug;

use crate::error::Result;
use crate::pipeline::ProgressReporter;

/// Bounded worker pool shared by every per-file and per-pair stage.
///
/// Each batch runs on a dedicated Rayon pool of
/// `min(max_workers, batch_len)` threads, so short stacks never spin up
/// idle workers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkerPool {
    max_workers: usize,
}

impl WorkerPool {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
        }
    }

    /// Pool sized to the machine's available parallelism.
    pub fn from_available_parallelism() -> Self {
        let cores = std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);
        Self::new(cores)
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Number of threads used for a batch of `batch_len` items.
    pub fn workers_for(&self, batch_len: usize) -> usize {
        self.max_workers.min(batch_len).max(1)
    }

    /// Apply `op` to every item in parallel and collect the results in input
    /// order. `reporter.advance` is called after each item completes.
    ///
    /// All items are processed; if any fail, the first error in input order
    /// is returned.
    pub fn try_map<I, T, F>(
        &self,
        items: &[I],
        reporter: &dyn ProgressReporter,
        op: F,
    ) -> Result<Vec<T>>
    where
        I: Sync,
        T: Send,
        F: Fn(&I) -> Result<T> + Send + Sync,
    {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let workers = self.workers_for(items.len());
        debug!(items = items.len(), workers, "Dispatching batch");
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()?;

        let counter = AtomicUsize::new(0);
        let results: Vec<Result<T>> = pool.install(|| {
            items
                .par_iter()
                .map(|item| {
                    let result = op(item);
                    let done = counter.fetch_add(1, Ordering::Relaxed) + 1;
                    reporter.advance(done);
                    result
                })
                .collect()
        });

        results.into_iter().collect()
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::from_available_parallelism()
    }
}
