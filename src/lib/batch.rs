use crate::progress::{self, ProgressMessage};
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Worker count used when none is configured
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Number of batches needed for `len` files
pub fn batch_count(len: usize, batch_size: usize) -> usize {
    len.div_ceil(batch_size)
}

/// Runs per-file work in fixed-size batches on one bounded thread pool.
///
/// The pool is built once and reused for every batch. A batch is only
/// submitted after every task of the previous batch has returned.
pub struct BatchScheduler {
    pool: rayon::ThreadPool,
    batch_size: usize,
}

impl BatchScheduler {
    pub fn new(batch_size: usize, workers: Option<usize>) -> Result<Self> {
        anyhow::ensure!(batch_size > 0, "Batch size must be a positive integer");
        let workers = workers.unwrap_or_else(default_workers);
        anyhow::ensure!(workers > 0, "Worker count must be a positive integer");

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("mfsort-worker-{}", i))
            .build()
            .context("Failed to build worker pool")?;

        Ok(Self { pool, batch_size })
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Apply `task` to every file and return the results in input order
    pub fn run<T, F>(&self, files: &[PathBuf], task: F) -> Vec<T>
    where
        F: Fn(&Path) -> T + Sync,
        T: Send,
    {
        let total = batch_count(files.len(), self.batch_size);
        let mut results = Vec::with_capacity(files.len());

        for (index, batch) in files.chunks(self.batch_size).enumerate() {
            progress::report(ProgressMessage::BatchStarted {
                index: index + 1,
                total,
                size: batch.len(),
            });

            let batch_results: Vec<T> = self
                .pool
                .install(|| batch.par_iter().map(|path| task(path.as_path())).collect());
            results.extend(batch_results);
        }

        results
    }
}
