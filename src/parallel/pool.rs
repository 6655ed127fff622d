//! Rayon thread pool configuration for grid solves.
//!
//! Use [WorkerPool::install] to solve catalog grids with a fixed number of
//! threads, or rely on Rayon's default (all CPU cores).

use rayon::ThreadPoolBuilder;
use tracing::debug;

use crate::error::ChainResult;

/// How many worker threads evaluate independent grid cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerPool {
    /// Number of worker threads. If 0, use the global Rayon pool.
    pub workers: usize,
}

impl WorkerPool {
    pub fn with_workers(n: usize) -> Self {
        Self { workers: n }
    }

    /// Run a closure with this worker count. With [workers](WorkerPool::workers) at 0
    /// the closure runs on the global pool; otherwise a scoped pool is built for it.
    pub fn install<F, R>(&self, f: F) -> ChainResult<R>
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        if self.workers == 0 {
            return Ok(f());
        }
        debug!(workers = self.workers, "building scoped rayon pool");
        let pool = ThreadPoolBuilder::new().num_threads(self.workers).build()?;
        Ok(pool.install(f))
    }
}
