//! Job execution facility backed by a rayon thread pool.

use std::sync::Arc;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::util::{Error, Result};

/// One independent unit of work.
///
/// Returns `false` to report failure. Jobs never share mutable state.
pub trait Job: Send {
    fn run(&mut self) -> bool;
}

/// Runs batches of jobs concurrently.
pub trait JobRunner: Send + Sync {
    /// Run every job exactly once and return one outcome per job, in the
    /// order the jobs were given. Returns only after every job finished.
    fn run_parallel(&self, jobs: &mut [&mut dyn Job]) -> Vec<bool>;
}

/// Thread pool configuration.
#[derive(Clone, Debug)]
pub struct JobPoolConfig {
    /// Worker count; 0 lets rayon pick one per logical CPU.
    pub num_threads: usize,
    /// Prefix for worker thread names.
    pub thread_name_prefix: String,
}

impl Default for JobPoolConfig {
    fn default() -> Self {
        Self {
            num_threads: 0,
            thread_name_prefix: "meshstream-worker".to_string(),
        }
    }
}

impl JobPoolConfig {
    pub fn with_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads;
        self
    }

    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }
}

/// [`JobRunner`] on a dedicated rayon pool.
pub struct RayonJobRunner {
    pool: Arc<ThreadPool>,
}

impl RayonJobRunner {
    /// Build a pool; failure is a [`Error::Resource`] the caller may
    /// recover from by running sequentially.
    pub fn new(config: &JobPoolConfig) -> Result<Self> {
        let prefix = config.thread_name_prefix.clone();
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.num_threads)
            .thread_name(move |i| format!("{prefix}-{i}"))
            .build()
            .map_err(|e| Error::Resource(e.to_string()))?;
        Ok(Self { pool: Arc::new(pool) })
    }

    /// Share an existing pool.
    pub fn from_pool(pool: Arc<ThreadPool>) -> Self {
        Self { pool }
    }

    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl JobRunner for RayonJobRunner {
    fn run_parallel(&self, jobs: &mut [&mut dyn Job]) -> Vec<bool> {
        // `install` blocks until the parallel iterator has joined.
        self.pool
            .install(|| jobs.par_iter_mut().map(|job| job.run()).collect())
    }
}

impl std::fmt::Debug for RayonJobRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RayonJobRunner")
            .field("num_threads", &self.num_threads())
            .finish()
    }
}
