//! Schedules independent per-attribute jobs.
//!
//! With more than one job and a runner available, the batch goes to the
//! runner and all jobs run to completion before the first failure (by job
//! index) is reported. Otherwise jobs run in order on the calling thread and
//! the batch stops at the first failure.

use std::sync::Arc;

use super::runner::{Job, JobPoolConfig, JobRunner, RayonJobRunner};
use crate::core::{noop_profiler, ProfileScope, ProfilerHandle};
use crate::util::{Error, Result};

/// Runs a batch of jobs, in parallel when it can.
#[derive(Clone)]
pub struct AttributeScheduler {
    runner: Option<Arc<dyn JobRunner>>,
    profiler: ProfilerHandle,
}

impl Default for AttributeScheduler {
    fn default() -> Self {
        Self::sequential()
    }
}

impl AttributeScheduler {
    /// Scheduler that always runs on the calling thread.
    pub fn sequential() -> Self {
        Self { runner: None, profiler: noop_profiler() }
    }

    /// Scheduler dispatching to `runner`.
    pub fn with_runner(runner: Arc<dyn JobRunner>) -> Self {
        Self { runner: Some(runner), profiler: noop_profiler() }
    }

    /// Scheduler on a new rayon pool, falling back to sequential execution
    /// when the pool cannot be built.
    pub fn with_pool(config: &JobPoolConfig) -> Self {
        match RayonJobRunner::new(config) {
            Ok(runner) => {
                tracing::debug!(threads = runner.num_threads(), "attribute job pool ready");
                Self::with_runner(Arc::new(runner))
            }
            Err(e) => {
                tracing::warn!(error = %e, "job pool unavailable, attribute jobs run sequentially");
                Self::sequential()
            }
        }
    }

    /// Attach a profiler.
    pub fn with_profiler(mut self, profiler: ProfilerHandle) -> Self {
        self.profiler = profiler;
        self
    }

    #[inline]
    pub fn is_parallel(&self) -> bool {
        self.runner.is_some()
    }

    /// Run every job once.
    ///
    /// Returns `Error::JobFailed` with the lowest failing index. Completion
    /// order never matters to the caller: results stay inside the jobs,
    /// indexed as given.
    pub fn run<J: Job>(&self, jobs: &mut [J]) -> Result<()> {
        let _scope = ProfileScope::new(self.profiler.as_ref(), "AttributeScheduler::run");

        match &self.runner {
            Some(runner) if jobs.len() > 1 => {
                let count = jobs.len();
                let mut refs: Vec<&mut dyn Job> = jobs.iter_mut().map(|j| j as &mut dyn Job).collect();
                let outcomes = runner.run_parallel(&mut refs);
                if outcomes.len() != count {
                    return Err(Error::Resource(format!(
                        "job runner reported {} outcomes for {count} jobs",
                        outcomes.len()
                    )));
                }
                match outcomes.iter().position(|ok| !ok) {
                    Some(index) => {
                        tracing::debug!(index, "attribute job failed");
                        Err(Error::JobFailed { index })
                    }
                    None => Ok(()),
                }
            }
            _ => {
                for (index, job) in jobs.iter_mut().enumerate() {
                    if !job.run() {
                        tracing::debug!(index, "attribute job failed");
                        return Err(Error::JobFailed { index });
                    }
                }
                Ok(())
            }
        }
    }
}

impl std::fmt::Debug for AttributeScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributeScheduler")
            .field("parallel", &self.is_parallel())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    /// Records its index into a shared log when run.
    struct Tracked<'a> {
        index: usize,
        log: &'a Mutex<Vec<usize>>,
        fail: bool,
    }

    impl Job for Tracked<'_> {
        fn run(&mut self) -> bool {
            self.log.lock().push(self.index);
            !self.fail
        }
    }

    /// Runs jobs back to front on the calling thread.
    struct ReverseRunner;

    impl JobRunner for ReverseRunner {
        fn run_parallel(&self, jobs: &mut [&mut dyn Job]) -> Vec<bool> {
            let mut outcomes = vec![false; jobs.len()];
            for i in (0..jobs.len()).rev() {
                outcomes[i] = jobs[i].run();
            }
            outcomes
        }
    }

    struct ShortRunner;

    impl JobRunner for ShortRunner {
        fn run_parallel(&self, _jobs: &mut [&mut dyn Job]) -> Vec<bool> {
            Vec::new()
        }
    }

    fn tracked<'a>(log: &'a Mutex<Vec<usize>>, n: usize, failing: &[usize]) -> Vec<Tracked<'a>> {
        (0..n)
            .map(|index| Tracked { index, log, fail: failing.contains(&index) })
            .collect()
    }

    #[test]
    fn test_sequential_order_and_fail_fast() {
        let log = Mutex::new(Vec::new());
        let mut jobs = tracked(&log, 5, &[2, 3]);
        let err = AttributeScheduler::sequential().run(&mut jobs).unwrap_err();
        assert!(matches!(err, Error::JobFailed { index: 2 }));
        assert_eq!(*log.lock(), vec![0, 1, 2]);
    }

    #[test]
    fn test_parallel_runs_all_and_reports_lowest_failure() {
        let log = Mutex::new(Vec::new());
        let mut jobs = tracked(&log, 5, &[1, 4]);
        let scheduler = AttributeScheduler::with_runner(Arc::new(ReverseRunner));
        let err = scheduler.run(&mut jobs).unwrap_err();
        assert!(matches!(err, Error::JobFailed { index: 1 }));
        assert_eq!(*log.lock(), vec![4, 3, 2, 1, 0]);
    }

    #[test]
    fn test_single_job_skips_runner() {
        let log = Mutex::new(Vec::new());
        let mut jobs = tracked(&log, 1, &[]);
        // ShortRunner would report a contract violation if it were used.
        let scheduler = AttributeScheduler::with_runner(Arc::new(ShortRunner));
        scheduler.run(&mut jobs).unwrap();
        assert_eq!(*log.lock(), vec![0]);
    }

    #[test]
    fn test_runner_contract_violation() {
        let log = Mutex::new(Vec::new());
        let mut jobs = tracked(&log, 3, &[]);
        let scheduler = AttributeScheduler::with_runner(Arc::new(ShortRunner));
        assert!(matches!(scheduler.run(&mut jobs), Err(Error::Resource(_))));
    }

    #[test]
    fn test_pool_each_job_exactly_once() {
        let log = Mutex::new(Vec::new());
        let mut jobs = tracked(&log, 16, &[]);
        let scheduler = AttributeScheduler::with_pool(&JobPoolConfig::default().with_threads(4));
        assert!(scheduler.is_parallel());
        scheduler.run(&mut jobs).unwrap();
        let mut seen = log.lock().clone();
        seen.sort_unstable();
        assert_eq!(seen, (0..16).collect::<Vec<_>>());
    }

    #[test]
    fn test_empty_batch() {
        let mut jobs: Vec<Tracked> = Vec::new();
        AttributeScheduler::with_runner(Arc::new(ShortRunner)).run(&mut jobs).unwrap();
    }
}
