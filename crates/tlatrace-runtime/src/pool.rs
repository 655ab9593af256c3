//! Bounded pool of blocking jobs with completion-order results.
//!
//! Jobs run on the blocking threads of a private multi-thread tokio runtime;
//! a semaphore keeps at most `workers` of them running. The coordinator stays
//! on its own thread, submitting and then polling with a bounded wait.

use crate::Result;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};

/// A job that finished without a value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobError {
    Panicked(String),
    /// Dropped before it started, after [`TaskGroup::cancel_pending`]
    Cancelled,
}

impl fmt::Display for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobError::Panicked(msg) => write!(f, "job panicked: {}", msg),
            JobError::Cancelled => write!(f, "job cancelled"),
        }
    }
}

impl std::error::Error for JobError {}

impl From<JoinError> for JobError {
    fn from(err: JoinError) -> Self {
        if !err.is_panic() {
            return JobError::Cancelled;
        }
        let payload = err.into_panic();
        let msg = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        JobError::Panicked(msg)
    }
}

pub struct TaskGroup<T> {
    runtime: Runtime,
    permits: Arc<Semaphore>,
    jobs: JoinSet<std::result::Result<T, JobError>>,
    workers: usize,
    submitted: u64,
}

impl<T: Send + 'static> TaskGroup<T> {
    pub fn new(workers: usize) -> Result<Self> {
        let workers = workers.max(1);
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(workers)
            .thread_name("tlatrace-worker")
            .enable_time()
            .build()?;
        Ok(Self {
            runtime,
            permits: Arc::new(Semaphore::new(workers)),
            jobs: JoinSet::new(),
            workers,
            submitted: 0,
        })
    }

    pub fn submit<F>(&mut self, job: F)
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let permits = Arc::clone(&self.permits);
        self.jobs.spawn_on(
            async move {
                let Ok(_permit) = permits.acquire_owned().await else {
                    return Err(JobError::Cancelled);
                };
                tokio::task::spawn_blocking(job)
                    .await
                    .map_err(JobError::from)
            },
            self.runtime.handle(),
        );
        self.submitted += 1;
    }

    /// Wait up to `wait` for any job to finish.
    ///
    /// `None` means nothing finished in time, or nothing is in flight.
    pub fn next_completed(&mut self, wait: Duration) -> Option<std::result::Result<T, JobError>> {
        if self.jobs.is_empty() {
            return None;
        }
        let jobs = &mut self.jobs;
        let joined = self
            .runtime
            .block_on(async move { tokio::time::timeout(wait, jobs.join_next()).await })
            .ok()??;
        Some(joined.unwrap_or_else(|err| Err(JobError::from(err))))
    }

    /// Jobs still waiting for a permit come back as [`JobError::Cancelled`];
    /// running jobs finish normally.
    pub fn cancel_pending(&mut self) {
        self.permits.close();
    }

    pub fn in_flight(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn submitted(&self) -> u64 {
        self.submitted
    }

    pub fn workers(&self) -> usize {
        self.workers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    fn drain<T: Send + 'static>(group: &mut TaskGroup<T>) -> Vec<std::result::Result<T, JobError>> {
        let deadline = Instant::now() + Duration::from_secs(30);
        let mut out = Vec::new();
        while !group.is_empty() && Instant::now() < deadline {
            if let Some(result) = group.next_completed(Duration::from_millis(50)) {
                out.push(result);
            }
        }
        out
    }

    #[test]
    fn test_all_results_arrive() -> Result<()> {
        let mut group = TaskGroup::new(4)?;
        for i in 0..20u64 {
            group.submit(move || i * 2);
        }
        assert_eq!(group.submitted(), 20);

        let mut results: Vec<u64> = drain(&mut group).into_iter().map(|r| r.unwrap()).collect();
        results.sort();
        assert_eq!(results, (0..20).map(|i| i * 2).collect::<Vec<_>>());
        Ok(())
    }

    #[test]
    fn test_concurrency_is_bounded() -> Result<()> {
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let mut group = TaskGroup::new(2)?;
        for _ in 0..8 {
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            group.submit(move || {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(20));
                running.fetch_sub(1, Ordering::SeqCst);
            });
        }
        let results = drain(&mut group);
        assert_eq!(results.len(), 8);
        assert!(peak.load(Ordering::SeqCst) <= 2);
        Ok(())
    }

    #[test]
    fn test_panic_is_reported_not_propagated() -> Result<()> {
        let mut group = TaskGroup::new(1)?;
        group.submit(|| -> u32 { panic!("bad trace") });
        group.submit(|| 7);

        let results = drain(&mut group);
        assert_eq!(results.len(), 2);
        assert!(results.contains(&Ok(7)));
        assert!(results.contains(&Err(JobError::Panicked("bad trace".to_string()))));
        Ok(())
    }

    #[test]
    fn test_timeout_returns_none() -> Result<()> {
        let mut group = TaskGroup::new(1)?;
        assert!(group.next_completed(Duration::from_millis(1)).is_none());
        group.submit(|| std::thread::sleep(Duration::from_millis(300)));
        assert!(group.next_completed(Duration::from_millis(1)).is_none());
        assert_eq!(group.in_flight(), 1);
        drain(&mut group);
        Ok(())
    }

    #[test]
    fn test_cancel_pending_skips_queued_jobs() -> Result<()> {
        let ran = Arc::new(AtomicUsize::new(0));
        let mut group = TaskGroup::new(1)?;
        for _ in 0..5 {
            let ran = Arc::clone(&ran);
            group.submit(move || {
                std::thread::sleep(Duration::from_millis(100));
                ran.fetch_add(1, Ordering::SeqCst);
            });
        }
        std::thread::sleep(Duration::from_millis(20));
        group.cancel_pending();

        let results = drain(&mut group);
        assert_eq!(results.len(), 5);
        let cancelled = results.iter().filter(|r| **r == Err(JobError::Cancelled)).count();
        assert!(cancelled >= 3);
        assert_eq!(ran.load(Ordering::SeqCst), 5 - cancelled);
        Ok(())
    }
}
