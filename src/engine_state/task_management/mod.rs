//! # Task Management System
//!
//! A fixed pool of worker threads fed by a [`ConcurrentQueue`] of jobs. Every
//! completed job is pushed onto a second queue which the owner drains without
//! blocking, typically once per frame.
//!
//! ## Job Lifecycle
//! 1. The owner calls [`WorkerPool::submit`]
//! 2. A worker pops the job with `wait_and_pop` and runs the work closure on it
//! 3. The result lands on the result queue
//! 4. The owner picks it up with [`WorkerPool::try_recv`]
//!
//! A job that has been popped always runs to completion. Shutdown stops the job
//! queue, which wakes every idle worker; workers exit once the queue is drained.
//!
//! ## Example Usage
//! ```rust,ignore
//! let mut pool = WorkerPool::spawn("square-worker", 4, |n: u64| n * n)?;
//! pool.submit(7);
//! // Later, on the owning thread:
//! while let Some(result) = pool.try_recv() {
//!     println!("{result}");
//! }
//! pool.shutdown();
//! ```

mod queue;

pub use queue::ConcurrentQueue;

use std::{
    panic,
    sync::Arc,
    thread::{self, JoinHandle},
};

use log::{error, info, trace};

use crate::engine_state::error::WorldError;

/// Worker count used when the platform cannot report its parallelism.
pub const FALLBACK_WORKER_COUNT: usize = 1;

/// Number of workers to spawn by default: one per available core.
pub fn default_worker_count() -> usize {
    let parallelism = thread::available_parallelism();
    info!("Available parallelism: {:?}", parallelism);
    parallelism.map_or(FALLBACK_WORKER_COUNT, |n| n.get())
}

/// A pool of named OS threads turning jobs `J` into results `R`.
#[derive(Debug)]
pub struct WorkerPool<J, R> {
    requests: Arc<ConcurrentQueue<J>>,
    results: Arc<ConcurrentQueue<R>>,
    workers: Vec<JoinHandle<()>>,
}

impl<J, R> WorkerPool<J, R>
where
    J: Send + 'static,
    R: Send + 'static,
{
    /// Spawns `count` workers (at least one) named `{name}-{index}` that each run
    /// `work` on every job they pop.
    ///
    /// If a thread fails to spawn, the workers already started are stopped and
    /// joined before the error is returned.
    pub fn spawn<F>(name: &str, count: usize, work: F) -> Result<Self, WorldError>
    where
        F: Fn(J) -> R + Send + Sync + 'static,
    {
        let count = count.max(1);
        let work = Arc::new(work);

        let mut pool = WorkerPool {
            requests: Arc::new(ConcurrentQueue::new()),
            results: Arc::new(ConcurrentQueue::new()),
            workers: Vec::with_capacity(count),
        };

        for index in 0..count {
            let requests = Arc::clone(&pool.requests);
            let results = Arc::clone(&pool.results);
            let work = Arc::clone(&work);

            let spawned = thread::Builder::new()
                .name(format!("{name}-{index}"))
                .spawn(move || {
                    trace!("Worker started");
                    while let Some(job) = requests.wait_and_pop() {
                        results.push(work(job));
                    }
                    trace!("Worker exiting");
                });

            match spawned {
                Ok(handle) => pool.workers.push(handle),
                Err(err) => {
                    error!("Failed to spawn {name}-{index}: {err}");
                    pool.shutdown();
                    return Err(WorldError::WorkerSpawn(err));
                }
            }
        }

        info!("Started {} {name} threads", pool.workers.len());
        Ok(pool)
    }

    /// Queues a job for the next free worker.
    pub fn submit(&self, job: J) {
        self.requests.push(job);
    }

    /// Takes one finished result, if any, without blocking.
    pub fn try_recv(&self) -> Option<R> {
        self.results.try_pop()
    }

    /// Jobs not yet picked up by a worker.
    pub fn pending_jobs(&self) -> usize {
        self.requests.len()
    }

    /// Finished results not yet received.
    pub fn pending_results(&self) -> usize {
        self.results.len()
    }

    /// Number of live worker threads.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Whether workers are still accepting jobs, i.e. `shutdown` has not run.
    pub fn is_running(&self) -> bool {
        !self.workers.is_empty()
    }

    /// Stops the job queue and joins every worker. Idempotent.
    ///
    /// Jobs still queued are finished before the workers exit. A worker that
    /// panicked has its panic re-raised here, unless this thread is already
    /// unwinding, in which case it is only logged.
    pub fn shutdown(&mut self) {
        if self.workers.is_empty() {
            return;
        }

        self.requests.stop();

        let mut first_panic = None;
        for handle in self.workers.drain(..) {
            let name = handle.thread().name().unwrap_or("worker").to_owned();
            if let Err(payload) = handle.join() {
                error!("{name} panicked");
                first_panic.get_or_insert(payload);
            }
        }

        info!("Worker pool shut down");

        if let Some(payload) = first_panic {
            if !thread::panicking() {
                panic::resume_unwind(payload);
            }
        }
    }
}

impl<J, R> Drop for WorkerPool<J, R> {
    fn drop(&mut self) {
        if self.workers.is_empty() {
            return;
        }

        self.requests.stop();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                error!("Worker panicked before the pool was dropped");
            }
        }
    }
}
