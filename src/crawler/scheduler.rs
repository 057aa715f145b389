//! Fixed-size worker pool draining a shared FIFO task queue
//!
//! This module handles:
//! - Spawning a fixed number of worker threads
//! - Handing queued jobs to idle workers in submission order
//! - Isolating job failures and panics from the worker loop
//! - Detecting quiescence (empty queue, every worker idle)
//! - Cooperative shutdown once quiescence is confirmed

use crate::CrawldexError;
use std::collections::VecDeque;
use std::io;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

/// A unit of work run once by a pool worker
pub type Job = Box<dyn FnOnce() -> Result<(), CrawldexError> + Send + 'static>;

struct QueueState {
    jobs: VecDeque<Job>,
    /// Worker threads actually running
    workers: usize,
    /// Workers currently blocked waiting for a job
    idle: usize,
    shutdown: bool,
}

impl QueueState {
    fn is_quiescent(&self) -> bool {
        self.jobs.is_empty() && self.idle == self.workers
    }
}

struct Shared {
    state: Mutex<QueueState>,
    /// Signalled when a job is queued or shutdown begins
    available: Condvar,
    /// Signalled whenever a worker goes idle
    settled: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// WorkQueue runs submitted jobs on a fixed pool of threads
///
/// All queue state lives under one mutex. Workers count themselves idle while
/// waiting for work, which lets a supervisor observe quiescence under the same
/// lock that guards the queue.
pub struct WorkQueue {
    shared: Arc<Shared>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkQueue {
    /// Creates a new pool and starts its worker threads
    ///
    /// # Arguments
    ///
    /// * `workers` - Number of worker threads (at least one)
    pub fn new(workers: usize) -> Self {
        Self::with_spawner(workers, |id, shared| {
            thread::Builder::new()
                .name(format!("crawl-worker-{}", id))
                .spawn(move || worker_loop(id, &shared))
        })
    }

    /// Starts the pool through `spawn`, counting only the threads it started
    ///
    /// A pool that starts no thread at all is created already stopped, so
    /// every submit is rejected instead of queueing work nobody will run.
    fn with_spawner<S>(workers: usize, spawn: S) -> Self
    where
        S: Fn(usize, Arc<Shared>) -> io::Result<JoinHandle<()>>,
    {
        let requested = workers.max(1);
        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState {
                jobs: VecDeque::new(),
                workers: requested,
                idle: 0,
                shutdown: false,
            }),
            available: Condvar::new(),
            settled: Condvar::new(),
        });

        let handles: Vec<JoinHandle<()>> = (0..requested)
            .filter_map(|id| match spawn(id, Arc::clone(&shared)) {
                Ok(handle) => Some(handle),
                Err(e) => {
                    tracing::error!("Failed to spawn worker thread {}: {}", id, e);
                    None
                }
            })
            .collect();

        {
            let mut state = shared.lock();
            state.workers = handles.len();
            if handles.is_empty() {
                tracing::error!("No worker thread could be started");
                state.shutdown = true;
            } else if handles.len() < requested {
                tracing::warn!("Running with {} of {} workers", handles.len(), requested);
            }
            shared.settled.notify_all();
        }

        Self {
            shared,
            handles: Mutex::new(handles),
        }
    }

    /// Appends a job to the tail of the queue and wakes one waiting worker
    ///
    /// Fails with [`CrawldexError::ShuttingDown`] once the pool has been
    /// stopped; the job is dropped without running.
    pub fn submit<F>(&self, job: F) -> Result<(), CrawldexError>
    where
        F: FnOnce() -> Result<(), CrawldexError> + Send + 'static,
    {
        let mut state = self.shared.lock();
        if state.shutdown {
            return Err(CrawldexError::ShuttingDown);
        }
        state.jobs.push_back(Box::new(job));
        self.shared.available.notify_one();
        Ok(())
    }

    /// Returns true once the pool no longer accepts jobs
    pub fn is_stopped(&self) -> bool {
        self.shared.lock().shutdown
    }

    /// Returns true if no job is queued and every worker is waiting for work
    pub fn is_quiescent(&self) -> bool {
        self.shared.lock().is_quiescent()
    }

    /// Blocks until the pool is quiescent
    pub fn await_quiescence(&self) {
        let mut state = self.shared.lock();
        while !state.is_quiescent() {
            state = self
                .shared
                .settled
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        tracing::debug!("Work queue is quiescent");
    }

    /// Number of jobs waiting in the queue
    pub fn pending(&self) -> usize {
        self.shared.lock().jobs.len()
    }

    /// Number of worker threads running in the pool
    pub fn workers(&self) -> usize {
        self.shared.lock().workers
    }

    /// Stops every worker and waits for the threads to exit
    ///
    /// Callers must confirm quiescence first: jobs still queued when workers
    /// wake are dropped, and later submits are rejected.
    pub fn stop_workers(&self) {
        {
            let mut state = self.shared.lock();
            if !state.is_quiescent() {
                tracing::warn!(
                    "Stopping workers before quiescence ({} jobs queued)",
                    state.jobs.len()
                );
            }
            state.shutdown = true;
            self.shared.available.notify_all();
        }

        let handles: Vec<_> = self
            .handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        for handle in handles {
            if handle.join().is_err() {
                tracing::error!("Worker thread exited abnormally");
            }
        }
        tracing::debug!("All workers stopped");
    }
}

fn worker_loop(id: usize, shared: &Shared) {
    loop {
        let job = {
            let mut state = shared.lock();
            loop {
                if state.shutdown {
                    tracing::trace!("crawl-worker-{} exiting", id);
                    return;
                }
                if let Some(job) = state.jobs.pop_front() {
                    tracing::trace!("crawl-worker-{} taking job from queue", id);
                    break job;
                }

                state.idle += 1;
                shared.settled.notify_all();
                state = shared
                    .available
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner);
                state.idle -= 1;
            }
        };

        match catch_unwind(AssertUnwindSafe(job)) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!("Crawl task failed: {}", e),
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                tracing::error!("{}", CrawldexError::TaskPanicked(message));
            }
        }
    }
}
