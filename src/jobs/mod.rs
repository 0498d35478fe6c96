//! Job System
//!
//! A small pool of worker threads consuming one shared FIFO queue, plus a
//! separate queue of jobs that must run on the main thread (GPU uploads,
//! window calls, anything tied to the main-thread context). The engine
//! drains the main-thread queue once per frame.
//!
//! Every submitted job gets a sequential [`JobId`]. Waiting on an id
//! blocks on a condvar until that job has finished; completion is tracked
//! from the moment of submission, so waiting on a job that is queued but
//! not yet picked up behaves correctly.
//!
//! Jobs are independent: no priorities, no cancellation, no dependencies.
//! The one ordering guarantee is the queue itself; a single worker runs
//! its jobs in submission order.

pub mod queue;

pub use queue::MutexQueue;

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

use log::{info, warn};
use rustc_hash::FxHashSet;

/// Capacity of the worker and main-thread job queues.
///
/// The ring keeps one slot empty, so each queue holds `MAX_JOBS - 1`
/// outstanding jobs.
pub const MAX_JOBS: usize = 256;

/// Upper bound on worker threads regardless of core count.
pub const MAX_WORKERS: usize = 3;

/// Sequential identifier of a submitted job.
pub type JobId = u32;

// ============================================================================
// Errors
// ============================================================================

/// Errors surfaced by job submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobError {
    /// The queue is at capacity; the job was not accepted.
    QueueFull,
}

impl std::fmt::Display for JobError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::QueueFull => write!(f, "job queue is full"),
        }
    }
}

impl std::error::Error for JobError {}

// ============================================================================
// Internals
// ============================================================================

struct Job {
    id: JobId,
    run: Box<dyn FnOnce() + Send + 'static>,
}

type MainThreadJob = Box<dyn FnOnce() + Send + 'static>;

/// Which job ids have finished.
///
/// Ids are issued sequentially, so the set stays tiny: everything below
/// `finished_below` is done, and only out-of-order completions above it
/// are held individually.
#[derive(Default)]
struct Progress {
    finished_below: JobId,
    finished: FxHashSet<JobId>,
}

impl Progress {
    fn mark_done(&mut self, id: JobId) {
        self.finished.insert(id);
        while self.finished.remove(&self.finished_below) {
            self.finished_below += 1;
        }
    }

    fn is_done(&self, id: JobId) -> bool {
        id < self.finished_below || self.finished.contains(&id)
    }
}

struct Shared {
    jobs: MutexQueue<Job>,
    /// Lock for worker sleep. Holds the shutdown flag.
    wake_lock: Mutex<bool>,
    wake: Condvar,
    progress: Mutex<Progress>,
    finished: Condvar,
}

// ============================================================================
// Job system
// ============================================================================

/// Worker pool plus a main-thread job queue.
pub struct JobSystem {
    shared: Arc<Shared>,
    main_jobs: MutexQueue<MainThreadJob>,
    next_id: AtomicU32,
    workers: Vec<JoinHandle<()>>,
}

impl JobSystem {
    /// Start the worker pool.
    ///
    /// Worker count defaults to the machine's available parallelism and is
    /// clamped to `1..=MAX_WORKERS`; `worker_override` replaces the
    /// detected value before clamping.
    #[must_use]
    pub fn new(worker_override: Option<usize>) -> Self {
        let detected = thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);
        let count = worker_override.unwrap_or(detected).clamp(1, MAX_WORKERS);

        let shared = Arc::new(Shared {
            jobs: MutexQueue::new(MAX_JOBS),
            wake_lock: Mutex::new(false),
            wake: Condvar::new(),
            progress: Mutex::new(Progress::default()),
            finished: Condvar::new(),
        });

        info!("job system: starting {count} worker threads");
        let workers = (0..count)
            .map(|i| {
                let shared = Arc::clone(&shared);
                thread::Builder::new()
                    .name(format!("tiny_engine_worker{i}"))
                    .spawn(move || worker_loop(&shared))
                    .expect("failed to spawn worker thread")
            })
            .collect();

        Self {
            shared,
            main_jobs: MutexQueue::new(MAX_JOBS),
            next_id: AtomicU32::new(0),
            workers,
        }
    }

    /// Submit a job to the worker pool.
    ///
    /// Returns the job's id, which can be handed to [`wait`](Self::wait).
    /// A full queue is an error; the id issued for the rejected job is
    /// retired immediately so a stale `wait` on it cannot block.
    pub fn execute(&self, job: impl FnOnce() + Send + 'static) -> Result<JobId, JobError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let job = Job {
            id,
            run: Box::new(job),
        };

        if self.shared.jobs.push_back(job).is_err() {
            warn!("job system: queue full, rejecting job {id}");
            let mut progress = self.shared.progress.lock().unwrap();
            progress.mark_done(id);
            drop(progress);
            self.shared.finished.notify_all();
            return Err(JobError::QueueFull);
        }

        // Notifying under the wake lock pairs with the emptiness re-check
        // in the worker loop; a push cannot slip between that check and
        // the wait.
        let _guard = self.shared.wake_lock.lock().unwrap();
        self.shared.wake.notify_one();
        Ok(id)
    }

    /// Block until the given job has finished.
    ///
    /// Waiting on an id that was never issued logs a warning and returns.
    pub fn wait(&self, id: JobId) {
        if id >= self.next_id.load(Ordering::Relaxed) {
            warn!("job system: wait called on unissued job id {id}");
            return;
        }
        let mut progress = self.shared.progress.lock().unwrap();
        while !progress.is_done(id) {
            progress = self.shared.finished.wait(progress).unwrap();
        }
    }

    /// Whether the given job has finished, without blocking.
    #[must_use]
    pub fn is_finished(&self, id: JobId) -> bool {
        self.shared.progress.lock().unwrap().is_done(id)
    }

    /// Queue a job for the main thread.
    ///
    /// It runs inside the next [`flush_main_thread_jobs`]
    /// (Self::flush_main_thread_jobs) call.
    pub fn execute_on_main(&self, job: impl FnOnce() + Send + 'static) -> Result<(), JobError> {
        if self.main_jobs.push_back(Box::new(job)).is_err() {
            warn!("job system: main-thread queue full, rejecting job");
            return Err(JobError::QueueFull);
        }
        Ok(())
    }

    /// Run every queued main-thread job on the calling thread.
    ///
    /// The queue is swapped out first and the jobs run without holding
    /// it, so a job may queue further main-thread work; that work runs at
    /// the next flush. Returns the number of jobs run.
    pub fn flush_main_thread_jobs(&self) -> usize {
        let jobs = self.main_jobs.drain();
        let count = jobs.len();
        for job in jobs {
            job();
        }
        count
    }

    /// Number of worker threads.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Jobs queued for the worker pool but not yet picked up.
    #[must_use]
    pub fn pending_jobs(&self) -> usize {
        self.shared.jobs.len()
    }

    /// Stop the workers and join them.
    ///
    /// Jobs already in the queue are finished first; only then do idle
    /// workers exit.
    pub fn shutdown(&mut self) {
        {
            let mut stop = self.shared.wake_lock.lock().unwrap();
            *stop = true;
        }
        self.shared.wake.notify_all();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

impl Default for JobSystem {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Drop for JobSystem {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(shared: &Shared) {
    loop {
        if let Some(job) = shared.jobs.pop_front() {
            (job.run)();
            let mut progress = shared.progress.lock().unwrap();
            progress.mark_done(job.id);
            drop(progress);
            shared.finished.notify_all();
            continue;
        }

        let mut stop = shared.wake_lock.lock().unwrap();
        if *stop {
            break;
        }
        // Re-check under the lock; see the note in `execute`.
        if !shared.jobs.is_empty() {
            continue;
        }
        stop = shared.wake.wait(stop).unwrap();
        if *stop {
            break;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::mpsc;

    #[test]
    fn test_jobs_run_and_wait() {
        let jobs = JobSystem::new(Some(2));
        let counter = Arc::new(AtomicUsize::new(0));

        let ids: Vec<JobId> = (0..10)
            .map(|_| {
                let counter = Arc::clone(&counter);
                jobs.execute(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                })
                .unwrap()
            })
            .collect();

        for id in ids {
            jobs.wait(id);
        }
        assert_eq!(counter.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn test_job_ids_are_sequential() {
        let jobs = JobSystem::new(Some(1));

        let a = jobs.execute(|| {}).unwrap();
        let b = jobs.execute(|| {}).unwrap();
        let c = jobs.execute(|| {}).unwrap();

        assert_eq!(b, a + 1);
        assert_eq!(c, b + 1);
    }

    #[test]
    fn test_is_finished_tracks_a_blocked_job() {
        let jobs = JobSystem::new(Some(1));
        let (release, gate) = mpsc::channel::<()>();

        let id = jobs
            .execute(move || {
                let _ = gate.recv();
            })
            .unwrap();

        assert!(!jobs.is_finished(id));
        release.send(()).unwrap();
        jobs.wait(id);
        assert!(jobs.is_finished(id));
    }

    #[test]
    fn test_wait_on_finished_job_returns() {
        let jobs = JobSystem::new(Some(1));
        let id = jobs.execute(|| {}).unwrap();
        jobs.wait(id);
        // A second wait must not block.
        jobs.wait(id);
    }

    #[test]
    fn test_wait_on_unissued_id_returns() {
        let jobs = JobSystem::new(Some(1));
        jobs.wait(12345);
    }

    #[test]
    fn test_main_thread_jobs_wait_for_flush() {
        let jobs = JobSystem::new(Some(1));
        let counter = Arc::new(AtomicUsize::new(0));

        let c = Arc::clone(&counter);
        jobs.execute_on_main(move || {
            c.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 0, "must not run before flush");
        assert_eq!(jobs.flush_main_thread_jobs(), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(jobs.flush_main_thread_jobs(), 0);
    }

    #[test]
    fn test_flush_runs_on_calling_thread() {
        let jobs = JobSystem::new(Some(2));
        let (send, recv) = mpsc::channel();

        jobs.execute_on_main(move || {
            send.send(thread::current().id()).unwrap();
        })
        .unwrap();

        jobs.flush_main_thread_jobs();
        assert_eq!(recv.recv().unwrap(), thread::current().id());
    }

    #[test]
    fn test_reentrant_main_job_runs_next_flush() {
        let jobs = Arc::new(JobSystem::new(Some(1)));
        let counter = Arc::new(AtomicUsize::new(0));

        let inner_jobs = Arc::clone(&jobs);
        let inner_counter = Arc::clone(&counter);
        jobs.execute_on_main(move || {
            inner_counter.fetch_add(1, Ordering::SeqCst);
            let c = Arc::clone(&inner_counter);
            inner_jobs
                .execute_on_main(move || {
                    c.fetch_add(1, Ordering::SeqCst);
                })
                .unwrap();
        })
        .unwrap();

        assert_eq!(jobs.flush_main_thread_jobs(), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(jobs.flush_main_thread_jobs(), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_main_queue_rejects_when_full() {
        let jobs = JobSystem::new(Some(1));

        for _ in 0..MAX_JOBS - 1 {
            jobs.execute_on_main(|| {}).unwrap();
        }
        assert_eq!(jobs.execute_on_main(|| {}), Err(JobError::QueueFull));

        assert_eq!(jobs.flush_main_thread_jobs(), MAX_JOBS - 1);
    }

    #[test]
    fn test_shutdown_finishes_queued_jobs() {
        let mut jobs = JobSystem::new(Some(1));
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..20 {
            let counter = Arc::clone(&counter);
            jobs.execute(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }

        jobs.shutdown();
        assert_eq!(counter.load(Ordering::SeqCst), 20);
    }
}
