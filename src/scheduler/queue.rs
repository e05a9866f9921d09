//! Worker for manually triggered actions.
//!
//! Runs submitted tasks one at a time on its own thread, independent of the
//! scheduler loop, and hands back a handle for completion and cancellation.

use super::JobReport;
use crate::errors::{AppError, AppResult};
use log::{debug, warn};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

const PENDING: u8 = 0;
const RUNNING: u8 = 1;
const CANCELLED: u8 = 2;
const DONE: u8 = 3;

type Work = Box<dyn FnOnce() -> AppResult<JobReport> + Send + 'static>;

struct Shared {
    label: String,
    state: AtomicU8,
    result: Mutex<Option<AppResult<JobReport>>>,
    finished: Condvar,
}

impl Shared {
    fn finish(&self, result: AppResult<JobReport>) {
        let mut slot = self.result.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(result);
        self.finished.notify_all();
    }
}

struct Envelope {
    shared: Arc<Shared>,
    work: Work,
}

/// Completion and cancellation handle of a submitted task.
pub struct TaskHandle {
    shared: Arc<Shared>,
}

impl TaskHandle {
    pub fn label(&self) -> &str {
        &self.shared.label
    }

    /// Cancel the task if it has not started yet.
    pub fn cancel(&self) -> bool {
        let cancelled = self
            .shared
            .state
            .compare_exchange(PENDING, CANCELLED, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if cancelled {
            debug!("Task '{}' cancelled", self.shared.label);
            self.shared
                .finish(Err(AppError::Cancelled(self.shared.label.clone())));
        }
        cancelled
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.shared.state.load(Ordering::SeqCst), CANCELLED | DONE)
    }

    /// Block until the task has finished or `timeout` elapses.
    /// Returns whether it finished.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let slot = self
            .shared
            .result
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let (slot, _) = self
            .shared
            .finished
            .wait_timeout_while(slot, timeout, |r| r.is_none())
            .unwrap_or_else(PoisonError::into_inner);
        slot.is_some()
    }

    /// Block until the task has finished and take its result.
    pub fn wait(self) -> AppResult<JobReport> {
        let slot = self
            .shared
            .result
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut slot = self
            .shared
            .finished
            .wait_while(slot, |r| r.is_none())
            .unwrap_or_else(PoisonError::into_inner);
        slot.take()
            .unwrap_or_else(|| Err(AppError::Other("task result already taken".into())))
    }
}

/// Single-worker FIFO task queue.
pub struct TaskQueue {
    tx: Mutex<Option<Sender<Envelope>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    closed: Arc<AtomicBool>,
}

impl TaskQueue {
    pub fn new() -> AppResult<Self> {
        let (tx, rx) = mpsc::channel::<Envelope>();
        let closed = Arc::new(AtomicBool::new(false));
        let worker_closed = Arc::clone(&closed);

        let worker = thread::Builder::new()
            .name("punchsync-tasks".into())
            .spawn(move || {
                for envelope in rx {
                    let Envelope { shared, work } = envelope;

                    if worker_closed.load(Ordering::SeqCst) {
                        if shared
                            .state
                            .compare_exchange(PENDING, CANCELLED, Ordering::SeqCst, Ordering::SeqCst)
                            .is_ok()
                        {
                            shared.finish(Err(AppError::Cancelled(shared.label.clone())));
                        }
                        continue;
                    }

                    if shared
                        .state
                        .compare_exchange(PENDING, RUNNING, Ordering::SeqCst, Ordering::SeqCst)
                        .is_err()
                    {
                        continue;
                    }

                    debug!("Task '{}' started", shared.label);
                    let result = panic::catch_unwind(AssertUnwindSafe(work)).unwrap_or_else(|_| {
                        Err(AppError::Other(format!("task '{}' panicked", shared.label)))
                    });
                    if let Err(e) = &result {
                        warn!("Task '{}' failed ({}): {e}", shared.label, e.kind());
                    }
                    shared.state.store(DONE, Ordering::SeqCst);
                    shared.finish(result);
                }
            })?;

        Ok(Self {
            tx: Mutex::new(Some(tx)),
            worker: Mutex::new(Some(worker)),
            closed,
        })
    }

    pub fn submit<F>(&self, label: &str, work: F) -> AppResult<TaskHandle>
    where
        F: FnOnce() -> AppResult<JobReport> + Send + 'static,
    {
        let shared = Arc::new(Shared {
            label: label.to_string(),
            state: AtomicU8::new(PENDING),
            result: Mutex::new(None),
            finished: Condvar::new(),
        });

        let tx = self.tx.lock().unwrap_or_else(PoisonError::into_inner);
        let sender = tx
            .as_ref()
            .ok_or_else(|| AppError::Other("task queue is shut down".into()))?;
        sender
            .send(Envelope {
                shared: Arc::clone(&shared),
                work: Box::new(work),
            })
            .map_err(|_| AppError::Other("task queue worker is gone".into()))?;

        Ok(TaskHandle { shared })
    }

    /// Cancel queued tasks, let the running one finish, join the worker.
    pub fn shutdown(&self) {
        self.closed.store(true, Ordering::SeqCst);
        drop(self.tx.lock().unwrap_or_else(PoisonError::into_inner).take());

        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = worker
            && handle.join().is_err()
        {
            warn!("Task worker ended with a panic");
        }
    }
}

impl Drop for TaskQueue {
    fn drop(&mut self) {
        self.shutdown();
    }
}
