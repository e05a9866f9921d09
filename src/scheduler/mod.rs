//! Named periodic jobs driven by one background loop thread.
//!
//! Due jobs run sequentially on the loop thread. Manual runs
//! (`run_job_now`, `run_exclusive`) take the same execution lock, so no two
//! job bodies ever overlap.

pub mod job;
pub mod queue;

pub use job::{
    ATTENDANCE_COLLECTION, ATTENDANCE_UPLOAD, IntervalUnit, Job, JobDescriptor, JobReport,
    JobState, JobStatus, USER_IMPORT, resolve_interval,
};
pub use queue::{TaskHandle, TaskQueue};

use crate::errors::{AppError, AppResult};
use crate::models::SyncConfig;
use chrono::{Local, NaiveDateTime};
use log::{debug, error, info, warn};
use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const STOP_WAIT: Duration = Duration::from_secs(2);

/// Cap for due times `Instant` cannot represent (about 100 years).
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 86_400);

fn due_after(now: Instant, period: Duration) -> Instant {
    now.checked_add(period)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}

struct ScheduleEntry {
    period: Duration,
    next_due: Instant,
}

struct JobEntry {
    task: Arc<dyn Job>,
    interval: u32,
    unit: IntervalUnit,
    enabled: bool,
    last_run: Option<NaiveDateTime>,
    schedule: Option<ScheduleEntry>,
    running: bool,
    ever_scheduled: bool,
}

impl JobEntry {
    fn schedule_from(&mut self, now: Instant) {
        let period = self.unit.duration(self.interval);
        self.schedule = Some(ScheduleEntry {
            period,
            next_due: due_after(now, period),
        });
        self.ever_scheduled = true;
    }

    fn status(&self, name: &str) -> JobStatus {
        // None when the due time is beyond what the calendar can represent
        let next_run = self.schedule.as_ref().and_then(|s| {
            let wait = s.next_due.saturating_duration_since(Instant::now());
            chrono::Duration::from_std(wait)
                .ok()
                .and_then(|d| Local::now().naive_local().checked_add_signed(d))
        });

        let state = if self.running {
            JobState::Running
        } else if self.schedule.is_some() {
            JobState::Scheduled
        } else if self.ever_scheduled {
            JobState::Unscheduled
        } else if self.enabled {
            JobState::Registered
        } else {
            JobState::Unscheduled
        };

        JobStatus {
            name: name.to_string(),
            interval: self.interval,
            interval_unit: self.unit,
            enabled: self.enabled,
            last_run: self.last_run,
            next_run,
            scheduled: self.schedule.is_some(),
            state,
        }
    }
}

struct LoopControl {
    stop_tx: Sender<()>,
    done_rx: Receiver<()>,
    handle: JoinHandle<()>,
}

struct Inner {
    config: Option<Arc<SyncConfig>>,
    tick: Duration,
    jobs: Mutex<BTreeMap<String, JobEntry>>,
    exec: Mutex<()>,
    running: AtomicBool,
    generation: AtomicU64,
    control: Mutex<Option<LoopControl>>,
}

/// Cheap to clone; clones share the same job table and loop.
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<Inner>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl Scheduler {
    pub fn new(config: Option<Arc<SyncConfig>>, tick: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                tick: tick.max(Duration::from_millis(1)),
                jobs: Mutex::new(BTreeMap::new()),
                exec: Mutex::new(()),
                running: AtomicBool::new(false),
                generation: AtomicU64::new(0),
                control: Mutex::new(None),
            }),
        }
    }

    /// Register (or replace) a job.
    ///
    /// Without an explicit interval the cadence comes from the
    /// configuration row, in minutes. A name the configuration does not
    /// know is rejected and nothing is registered.
    pub fn register_job(
        &self,
        name: &str,
        task: Arc<dyn Job>,
        interval: Option<u32>,
        unit: Option<IntervalUnit>,
    ) -> AppResult<()> {
        let (interval, unit) = match interval {
            Some(i) => (i, unit.unwrap_or_default()),
            None => {
                let resolved = self
                    .inner
                    .config
                    .as_deref()
                    .and_then(|cfg| resolve_interval(name, cfg));
                match resolved {
                    Some(i) => (i, unit.unwrap_or(IntervalUnit::Minutes)),
                    None => {
                        let err = AppError::Config(format!("no interval configured for job '{name}'"));
                        error!("Cannot register job: {err}");
                        return Err(err);
                    }
                }
            }
        };

        if interval == 0 {
            let err = AppError::Config(format!("interval of job '{name}' must be positive"));
            error!("Cannot register job: {err}");
            return Err(err);
        }

        let mut entry = JobEntry {
            task,
            interval,
            unit,
            enabled: true,
            last_run: None,
            schedule: None,
            running: false,
            ever_scheduled: false,
        };
        if self.is_running() {
            entry.schedule_from(Instant::now());
        }

        let mut jobs = lock(&self.inner.jobs);
        if let Some(previous) = jobs.get(name) {
            entry.last_run = previous.last_run;
        }
        jobs.insert(name.to_string(), entry);
        info!("Registered job '{name}' every {interval} {unit}");
        Ok(())
    }

    /// Spawn the loop thread. A second call while running does nothing.
    pub fn start(&self) -> AppResult<()> {
        if self.inner.running.swap(true, Ordering::SeqCst) {
            info!("Scheduler already running");
            return Ok(());
        }

        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let now = Instant::now();
            let mut jobs = lock(&self.inner.jobs);
            for entry in jobs.values_mut() {
                entry.schedule = None;
                if entry.enabled {
                    entry.schedule_from(now);
                }
            }
        }

        let (stop_tx, stop_rx) = mpsc::channel();
        let (done_tx, done_rx) = mpsc::channel();
        let inner = Arc::clone(&self.inner);

        let spawned = thread::Builder::new()
            .name("punchsync-scheduler".into())
            .spawn(move || run_loop(inner, generation, stop_rx, done_tx));

        let handle = match spawned {
            Ok(h) => h,
            Err(e) => {
                self.inner.running.store(false, Ordering::SeqCst);
                self.clear_schedule();
                return Err(e.into());
            }
        };

        *lock(&self.inner.control) = Some(LoopControl {
            stop_tx,
            done_rx,
            handle,
        });
        info!("Scheduler started");
        Ok(())
    }

    /// Stop scheduling and wait briefly for the loop to exit.
    ///
    /// A job already executing is not interrupted; if it outlives the wait
    /// the loop thread is left to finish on its own.
    pub fn stop(&self) {
        if !self.inner.running.swap(false, Ordering::SeqCst) {
            info!("Scheduler is not running");
            return;
        }

        self.clear_schedule();

        let Some(control) = lock(&self.inner.control).take() else {
            return;
        };
        let _ = control.stop_tx.send(());

        match control.done_rx.recv_timeout(STOP_WAIT) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if control.handle.join().is_err() {
                    warn!("Scheduler thread ended with a panic");
                }
                info!("Scheduler stopped");
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    "Scheduler loop still busy after {:?}; leaving it to finish in the background",
                    STOP_WAIT
                );
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    /// Run a job right now on the calling thread, outside its cadence.
    pub fn run_job_now(&self, name: &str) -> AppResult<JobReport> {
        let task = {
            let jobs = lock(&self.inner.jobs);
            let entry = jobs
                .get(name)
                .ok_or_else(|| AppError::JobNotFound(name.to_string()))?;
            Arc::clone(&entry.task)
        };

        info!("Running job '{name}' on demand");
        let _guard = lock(&self.inner.exec);
        self.inner.execute(name, task.as_ref())
    }

    /// Run `f` while holding the execution lock, so it never overlaps a job.
    pub fn run_exclusive<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = lock(&self.inner.exec);
        f()
    }

    pub fn update_job_interval(
        &self,
        name: &str,
        interval: u32,
        unit: Option<IntervalUnit>,
    ) -> AppResult<()> {
        if interval == 0 {
            return Err(AppError::Config(format!(
                "interval of job '{name}' must be positive"
            )));
        }

        let running = self.is_running();
        let mut jobs = lock(&self.inner.jobs);
        let entry = jobs
            .get_mut(name)
            .ok_or_else(|| AppError::JobNotFound(name.to_string()))?;

        entry.interval = interval;
        if let Some(u) = unit {
            entry.unit = u;
        }
        if running && entry.enabled {
            entry.schedule_from(Instant::now());
        }
        info!("Job '{name}' now runs every {interval} {}", entry.unit);
        Ok(())
    }

    pub fn enable_job(&self, name: &str, enabled: bool) -> AppResult<()> {
        let running = self.is_running();
        let mut jobs = lock(&self.inner.jobs);
        let entry = jobs
            .get_mut(name)
            .ok_or_else(|| AppError::JobNotFound(name.to_string()))?;

        entry.enabled = enabled;
        if !enabled {
            entry.schedule = None;
        } else if running && entry.schedule.is_none() {
            entry.schedule_from(Instant::now());
        }
        info!(
            "Job '{name}' {}",
            if enabled { "enabled" } else { "disabled" }
        );
        Ok(())
    }

    pub fn get_job_status(&self, name: &str) -> Option<JobStatus> {
        lock(&self.inner.jobs).get(name).map(|e| e.status(name))
    }

    pub fn get_all_job_statuses(&self) -> Vec<JobStatus> {
        lock(&self.inner.jobs)
            .iter()
            .map(|(name, e)| e.status(name))
            .collect()
    }

    fn clear_schedule(&self) {
        for entry in lock(&self.inner.jobs).values_mut() {
            entry.schedule = None;
        }
    }
}

impl Inner {
    fn is_current(&self, generation: u64) -> bool {
        self.running.load(Ordering::SeqCst) && self.generation.load(Ordering::SeqCst) == generation
    }

    fn due_jobs(&self) -> Vec<(String, Arc<dyn Job>)> {
        let now = Instant::now();
        lock(&self.jobs)
            .iter()
            .filter(|(_, e)| e.schedule.as_ref().is_some_and(|s| s.next_due <= now))
            .map(|(name, e)| (name.clone(), Arc::clone(&e.task)))
            .collect()
    }

    fn run_due(&self, generation: u64) {
        for (name, task) in self.due_jobs() {
            if !self.is_current(generation) {
                break;
            }

            let _guard = lock(&self.exec);
            let report = self.execute(&name, task.as_ref());
            if let Ok(r) = &report
                && !r.success
            {
                warn!("Job '{name}' reported failure: {}", r.summary);
            }

            if let Some(entry) = lock(&self.jobs).get_mut(&name)
                && let Some(schedule) = entry.schedule.as_mut()
            {
                schedule.next_due = due_after(Instant::now(), schedule.period);
            }
        }
    }

    /// Run one job body. Errors and panics stop here.
    fn execute(&self, name: &str, task: &dyn Job) -> AppResult<JobReport> {
        if let Some(entry) = lock(&self.jobs).get_mut(name) {
            entry.running = true;
        }

        let started = Instant::now();
        let result = match panic::catch_unwind(AssertUnwindSafe(|| task.run())) {
            Ok(r) => r,
            Err(payload) => Err(AppError::Other(format!(
                "job '{name}' panicked: {}",
                panic_message(payload)
            ))),
        };

        match &result {
            Ok(report) => debug!(
                "Job '{name}' finished in {:?}: {}",
                started.elapsed(),
                report.summary
            ),
            Err(e) => error!("Job '{name}' failed ({}): {e}", e.kind()),
        }

        if let Some(entry) = lock(&self.jobs).get_mut(name) {
            entry.running = false;
            entry.last_run = Some(Local::now().naive_local());
        }
        result
    }
}

fn run_loop(inner: Arc<Inner>, generation: u64, stop_rx: Receiver<()>, done_tx: Sender<()>) {
    debug!("Scheduler loop {generation} started");
    loop {
        match stop_rx.recv_timeout(inner.tick) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }
        if !inner.is_current(generation) {
            break;
        }
        inner.run_due(generation);
    }
    debug!("Scheduler loop {generation} exiting");
    let _ = done_tx.send(());
}
