use crate::errors::{AppError, AppResult};
use crate::models::SyncConfig;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

pub const ATTENDANCE_COLLECTION: &str = "attendance_collection";
pub const ATTENDANCE_UPLOAD: &str = "attendance_upload";
pub const USER_IMPORT: &str = "user_import";

/// What one run of a job did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    pub success: bool,
    pub processed: usize,
    pub summary: String,
}

impl JobReport {
    pub fn ok(processed: usize, summary: impl Into<String>) -> Self {
        Self {
            success: true,
            processed,
            summary: summary.into(),
        }
    }

    pub fn failed(summary: impl Into<String>) -> Self {
        Self {
            success: false,
            processed: 0,
            summary: summary.into(),
        }
    }
}

/// A unit of periodic work.
pub trait Job: Send + Sync {
    fn run(&self) -> AppResult<JobReport>;
}

/// A component handle paired with the method the scheduler calls on it.
pub struct JobDescriptor<C> {
    component: Arc<C>,
    method: fn(&C) -> AppResult<JobReport>,
}

impl<C> JobDescriptor<C> {
    pub fn new(component: Arc<C>, method: fn(&C) -> AppResult<JobReport>) -> Self {
        Self { component, method }
    }
}

impl<C: Send + Sync> Job for JobDescriptor<C> {
    fn run(&self) -> AppResult<JobReport> {
        (self.method)(&self.component)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalUnit {
    Seconds,
    #[default]
    Minutes,
    Hours,
    Days,
}

impl IntervalUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntervalUnit::Seconds => "seconds",
            IntervalUnit::Minutes => "minutes",
            IntervalUnit::Hours => "hours",
            IntervalUnit::Days => "days",
        }
    }

    pub fn duration(&self, interval: u32) -> Duration {
        let secs = u64::from(interval);
        match self {
            IntervalUnit::Seconds => Duration::from_secs(secs),
            IntervalUnit::Minutes => Duration::from_secs(secs * 60),
            IntervalUnit::Hours => Duration::from_secs(secs * 3_600),
            IntervalUnit::Days => Duration::from_secs(secs * 86_400),
        }
    }
}

impl fmt::Display for IntervalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntervalUnit {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s" | "sec" | "second" | "seconds" => Ok(IntervalUnit::Seconds),
            "m" | "min" | "minute" | "minutes" => Ok(IntervalUnit::Minutes),
            "h" | "hour" | "hours" => Ok(IntervalUnit::Hours),
            "d" | "day" | "days" => Ok(IntervalUnit::Days),
            _ => Err(AppError::InvalidIntervalUnit(s.to_string())),
        }
    }
}

/// Lifecycle of a registered job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Registered,
    Scheduled,
    Running,
    Unscheduled,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Registered => "registered",
            JobState::Scheduled => "scheduled",
            JobState::Running => "running",
            JobState::Unscheduled => "unscheduled",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only snapshot of one job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobStatus {
    pub name: String,
    pub interval: u32,
    pub interval_unit: IntervalUnit,
    pub enabled: bool,
    pub last_run: Option<NaiveDateTime>,
    pub next_run: Option<NaiveDateTime>,
    pub scheduled: bool,
    pub state: JobState,
}

/// Interval (in minutes) the configuration row assigns to a known job.
pub fn resolve_interval(name: &str, config: &SyncConfig) -> Option<u32> {
    match name {
        ATTENDANCE_COLLECTION => Some(config.collection_interval),
        ATTENDANCE_UPLOAD => Some(config.upload_interval),
        USER_IMPORT => Some(config.import_interval),
        _ => None,
    }
}
