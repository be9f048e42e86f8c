use crate::error::ConfigError;
use crate::request::RequestValidationError;
use crate::scheduler::ScheduleOutcome;
use crate::task::ScheduleResult;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::io;
use thiserror::Error;
use tracing::{debug, warn};

pub mod file;

pub use file::{
    load_request_from_json, load_results_from_csv, save_request_to_json, save_results_to_csv,
    save_results_to_json,
};

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid calendar: {0}")]
    Calendar(#[from] ConfigError),
    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl From<RequestValidationError> for PersistenceError {
    fn from(value: RequestValidationError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// One failed write of computed dates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to store dates for task {task_id}: {message}")]
pub struct StoreError {
    pub task_id: String,
    pub message: String,
}

impl StoreError {
    pub fn new(task_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            message: message.into(),
        }
    }
}

/// Dates a task store currently holds for one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoredDates {
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
}

impl StoredDates {
    pub fn is_scheduled(&self) -> bool {
        self.start_date.is_some() && self.due_date.is_some()
    }
}

/// The caller-side task store that persists computed dates.
pub trait TaskDateStore {
    fn stored_dates(&self, task_id: &str) -> Option<StoredDates>;
    fn write_dates(&mut self, result: &ScheduleResult) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub written: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<StoreError>,
}

impl ApplyReport {
    pub fn to_cli_summary(&self) -> String {
        format!(
            "written={}, kept={}, failed={}",
            self.written.len(),
            self.skipped.len(),
            self.failed.len()
        )
    }
}

/// Persist a run's results one task at a time.
///
/// With `force_reschedule` every result is written. Otherwise tasks that already
/// hold both a start and a due date keep them. Each write stands alone: a failure
/// is recorded and the remaining writes still happen. Nothing is retried.
pub fn apply_schedule<S>(store: &mut S, outcome: &ScheduleOutcome) -> ApplyReport
where
    S: TaskDateStore + ?Sized,
{
    let mut report = ApplyReport::default();
    for result in &outcome.results {
        let already_dated = store
            .stored_dates(&result.task_id)
            .is_some_and(|dates| dates.is_scheduled());
        if already_dated && !outcome.force_reschedule {
            report.skipped.push(result.task_id.clone());
            continue;
        }
        match store.write_dates(result) {
            Ok(()) => report.written.push(result.task_id.clone()),
            Err(err) => {
                warn!(task_id = %result.task_id, error = %err, "storing dates failed");
                report.failed.push(err);
            }
        }
    }
    debug!(summary = %report.to_cli_summary(), "schedule applied");
    report
}

/// Task dates held in memory, keyed by task id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryTaskStore {
    dates: BTreeMap<String, StoredDates>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dates(
        mut self,
        task_id: impl Into<String>,
        start_date: NaiveDate,
        due_date: NaiveDate,
    ) -> Self {
        self.dates.insert(
            task_id.into(),
            StoredDates {
                start_date: Some(start_date),
                due_date: Some(due_date),
            },
        );
        self
    }

    pub fn get(&self, task_id: &str) -> Option<StoredDates> {
        self.dates.get(task_id).copied()
    }

    pub fn remove(&mut self, task_id: &str) -> Option<StoredDates> {
        self.dates.remove(task_id)
    }

    pub fn clear(&mut self) {
        self.dates.clear();
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

impl TaskDateStore for InMemoryTaskStore {
    fn stored_dates(&self, task_id: &str) -> Option<StoredDates> {
        self.get(task_id)
    }

    fn write_dates(&mut self, result: &ScheduleResult) -> Result<(), StoreError> {
        self.dates.insert(
            result.task_id.clone(),
            StoredDates {
                start_date: Some(result.start_date),
                due_date: Some(result.due_date),
            },
        );
        Ok(())
    }
}
