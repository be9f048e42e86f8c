use chrono::NaiveDate;
use thiserror::Error;

/// Invalid calendar configuration or scheduling options. Fatal to a run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("calendar requires at least one working day")]
    NoWorkingDays,

    #[error("weekday number {0} is out of range (expected 0=Sunday..6=Saturday)")]
    InvalidWeekday(u8),

    #[error("{field} '{value}' is not a valid HH:MM time")]
    MalformedTime { field: &'static str, value: String },

    #[error("working hours {start}-{end} must span a positive number of hours")]
    NonPositiveHours { start: String, end: String },

    #[error("working hours require both a start and an end time")]
    IncompleteWorkingHours,

    #[error("hours_per_day must be a positive number (got {0})")]
    InvalidHoursPerDay(f64),

    #[error("days_per_week must be a positive number (got {0})")]
    InvalidDaysPerWeek(f64),

    #[error("max_walk_days must be greater than zero")]
    InvalidWalkLimit,

    #[error("max_parallel must be at least 1")]
    InvalidMaxParallel,
}

/// A bounded calendar walk that never found enough usable days.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("no usable working day found within {limit} days of {from}")]
    WalkLimitExceeded { from: NaiveDate, limit: u32 },
}

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigError),

    #[error("task {task_id} cannot be scheduled: {source}")]
    UnschedulableTask {
        task_id: String,
        #[source]
        source: CalendarError,
    },

    #[error("dependency cycle between tasks {}", .task_ids.join(", "))]
    DependencyCycle { task_ids: Vec<String> },
}
