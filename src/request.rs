use crate::calendar::{CalendarConfig, WorkCalendar};
use crate::error::{ConfigError, ScheduleError};
use crate::leave::LeaveInterval;
use crate::scheduler::{ScheduleOptions, ScheduleOutcome, schedule_with_calendar};
use crate::task::SchedulableTask;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Complete input of one scheduling run, as exchanged with the task store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub anchor_date: NaiveDate,
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub tasks: Vec<SchedulableTask>,
    #[serde(default)]
    pub leaves: Vec<LeaveInterval>,
    #[serde(default)]
    pub options: ScheduleOptions,
}

impl ScheduleRequest {
    pub fn new(anchor_date: NaiveDate) -> Self {
        Self {
            anchor_date,
            calendar: CalendarConfig::default(),
            tasks: Vec::new(),
            leaves: Vec::new(),
            options: ScheduleOptions::default(),
        }
    }

    pub fn calendar(&self) -> Result<WorkCalendar, ConfigError> {
        WorkCalendar::from_config(&self.calendar)
    }

    pub fn find_task(&self, task_id: &str) -> Option<&SchedulableTask> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    /// Insert or replace a task by id, keeping its original position on replace.
    pub fn upsert_task(&mut self, task: SchedulableTask) {
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => *existing = task,
            None => self.tasks.push(task),
        }
    }

    /// Remove a task and drop it from other tasks' dependency lists.
    pub fn delete_task(&mut self, task_id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != task_id);
        if self.tasks.len() == before {
            return false;
        }
        for task in &mut self.tasks {
            task.dependencies.retain(|dep| dep != task_id);
        }
        true
    }

    pub fn run(&self) -> Result<ScheduleOutcome, ScheduleError> {
        let calendar = self.calendar()?;
        schedule_with_calendar(
            &self.tasks,
            self.anchor_date,
            &calendar,
            &self.leaves,
            &self.options,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RequestValidationError {
    message: String,
}

impl RequestValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Structural checks on caller-supplied data. Missing or zero durations are not
/// errors; the scheduler reports those tasks as ineligible.
pub fn validate_request(request: &ScheduleRequest) -> Result<(), RequestValidationError> {
    let mut seen_ids = HashSet::with_capacity(request.tasks.len());
    for task in &request.tasks {
        if task.id.trim().is_empty() {
            return Err(RequestValidationError::new("task id must not be empty"));
        }
        if !seen_ids.insert(task.id.as_str()) {
            return Err(RequestValidationError::new(format!(
                "duplicate task id {}",
                task.id
            )));
        }
        if let Some(duration) = task.duration {
            if !duration.value.is_finite() {
                return Err(RequestValidationError::new(format!(
                    "task {} has non-finite duration",
                    task.id
                )));
            }
        }
        if task.assignee_ids.iter().any(|a| a.trim().is_empty()) {
            return Err(RequestValidationError::new(format!(
                "task {} has an empty assignee id",
                task.id
            )));
        }
    }

    for (idx, leave) in request.leaves.iter().enumerate() {
        if leave.employee_id.trim().is_empty() {
            return Err(RequestValidationError::new(format!(
                "leave #{} requires a non-empty employee_id",
                idx
            )));
        }
        if leave.end_date < leave.start_date {
            return Err(RequestValidationError::new(format!(
                "leave #{} for {} ends {} before it starts {}",
                idx, leave.employee_id, leave.end_date, leave.start_date
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duration::TaskDuration;

    fn d(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn upsert_replaces_in_place() {
        let mut request = ScheduleRequest::new(d(2024, 1, 1));
        request.upsert_task(SchedulableTask::new("a", TaskDuration::days(1.0)));
        request.upsert_task(SchedulableTask::new("b", TaskDuration::days(1.0)));
        request.upsert_task(SchedulableTask::new("a", TaskDuration::days(4.0)));

        let ids: Vec<&str> = request.tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(request.tasks[0].duration, Some(TaskDuration::days(4.0)));
    }

    #[test]
    fn delete_cleans_dependencies() {
        let mut request = ScheduleRequest::new(d(2024, 1, 1));
        request.upsert_task(SchedulableTask::new("a", TaskDuration::days(1.0)));
        request.upsert_task(
            SchedulableTask::new("b", TaskDuration::days(1.0)).with_dependencies(["a"]),
        );
        assert!(request.delete_task("a"));
        assert!(!request.delete_task("a"));
        assert!(request.tasks[0].dependencies.is_empty());
    }

    #[test]
    fn validation_rejects_duplicates_and_inverted_leave() {
        let mut request = ScheduleRequest::new(d(2024, 1, 1));
        request.tasks.push(SchedulableTask::new("a", TaskDuration::days(1.0)));
        request.tasks.push(SchedulableTask::new("a", TaskDuration::days(2.0)));
        let err = validate_request(&request).unwrap_err();
        assert!(err.to_string().contains("duplicate task id a"));

        request.tasks.pop();
        request
            .leaves
            .push(LeaveInterval::approved("ana", d(2024, 1, 5), d(2024, 1, 2)));
        let err = validate_request(&request).unwrap_err();
        assert!(err.to_string().contains("ends 2024-01-02 before it starts 2024-01-05"));
    }
}
