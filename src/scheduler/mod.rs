//! Priority-ordered auto-scheduling across one or more lanes.

pub mod task_dates;

pub use task_dates::{TaskDates, calculate_task_dates, working_days_needed};

use crate::calendar::{CalendarConfig, WorkCalendar};
use crate::error::{CalendarError, ConfigError, ScheduleError};
use crate::graph::DependencyDag;
use crate::leave::{LeaveInterval, LeavePolicy};
use crate::task::{SchedulableTask, ScheduleResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulingMode {
    #[default]
    Sequential,
    Parallel,
}

/// What to do when a single task cannot be placed on the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop the run and name the failing task.
    #[default]
    Abort,
    /// Record the failure and keep scheduling the remaining tasks.
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyPolicy {
    #[default]
    Ignore,
    /// Topologically order tasks and hold each one until its dependencies are due.
    GateStart,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleOptions {
    pub mode: SchedulingMode,
    pub max_parallel: usize,
    /// Tells the caller to overwrite previously stored dates. The computation is
    /// identical either way.
    pub force_reschedule: bool,
    pub failure_policy: FailurePolicy,
    pub leave_policy: LeavePolicy,
    pub dependency_policy: DependencyPolicy,
}

impl Default for ScheduleOptions {
    fn default() -> Self {
        Self {
            mode: SchedulingMode::Sequential,
            max_parallel: 1,
            force_reschedule: false,
            failure_policy: FailurePolicy::Abort,
            leave_policy: LeavePolicy::AnyAssignee,
            dependency_policy: DependencyPolicy::Ignore,
        }
    }
}

impl ScheduleOptions {
    pub fn sequential() -> Self {
        Self::default()
    }

    pub fn parallel(max_parallel: usize) -> Self {
        Self {
            mode: SchedulingMode::Parallel,
            max_parallel,
            ..Self::default()
        }
    }

    pub fn with_force_reschedule(mut self, force: bool) -> Self {
        self.force_reschedule = force;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_leave_policy(mut self, policy: LeavePolicy) -> Self {
        self.leave_policy = policy;
        self
    }

    pub fn with_dependency_policy(mut self, policy: DependencyPolicy) -> Self {
        self.dependency_policy = policy;
        self
    }

    pub fn lane_count(&self) -> usize {
        match self.mode {
            SchedulingMode::Sequential => 1,
            SchedulingMode::Parallel => self.max_parallel,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mode == SchedulingMode::Parallel && self.max_parallel == 0 {
            return Err(ConfigError::InvalidMaxParallel);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFailure {
    pub task_id: String,
    pub reason: String,
}

/// Everything one scheduling run produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleOutcome {
    /// Scheduled tasks in the order they were laid out.
    pub results: Vec<ScheduleResult>,
    /// Tasks skipped for lacking a usable duration, in input order.
    pub ineligible: Vec<String>,
    /// Tasks that could not be placed; only populated under `FailurePolicy::Skip`.
    pub failures: Vec<TaskFailure>,
    pub force_reschedule: bool,
}

impl ScheduleOutcome {
    pub fn ineligible_count(&self) -> usize {
        self.ineligible.len()
    }

    pub fn latest_due_date(&self) -> Option<NaiveDate> {
        self.results.iter().map(|r| r.due_date).max()
    }

    pub fn result_for(&self, task_id: &str) -> Option<&ScheduleResult> {
        self.results.iter().find(|r| r.task_id == task_id)
    }

    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("scheduled={}", self.results.len()));
        if !self.ineligible.is_empty() {
            parts.push(format!("no_duration={}", self.ineligible.len()));
        }
        if !self.failures.is_empty() {
            parts.push(format!("failed={}", self.failures.len()));
        }
        if let Some(date) = self.latest_due_date() {
            parts.push(format!("finish={}", date));
        }
        if self.force_reschedule {
            parts.push("force=true".to_string());
        }
        parts.join(", ")
    }
}

/// Schedule every eligible task starting from `anchor`.
///
/// Tasks without a usable duration are listed in [`ScheduleOutcome::ineligible`].
/// The rest are stably sorted by priority (`urgent` first, ties keep input order)
/// and laid out one after another on each lane: the next task goes to the lane
/// whose cursor is earliest, lowest index first, and that cursor then moves to the
/// first working day after the task's due date.
pub fn auto_schedule_all_tasks(
    tasks: &[SchedulableTask],
    anchor: NaiveDate,
    config: &CalendarConfig,
    leaves: &[LeaveInterval],
    options: &ScheduleOptions,
) -> Result<ScheduleOutcome, ScheduleError> {
    let calendar = WorkCalendar::from_config(config)?;
    schedule_with_calendar(tasks, anchor, &calendar, leaves, options)
}

/// Same as [`auto_schedule_all_tasks`] for an already validated calendar.
pub fn schedule_with_calendar(
    tasks: &[SchedulableTask],
    anchor: NaiveDate,
    calendar: &WorkCalendar,
    leaves: &[LeaveInterval],
    options: &ScheduleOptions,
) -> Result<ScheduleOutcome, ScheduleError> {
    options.validate()?;

    let mut ineligible = Vec::new();
    let mut eligible: Vec<&SchedulableTask> = Vec::with_capacity(tasks.len());
    for task in tasks {
        if working_days_needed(task, calendar).is_some() {
            eligible.push(task);
        } else {
            ineligible.push(task.id.clone());
        }
    }
    eligible.sort_by_key(|task| task.priority.rank());

    let gate = options.dependency_policy == DependencyPolicy::GateStart;
    if gate {
        eligible = order_by_dependencies(eligible)?;
    }

    let lane_count = options.lane_count();
    debug!(
        eligible = eligible.len(),
        ineligible = ineligible.len(),
        lanes = lane_count,
        %anchor,
        "scheduling run started"
    );

    let mut lanes: Vec<LaneCursor> = vec![Ok(anchor); lane_count];
    let mut due_by_id: HashMap<&str, NaiveDate> = HashMap::with_capacity(eligible.len());
    let mut failed_ids: HashSet<&str> = HashSet::new();
    let mut results = Vec::with_capacity(eligible.len());
    let mut failures = Vec::new();

    for task in eligible {
        let lane = earliest_lane(&lanes);
        let placement = match &lanes[lane] {
            Err(exhausted) => Err(Blocked::Calendar(exhausted.clone())),
            Ok(cursor) if gate => place_gated(
                task,
                *cursor,
                calendar,
                leaves,
                options,
                &due_by_id,
                &failed_ids,
            ),
            Ok(cursor) => place(task, *cursor, calendar, leaves, options),
        };

        let dates = match placement {
            Ok(dates) => dates,
            Err(blocked) => {
                if options.failure_policy == FailurePolicy::Abort {
                    if let Blocked::Calendar(source) = blocked {
                        return Err(ScheduleError::UnschedulableTask {
                            task_id: task.id.clone(),
                            source,
                        });
                    }
                }
                let reason = blocked.to_string();
                warn!(task_id = %task.id, %reason, "task skipped");
                failed_ids.insert(task.id.as_str());
                failures.push(TaskFailure {
                    task_id: task.id.clone(),
                    reason,
                });
                continue;
            }
        };

        debug!(
            task_id = %task.id,
            priority = task.priority.as_str(),
            lane,
            start = %dates.start_date,
            due = %dates.due_date,
            days = dates.working_days_used,
            "task placed"
        );

        match calendar.next_working_day(dates.due_date) {
            Ok(next_free) => {
                if let Ok(cursor) = &mut lanes[lane] {
                    if next_free > *cursor {
                        *cursor = next_free;
                    }
                }
            }
            Err(source) => {
                warn!(lane, due = %dates.due_date, error = %source, "lane has no working day left");
                lanes[lane] = Err(source);
            }
        }

        due_by_id.entry(task.id.as_str()).or_insert(dates.due_date);
        results.push(ScheduleResult {
            task_id: task.id.clone(),
            start_date: dates.start_date,
            due_date: dates.due_date,
            working_days_used: dates.working_days_used,
            lane,
        });
    }

    let outcome = ScheduleOutcome {
        results,
        ineligible,
        failures,
        force_reschedule: options.force_reschedule,
    };
    info!(summary = %outcome.to_cli_summary(), "scheduling run finished");
    Ok(outcome)
}

/// Cursor of one lane. `Err` once no working day follows the lane's last task.
type LaneCursor = Result<NaiveDate, CalendarError>;

/// Why a task could not be placed.
#[derive(Debug, Error)]
enum Blocked {
    #[error("{0}")]
    Calendar(CalendarError),
    #[error("dependency {0} could not be scheduled")]
    DependencyFailed(String),
    #[error("task has no usable duration")]
    NoDuration,
}

/// Open lanes first, earliest cursor, lowest index on ties.
fn earliest_lane(lanes: &[LaneCursor]) -> usize {
    lanes
        .iter()
        .enumerate()
        .min_by_key(|(index, cursor)| match cursor {
            Ok(date) => (false, Some(*date), *index),
            Err(_) => (true, None, *index),
        })
        .map(|(index, _)| index)
        .unwrap_or(0)
}

fn place(
    task: &SchedulableTask,
    candidate_start: NaiveDate,
    calendar: &WorkCalendar,
    leaves: &[LeaveInterval],
    options: &ScheduleOptions,
) -> Result<TaskDates, Blocked> {
    calculate_task_dates(task, candidate_start, calendar, leaves, options.leave_policy)
        .map_err(Blocked::Calendar)?
        .ok_or(Blocked::NoDuration)
}

fn place_gated(
    task: &SchedulableTask,
    lane_cursor: NaiveDate,
    calendar: &WorkCalendar,
    leaves: &[LeaveInterval],
    options: &ScheduleOptions,
    due_by_id: &HashMap<&str, NaiveDate>,
    failed_ids: &HashSet<&str>,
) -> Result<TaskDates, Blocked> {
    if let Some(dep) = task
        .dependencies
        .iter()
        .find(|dep| failed_ids.contains(dep.as_str()))
    {
        return Err(Blocked::DependencyFailed(dep.clone()));
    }

    let latest_dependency_due = task
        .dependencies
        .iter()
        .filter_map(|dep| due_by_id.get(dep.as_str()).copied())
        .max();

    let mut candidate = lane_cursor;
    if let Some(due) = latest_dependency_due {
        let ready = calendar.next_working_day(due).map_err(Blocked::Calendar)?;
        candidate = candidate.max(ready);
    }

    let mut gated = task.clone();
    if let Some(pinned) = gated.start_date {
        gated.start_date = Some(pinned.max(candidate));
    }
    place(&gated, candidate, calendar, leaves, options)
}

fn order_by_dependencies(
    eligible: Vec<&SchedulableTask>,
) -> Result<Vec<&SchedulableTask>, ScheduleError> {
    let dag = DependencyDag::build(&eligible);
    match dag.stable_order() {
        Ok(order) => Ok(order.into_iter().map(|position| eligible[position]).collect()),
        Err(cycle) => Err(ScheduleError::DependencyCycle {
            task_ids: cycle
                .into_iter()
                .map(|position| eligible[position].id.clone())
                .collect(),
        }),
    }
}
