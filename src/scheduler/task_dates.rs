use crate::calendar::WorkCalendar;
use crate::error::CalendarError;
use crate::leave::{AssigneeLeaves, LeaveInterval, LeavePolicy, filter_employee_leaves, leave_window};
use crate::task::SchedulableTask;
use chrono::NaiveDate;
use tracing::trace;

/// Concrete window for one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskDates {
    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
    pub working_days_used: u32,
}

/// Working days the task occupies, or `None` when it has no usable duration.
pub fn working_days_needed(task: &SchedulableTask, calendar: &WorkCalendar) -> Option<u32> {
    task.duration
        .map(|duration| duration.to_working_days(calendar))
        .filter(|&days| days > 0)
}

/// Place `task` on the calendar starting no earlier than `candidate_start`
/// (or its pinned start date, when it has one).
///
/// Returns `Ok(None)` for tasks without a usable duration. The start date counts as
/// the first working day, so the due date is `needed - 1` working days later.
///
/// Leave is resolved over a week per working day past the start. Because leave
/// itself pushes the due date out, the placement is checked against the leave that
/// overlaps the actual `[start, due]` span and recomputed until no new interval
/// turns up.
pub fn calculate_task_dates(
    task: &SchedulableTask,
    candidate_start: NaiveDate,
    calendar: &WorkCalendar,
    all_leaves: &[LeaveInterval],
    policy: LeavePolicy,
) -> Result<Option<TaskDates>, CalendarError> {
    let Some(needed) = working_days_needed(task, calendar) else {
        return Ok(None);
    };

    let requested_start = task.start_date.unwrap_or(candidate_start);
    let (window_start, mut window_end) = leave_window(requested_start, needed);

    loop {
        let relevant = AssigneeLeaves::new(
            filter_employee_leaves(all_leaves, &task.assignee_ids, window_start, window_end),
            task.assignee_ids.clone(),
            policy,
        );
        let start_date = calendar.first_working_day_on_or_after(requested_start, &relevant)?;
        let due_date = calendar.add_working_days(start_date, needed - 1, &relevant)?;

        let placed = TaskDates {
            start_date,
            due_date,
            working_days_used: needed,
        };
        if due_date <= window_end {
            return Ok(Some(placed));
        }

        let widened =
            filter_employee_leaves(all_leaves, &task.assignee_ids, window_start, due_date);
        if widened.len() == relevant.len() {
            return Ok(Some(placed));
        }

        trace!(
            task_id = %task.id,
            %window_end,
            %due_date,
            "leave beyond the initial window; widening"
        );
        window_end = due_date;
    }
}
