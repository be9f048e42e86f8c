use crate::calendar::Unavailability;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaveStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl LeaveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveStatus::Pending => "pending",
            LeaveStatus::Approved => "approved",
            LeaveStatus::Rejected => "rejected",
            LeaveStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(LeaveStatus::Pending),
            "approved" => Some(LeaveStatus::Approved),
            "rejected" => Some(LeaveStatus::Rejected),
            "cancelled" | "canceled" => Some(LeaveStatus::Cancelled),
            _ => None,
        }
    }
}

/// An absence period for one employee. Both endpoints are inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveInterval {
    pub employee_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: LeaveStatus,
}

impl LeaveInterval {
    pub fn approved(
        employee_id: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            employee_id: employee_id.into(),
            start_date,
            end_date,
            status: LeaveStatus::Approved,
        }
    }

    pub fn is_approved(&self) -> bool {
        self.status == LeaveStatus::Approved
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    pub fn overlaps(&self, window_start: NaiveDate, window_end: NaiveDate) -> bool {
        self.start_date <= window_end && self.end_date >= window_start
    }
}

/// A plain list of intervals blocks any date that one of them covers.
impl Unavailability for [LeaveInterval] {
    fn blocks(&self, date: NaiveDate) -> bool {
        self.iter().any(|leave| leave.covers(date))
    }
}

impl Unavailability for Vec<LeaveInterval> {
    fn blocks(&self, date: NaiveDate) -> bool {
        self.as_slice().blocks(date)
    }
}

/// How assignee leave turns into a blocked day for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeavePolicy {
    /// Any assignee being away blocks the day.
    #[default]
    AnyAssignee,
    /// The day is blocked only when every assignee is away.
    AllAssignees,
}

/// Approved leave of one task's assignees, evaluated under a [`LeavePolicy`].
#[derive(Debug, Clone, PartialEq)]
pub struct AssigneeLeaves {
    intervals: Vec<LeaveInterval>,
    assignees: BTreeSet<String>,
    policy: LeavePolicy,
}

impl AssigneeLeaves {
    pub fn new(
        intervals: Vec<LeaveInterval>,
        assignees: BTreeSet<String>,
        policy: LeavePolicy,
    ) -> Self {
        Self {
            intervals,
            assignees,
            policy,
        }
    }

    pub fn intervals(&self) -> &[LeaveInterval] {
        &self.intervals
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }
}

impl Unavailability for AssigneeLeaves {
    fn blocks(&self, date: NaiveDate) -> bool {
        match self.policy {
            LeavePolicy::AnyAssignee => self.intervals.blocks(date),
            LeavePolicy::AllAssignees => {
                !self.assignees.is_empty()
                    && self.assignees.iter().all(|employee| {
                        self.intervals
                            .iter()
                            .any(|leave| &leave.employee_id == employee && leave.covers(date))
                    })
            }
        }
    }
}

/// Approved leave of `assignee_ids` overlapping `[window_start, window_end]`.
pub fn filter_employee_leaves(
    all_leaves: &[LeaveInterval],
    assignee_ids: &BTreeSet<String>,
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> Vec<LeaveInterval> {
    if assignee_ids.is_empty() {
        return Vec::new();
    }
    all_leaves
        .iter()
        .filter(|leave| {
            leave.is_approved()
                && assignee_ids.contains(&leave.employee_id)
                && leave.overlaps(window_start, window_end)
        })
        .cloned()
        .collect()
}

/// Conservative first guess at the calendar span a task of `working_days_needed`
/// days may cover when starting at `start`: a full week per working day.
pub fn leave_window(start: NaiveDate, working_days_needed: u32) -> (NaiveDate, NaiveDate) {
    let span = u64::from(working_days_needed.max(1)) * 7;
    let end = start.checked_add_days(Days::new(span)).unwrap_or(NaiveDate::MAX);
    (start, end)
}
