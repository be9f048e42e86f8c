use crate::duration::TaskDuration;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Urgent,
    High,
    Medium,
    Low,
    #[default]
    None,
}

impl Priority {
    pub fn variants() -> [Priority; 5] {
        [
            Priority::Urgent,
            Priority::High,
            Priority::Medium,
            Priority::Low,
            Priority::None,
        ]
    }

    /// Sort key; lower ranks are scheduled first.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Urgent => 0,
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
            Priority::None => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Urgent => "urgent",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
            Priority::None => "none",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let needle = value.trim().to_ascii_lowercase();
        Self::variants().into_iter().find(|p| p.as_str() == needle)
    }
}

/// A task as handed to the scheduler by the task store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulableTask {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<TaskDuration>,
    #[serde(default)]
    pub assignee_ids: BTreeSet<String>,
    #[serde(default)]
    pub priority: Priority,
    /// Pinned start; overrides the cursor the scheduler would otherwise use.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    /// Only consulted under `DependencyPolicy::GateStart`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
}

impl SchedulableTask {
    pub fn new(id: impl Into<String>, duration: TaskDuration) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            duration: Some(duration),
            assignee_ids: BTreeSet::new(),
            priority: Priority::None,
            start_date: None,
            dependencies: Vec::new(),
        }
    }

    pub fn without_duration(id: impl Into<String>) -> Self {
        Self {
            duration: None,
            ..Self::new(id, TaskDuration::days(0.0))
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_assignees<I, S>(mut self, assignees: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.assignee_ids = assignees.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }
}

/// Computed dates for one task. Callers persist these by `task_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleResult {
    pub task_id: String,
    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
    pub working_days_used: u32,
    #[serde(default)]
    pub lane: usize,
}
