pub mod calendar;
pub mod duration;
pub mod error;
pub mod graph;
pub mod leave;
pub mod persistence;
pub mod request;
pub mod scheduler;
pub mod task;

pub use calendar::{CalendarConfig, NoLeave, Unavailability, WorkCalendar};
pub use duration::{DurationUnit, TaskDuration};
pub use error::{CalendarError, ConfigError, ScheduleError};
pub use leave::{AssigneeLeaves, LeaveInterval, LeavePolicy, LeaveStatus, filter_employee_leaves};
pub use persistence::{
    ApplyReport, InMemoryTaskStore, PersistenceError, StoreError, StoredDates, TaskDateStore,
    apply_schedule, load_request_from_json, load_results_from_csv, save_request_to_json,
    save_results_to_csv, save_results_to_json,
};
pub use request::{ScheduleRequest, validate_request};
pub use scheduler::{
    DependencyPolicy, FailurePolicy, ScheduleOptions, ScheduleOutcome, SchedulingMode,
    TaskFailure, auto_schedule_all_tasks, calculate_task_dates, schedule_with_calendar,
};
pub use task::{Priority, SchedulableTask, ScheduleResult};
