use autoschedule::{
    CalendarConfig, DependencyPolicy, FailurePolicy, LeaveInterval, Priority, SchedulableTask,
    ScheduleError, ScheduleOptions, TaskDuration, auto_schedule_all_tasks,
};
use chrono::NaiveDate;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn task(id: &str, days: f64, deps: &[&str]) -> SchedulableTask {
    SchedulableTask::new(id, TaskDuration::days(days)).with_dependencies(deps.iter().copied())
}

fn gated(options: ScheduleOptions) -> ScheduleOptions {
    options.with_dependency_policy(DependencyPolicy::GateStart)
}

#[test]
fn dependencies_are_ignored_by_default() {
    let tasks = vec![task("a", 2.0, &[]), task("b", 1.0, &["a"])];
    let outcome = auto_schedule_all_tasks(
        &tasks,
        d(2024, 1, 1),
        &CalendarConfig::default(),
        &[],
        &ScheduleOptions::parallel(2),
    )
    .unwrap();
    assert_eq!(outcome.result_for("b").unwrap().start_date, d(2024, 1, 1));
}

#[test]
fn gated_task_waits_for_its_dependency() {
    let tasks = vec![task("a", 2.0, &[]), task("b", 1.0, &["a"])];
    let outcome = auto_schedule_all_tasks(
        &tasks,
        d(2024, 1, 1),
        &CalendarConfig::default(),
        &[],
        &gated(ScheduleOptions::parallel(2)),
    )
    .unwrap();

    let a = outcome.result_for("a").unwrap();
    let b = outcome.result_for("b").unwrap();
    assert_eq!(a.due_date, d(2024, 1, 2));
    assert_eq!(b.start_date, d(2024, 1, 3));
    assert_eq!(b.lane, 1);
}

#[test]
fn dependency_runs_before_higher_priority_dependent() {
    let tasks = vec![
        task("a", 1.0, &[]).with_priority(Priority::Low),
        task("b", 1.0, &["a"]).with_priority(Priority::Urgent),
        task("c", 1.0, &[]).with_priority(Priority::High),
    ];
    let outcome = auto_schedule_all_tasks(
        &tasks,
        d(2024, 1, 1),
        &CalendarConfig::default(),
        &[],
        &gated(ScheduleOptions::sequential()),
    )
    .unwrap();

    let order: Vec<&str> = outcome.results.iter().map(|r| r.task_id.as_str()).collect();
    assert_eq!(order, vec!["c", "a", "b"]);
    assert_eq!(outcome.result_for("b").unwrap().start_date, d(2024, 1, 3));
}

#[test]
fn pinned_start_is_pushed_past_dependency() {
    let tasks = vec![
        task("a", 2.0, &[]),
        task("b", 1.0, &["a"]).with_start_date(d(2024, 1, 1)),
    ];
    let outcome = auto_schedule_all_tasks(
        &tasks,
        d(2024, 1, 1),
        &CalendarConfig::default(),
        &[],
        &gated(ScheduleOptions::parallel(2)),
    )
    .unwrap();
    assert_eq!(outcome.result_for("b").unwrap().start_date, d(2024, 1, 3));
}

#[test]
fn unknown_dependencies_do_not_block() {
    let tasks = vec![task("a", 1.0, &["ghost"]), SchedulableTask::without_duration("idle")];
    let outcome = auto_schedule_all_tasks(
        &tasks,
        d(2024, 1, 1),
        &CalendarConfig::default(),
        &[],
        &gated(ScheduleOptions::sequential()),
    )
    .unwrap();
    assert_eq!(outcome.result_for("a").unwrap().start_date, d(2024, 1, 1));
    assert_eq!(outcome.ineligible, vec!["idle".to_string()]);
}

#[test]
fn cycle_is_reported_with_task_ids() {
    let tasks = vec![task("a", 1.0, &["b"]), task("b", 1.0, &["a"]), task("c", 1.0, &[])];
    let err = auto_schedule_all_tasks(
        &tasks,
        d(2024, 1, 1),
        &CalendarConfig::default(),
        &[],
        &gated(ScheduleOptions::sequential()),
    )
    .unwrap_err();

    match &err {
        ScheduleError::DependencyCycle { task_ids } => {
            assert_eq!(task_ids, &vec!["a".to_string(), "b".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.to_string(), "dependency cycle between tasks a, b");
}

#[test]
fn cycle_is_harmless_when_dependencies_are_ignored() {
    let tasks = vec![task("a", 1.0, &["b"]), task("b", 1.0, &["a"])];
    let outcome = auto_schedule_all_tasks(
        &tasks,
        d(2024, 1, 1),
        &CalendarConfig::default(),
        &[],
        &ScheduleOptions::sequential(),
    )
    .unwrap();
    assert_eq!(outcome.results.len(), 2);
}

#[test]
fn failed_dependency_fails_dependents_under_skip() {
    let tasks = vec![
        task("a", 1.0, &[]).with_assignees(["ana"]),
        task("b", 1.0, &["a"]),
        task("c", 1.0, &[]),
    ];
    let leaves = vec![LeaveInterval::approved("ana", d(2024, 1, 1), d(2026, 12, 31))];
    let config = CalendarConfig::default().with_max_walk_days(200);
    let options = gated(ScheduleOptions::sequential()).with_failure_policy(FailurePolicy::Skip);

    let outcome = auto_schedule_all_tasks(&tasks, d(2024, 1, 1), &config, &leaves, &options).unwrap();

    let failed: Vec<&str> = outcome.failures.iter().map(|f| f.task_id.as_str()).collect();
    assert_eq!(failed, vec!["a", "b"]);
    assert_eq!(outcome.failures[1].reason, "dependency a could not be scheduled");
    assert_eq!(outcome.result_for("c").unwrap().start_date, d(2024, 1, 1));
}
