use autoschedule::{CalendarConfig, DurationUnit, TaskDuration, WorkCalendar};

fn calendar_from(config: CalendarConfig) -> WorkCalendar {
    WorkCalendar::from_config(&config).unwrap()
}

#[test]
fn hours_divide_by_eight_hour_day() {
    let cal = calendar_from(CalendarConfig::default());
    assert_eq!(TaskDuration::hours(8.0).to_working_days(&cal), 1);
    assert_eq!(TaskDuration::hours(16.0).to_working_days(&cal), 2);
    assert_eq!(TaskDuration::hours(17.0).to_working_days(&cal), 3);
    assert_eq!(TaskDuration::hours(1.0).to_working_days(&cal), 1);
}

#[test]
fn weeks_use_days_per_week() {
    let cal = calendar_from(CalendarConfig::default());
    assert_eq!(TaskDuration::weeks(1.0).to_working_days(&cal), 5);
    assert_eq!(TaskDuration::weeks(1.5).to_working_days(&cal), 8);

    let six_day = calendar_from(CalendarConfig::default().with_days_per_week(6.0));
    assert_eq!(TaskDuration::weeks(2.0).to_working_days(&six_day), 12);
}

#[test]
fn minutes_convert_through_hours() {
    let cal = calendar_from(CalendarConfig::default());
    assert_eq!(TaskDuration::minutes(480.0).to_working_days(&cal), 1);
    assert_eq!(TaskDuration::minutes(481.0).to_working_days(&cal), 2);
    assert_eq!(TaskDuration::minutes(30.0).to_working_days(&cal), 1);
}

#[test]
fn shorter_working_hours_double_the_day_count() {
    let full = calendar_from(CalendarConfig::default().with_working_hours("09:00", "17:00"));
    let half = calendar_from(CalendarConfig::default().with_working_hours("09:00", "13:00"));
    let duration = TaskDuration::hours(16.0);
    assert_eq!(duration.to_working_days(&full), 2);
    assert_eq!(duration.to_working_days(&half), 4);
}

#[test]
fn working_hours_override_flat_hours_per_day() {
    let cal = calendar_from(
        CalendarConfig::default()
            .with_hours_per_day(2.0)
            .with_working_hours("08:00", "18:00"),
    );
    assert_eq!(cal.hours_per_day(), 10.0);
    assert_eq!(TaskDuration::hours(20.0).to_working_days(&cal), 2);
}

#[test]
fn duration_serializes_with_lowercase_unit() {
    let json = serde_json::to_string(&TaskDuration::new(3.0, DurationUnit::Days)).unwrap();
    assert_eq!(json, r#"{"value":3.0,"unit":"days"}"#);
    let back: TaskDuration = serde_json::from_str(r#"{"value":90,"unit":"minutes"}"#).unwrap();
    assert_eq!(back, TaskDuration::minutes(90.0));
}

#[test]
fn any_positive_duration_needs_a_day() {
    let cal = calendar_from(CalendarConfig::default());
    assert_eq!(TaskDuration::minutes(1e-7).to_working_days(&cal), 1);
    assert_eq!(TaskDuration::weeks(1e-15).to_working_days(&cal), 1);
}

#[test]
fn parse_error_is_a_std_error() {
    let err: Box<dyn std::error::Error> = "12x".parse::<TaskDuration>().unwrap_err().into();
    assert!(err.to_string().starts_with("invalid duration '12x'"));
}
