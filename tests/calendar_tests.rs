use autoschedule::{
    CalendarConfig, CalendarError, ConfigError, LeaveInterval, NoLeave, WorkCalendar,
};
use chrono::{Datelike, NaiveDate, Weekday};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn weekday_calendar(holidays: &[NaiveDate]) -> WorkCalendar {
    let config = CalendarConfig::new(
        [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
        ],
        holidays.iter().copied(),
    );
    WorkCalendar::from_config(&config).unwrap()
}

#[test]
fn weekends_are_not_working_days() {
    let cal = weekday_calendar(&[]);
    // 2024-01-06 is a Saturday, 2024-01-07 is a Sunday
    assert!(!cal.is_working_day(d(2024, 1, 6), &NoLeave));
    assert!(!cal.is_working_day(d(2024, 1, 7), &NoLeave));
    assert!(cal.is_working_day(d(2024, 1, 8), &NoLeave));
}

#[test]
fn holidays_are_never_working_days() {
    let holidays = [d(2024, 1, 3), d(2024, 12, 25), d(2024, 7, 6)];
    let cal = weekday_calendar(&holidays);
    for holiday in holidays {
        assert!(!cal.is_working_day(holiday, &NoLeave), "{holiday} should be blocked");
    }
}

#[test]
fn every_week_has_a_working_day_without_full_coverage() {
    let config = CalendarConfig {
        working_days_of_week: vec![3],
        holidays: vec![d(2024, 1, 3)],
        ..CalendarConfig::default()
    };
    let cal = WorkCalendar::from_config(&config).unwrap();

    for offset in 0..60u64 {
        let window_start = d(2024, 1, 4) + chrono::Days::new(offset);
        let has_working_day = window_start
            .iter_days()
            .take(7)
            .any(|date| cal.is_working_day(date, &NoLeave));
        assert!(has_working_day, "no working day in week starting {window_start}");
    }
}

#[test]
fn leave_blocks_covered_days_inclusive() {
    let cal = weekday_calendar(&[]);
    let leaves = vec![LeaveInterval::approved("ana", d(2024, 1, 9), d(2024, 1, 10))];
    assert!(cal.is_working_day(d(2024, 1, 8), &leaves));
    assert!(!cal.is_working_day(d(2024, 1, 9), &leaves));
    assert!(!cal.is_working_day(d(2024, 1, 10), &leaves));
    assert!(cal.is_working_day(d(2024, 1, 11), &leaves));
}

#[test]
fn adding_zero_days_returns_start() {
    let cal = weekday_calendar(&[]);
    // Even a Saturday comes back unchanged.
    assert_eq!(cal.add_working_days(d(2024, 1, 6), 0, &NoLeave), Ok(d(2024, 1, 6)));
    assert_eq!(cal.add_working_days(d(2024, 1, 2), 0, &NoLeave), Ok(d(2024, 1, 2)));
}

#[test]
fn add_working_days_skips_weekend_and_holiday() {
    let cal = weekday_calendar(&[d(2024, 1, 3)]);
    // Mon + 2 working days, Wed is a holiday.
    assert_eq!(cal.add_working_days(d(2024, 1, 1), 2, &NoLeave), Ok(d(2024, 1, 4)));
    // Fri + 1 lands on Monday.
    let next = cal.add_working_days(d(2024, 1, 5), 1, &NoLeave).unwrap();
    assert_eq!(next.weekday(), Weekday::Mon);
    assert_eq!(next, d(2024, 1, 8));
}

#[test]
fn next_working_day_is_strictly_after() {
    let cal = weekday_calendar(&[]);
    assert_eq!(cal.next_working_day(d(2024, 1, 1)), Ok(d(2024, 1, 2)));
    assert_eq!(cal.next_working_day(d(2024, 1, 5)), Ok(d(2024, 1, 8)));
}

#[test]
fn first_working_day_on_or_after_keeps_working_days() {
    let cal = weekday_calendar(&[]);
    assert_eq!(cal.first_working_day_on_or_after(d(2024, 1, 2), &NoLeave), Ok(d(2024, 1, 2)));
    assert_eq!(cal.first_working_day_on_or_after(d(2024, 1, 6), &NoLeave), Ok(d(2024, 1, 8)));
}

#[test]
fn count_working_days_respects_leave() {
    let cal = weekday_calendar(&[]);
    let leaves = vec![LeaveInterval::approved("ana", d(2024, 1, 9), d(2024, 1, 10))];
    assert_eq!(cal.count_working_days(d(2024, 1, 8), d(2024, 1, 12), &NoLeave), 5);
    assert_eq!(cal.count_working_days(d(2024, 1, 8), d(2024, 1, 12), &leaves), 3);
}

#[test]
fn all_holiday_calendar_hits_walk_limit() {
    let holidays: Vec<NaiveDate> = d(2024, 1, 1).iter_days().take(400).collect();
    let config = CalendarConfig {
        holidays,
        ..CalendarConfig::default()
    }
    .with_max_walk_days(365);
    let cal = WorkCalendar::from_config(&config).unwrap();

    assert_eq!(
        cal.add_working_days(d(2024, 1, 1), 3, &NoLeave),
        Err(CalendarError::WalkLimitExceeded {
            from: d(2024, 1, 1),
            limit: 365
        })
    );
}

#[test]
fn invalid_configurations_are_rejected() {
    let empty = CalendarConfig {
        working_days_of_week: Vec::new(),
        ..CalendarConfig::default()
    };
    assert_eq!(WorkCalendar::from_config(&empty), Err(ConfigError::NoWorkingDays));

    let inverted = CalendarConfig::default().with_working_hours("17:00", "09:00");
    assert!(matches!(
        WorkCalendar::from_config(&inverted),
        Err(ConfigError::NonPositiveHours { .. })
    ));

    let malformed = CalendarConfig::default().with_working_hours("nine", "17:00");
    assert_eq!(
        WorkCalendar::from_config(&malformed),
        Err(ConfigError::MalformedTime {
            field: "working_hours_start",
            value: "nine".into()
        })
    );

    let zero_hours = CalendarConfig::default().with_hours_per_day(0.0);
    assert_eq!(
        WorkCalendar::from_config(&zero_hours),
        Err(ConfigError::InvalidHoursPerDay(0.0))
    );

    let zero_week = CalendarConfig::default().with_days_per_week(0.0);
    assert_eq!(
        WorkCalendar::from_config(&zero_week),
        Err(ConfigError::InvalidDaysPerWeek(0.0))
    );
}

#[test]
fn config_deserializes_with_defaults() {
    let config: CalendarConfig = serde_json::from_str(
        r#"{ "working_days_of_week": [1, 2, 3, 4, 5, 6], "working_hours_start": "09:00", "working_hours_end": "13:00" }"#,
    )
    .unwrap();
    let cal = WorkCalendar::from_config(&config).unwrap();
    assert_eq!(cal.hours_per_day(), 4.0);
    assert_eq!(cal.days_per_week(), 5.0);
    assert_eq!(cal.max_walk_days(), 3650);
    assert!(cal.is_available(d(2024, 1, 6)));
    assert!(!cal.is_available(d(2024, 1, 7)));
}
