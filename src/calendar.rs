use crate::error::{CalendarError, ConfigError};
use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const DEFAULT_HOURS_PER_DAY: f64 = 8.0;
pub const DEFAULT_DAYS_PER_WEEK: f64 = 5.0;
pub const DEFAULT_MAX_WALK_DAYS: u32 = 3650;

/// Date-level unavailability layered on top of the calendar, e.g. assignee leave.
pub trait Unavailability {
    fn blocks(&self, date: NaiveDate) -> bool;
}

/// Nothing beyond the calendar itself blocks a day.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLeave;

impl Unavailability for NoLeave {
    fn blocks(&self, _date: NaiveDate) -> bool {
        false
    }
}

/// Serializable calendar settings supplied by the caller for one scheduling run.
///
/// Weekdays use 0=Sunday..6=Saturday. Working hours are `HH:MM` strings and, when
/// both are present, override `hours_per_day`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    pub working_days_of_week: Vec<u8>,
    pub holidays: Vec<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_hours_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_hours_end: Option<String>,
    pub hours_per_day: f64,
    pub days_per_week: f64,
    pub max_walk_days: u32,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            working_days_of_week: vec![1, 2, 3, 4, 5],
            holidays: Vec::new(),
            working_hours_start: None,
            working_hours_end: None,
            hours_per_day: DEFAULT_HOURS_PER_DAY,
            days_per_week: DEFAULT_DAYS_PER_WEEK,
            max_walk_days: DEFAULT_MAX_WALK_DAYS,
        }
    }
}

impl CalendarConfig {
    pub fn new<I, J>(working_days: I, holidays: J) -> Self
    where
        I: IntoIterator<Item = Weekday>,
        J: IntoIterator<Item = NaiveDate>,
    {
        Self {
            working_days_of_week: working_days
                .into_iter()
                .map(|wd| wd.num_days_from_sunday() as u8)
                .collect(),
            holidays: holidays.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn with_working_hours(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.working_hours_start = Some(start.into());
        self.working_hours_end = Some(end.into());
        self
    }

    pub fn with_hours_per_day(mut self, hours: f64) -> Self {
        self.hours_per_day = hours;
        self
    }

    pub fn with_days_per_week(mut self, days: f64) -> Self {
        self.days_per_week = days;
        self
    }

    pub fn with_max_walk_days(mut self, days: u32) -> Self {
        self.max_walk_days = days;
        self
    }

    /// Usable hours per working day: the working-hours span when configured,
    /// otherwise the flat `hours_per_day` fallback.
    pub fn working_hours_per_day(&self) -> Result<f64, ConfigError> {
        match (&self.working_hours_start, &self.working_hours_end) {
            (Some(start_s), Some(end_s)) => {
                let start = parse_clock("working_hours_start", start_s)?;
                let end = parse_clock("working_hours_end", end_s)?;
                let minutes = end.signed_duration_since(start).num_minutes();
                if minutes <= 0 {
                    return Err(ConfigError::NonPositiveHours {
                        start: start_s.clone(),
                        end: end_s.clone(),
                    });
                }
                Ok(minutes as f64 / 60.0)
            }
            (None, None) => {
                if !self.hours_per_day.is_finite() || self.hours_per_day <= 0.0 {
                    return Err(ConfigError::InvalidHoursPerDay(self.hours_per_day));
                }
                Ok(self.hours_per_day)
            }
            _ => Err(ConfigError::IncompleteWorkingHours),
        }
    }

    /// Resolve the configured weekday numbers, sorted Monday first and deduplicated.
    pub fn working_days(&self) -> Result<Vec<Weekday>, ConfigError> {
        let mut days = Vec::with_capacity(self.working_days_of_week.len());
        for &number in &self.working_days_of_week {
            let day = weekday_from_sunday_number(number).ok_or(ConfigError::InvalidWeekday(number))?;
            if !days.contains(&day) {
                days.push(day);
            }
        }
        if days.is_empty() {
            return Err(ConfigError::NoWorkingDays);
        }
        days.sort_by_key(|wd| wd.num_days_from_monday());
        Ok(days)
    }
}

fn parse_clock(field: &'static str, value: &str) -> Result<NaiveTime, ConfigError> {
    let trimmed = value.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| ConfigError::MalformedTime {
            field,
            value: value.to_string(),
        })
}

fn weekday_from_sunday_number(number: u8) -> Option<Weekday> {
    WorkCalendar::SUNDAY_FIRST.get(number as usize).copied()
}

/// Validated, lookup-friendly form of [`CalendarConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct WorkCalendar {
    holidays: HashSet<NaiveDate>,
    non_working_days: HashSet<Weekday>,
    working_hours_start: Option<String>,
    working_hours_end: Option<String>,
    hours_per_day: f64,
    days_per_week: f64,
    max_walk_days: u32,
}

impl Default for WorkCalendar {
    fn default() -> Self {
        Self {
            holidays: HashSet::new(),
            non_working_days: HashSet::from([Weekday::Sat, Weekday::Sun]),
            working_hours_start: None,
            working_hours_end: None,
            hours_per_day: DEFAULT_HOURS_PER_DAY,
            days_per_week: DEFAULT_DAYS_PER_WEEK,
            max_walk_days: DEFAULT_MAX_WALK_DAYS,
        }
    }
}

impl WorkCalendar {
    const SUNDAY_FIRST: [Weekday; 7] = [
        Weekday::Sun,
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
    ];

    pub fn from_config(config: &CalendarConfig) -> Result<Self, ConfigError> {
        let working: HashSet<Weekday> = config.working_days()?.into_iter().collect();
        let hours_per_day = config.working_hours_per_day()?;
        if !config.days_per_week.is_finite() || config.days_per_week <= 0.0 {
            return Err(ConfigError::InvalidDaysPerWeek(config.days_per_week));
        }
        if config.max_walk_days == 0 {
            return Err(ConfigError::InvalidWalkLimit);
        }

        let non_working_days = Self::SUNDAY_FIRST
            .into_iter()
            .filter(|day| !working.contains(day))
            .collect();

        Ok(Self {
            holidays: config.holidays.iter().copied().collect(),
            non_working_days,
            working_hours_start: config.working_hours_start.clone(),
            working_hours_end: config.working_hours_end.clone(),
            hours_per_day,
            days_per_week: config.days_per_week,
            max_walk_days: config.max_walk_days,
        })
    }

    pub fn to_config(&self) -> CalendarConfig {
        let mut working: Vec<Weekday> = Self::SUNDAY_FIRST
            .into_iter()
            .filter(|day| !self.non_working_days.contains(day))
            .collect();
        working.sort_by_key(|wd| wd.num_days_from_monday());

        let mut holidays: Vec<NaiveDate> = self.holidays.iter().copied().collect();
        holidays.sort();

        let has_hours = self.working_hours_start.is_some() && self.working_hours_end.is_some();
        CalendarConfig {
            working_days_of_week: working
                .iter()
                .map(|wd| wd.num_days_from_sunday() as u8)
                .collect(),
            holidays,
            working_hours_start: self.working_hours_start.clone(),
            working_hours_end: self.working_hours_end.clone(),
            hours_per_day: if has_hours {
                DEFAULT_HOURS_PER_DAY
            } else {
                self.hours_per_day
            },
            days_per_week: self.days_per_week,
            max_walk_days: self.max_walk_days,
        }
    }

    pub fn hours_per_day(&self) -> f64 {
        self.hours_per_day
    }

    pub fn days_per_week(&self) -> f64 {
        self.days_per_week
    }

    pub fn max_walk_days(&self) -> u32 {
        self.max_walk_days
    }

    /// Weekday and holiday check only; leave is not considered.
    pub fn is_available(&self, date: NaiveDate) -> bool {
        !self.holidays.contains(&date) && !self.non_working_days.contains(&date.weekday())
    }

    /// Whether `date` can carry work for a task whose relevant leave is `leaves`.
    pub fn is_working_day<U>(&self, date: NaiveDate, leaves: &U) -> bool
    where
        U: Unavailability + ?Sized,
    {
        self.is_available(date) && !leaves.blocks(date)
    }

    /// First working day on or after `date`.
    pub fn first_working_day_on_or_after<U>(
        &self,
        date: NaiveDate,
        leaves: &U,
    ) -> Result<NaiveDate, CalendarError>
    where
        U: Unavailability + ?Sized,
    {
        if self.is_working_day(date, leaves) {
            return Ok(date);
        }
        self.walk_forward(date, 1, leaves)
    }

    /// First calendar-available day strictly after `date`.
    pub fn next_working_day(&self, date: NaiveDate) -> Result<NaiveDate, CalendarError> {
        self.walk_forward(date, 1, &NoLeave)
    }

    /// Advance `days_to_add` working days past `start`. Zero returns `start` as is.
    pub fn add_working_days<U>(
        &self,
        start: NaiveDate,
        days_to_add: u32,
        leaves: &U,
    ) -> Result<NaiveDate, CalendarError>
    where
        U: Unavailability + ?Sized,
    {
        if days_to_add == 0 {
            return Ok(start);
        }
        self.walk_forward(start, days_to_add, leaves)
    }

    /// Count working days in the inclusive range `[start, end]`.
    pub fn count_working_days<U>(&self, start: NaiveDate, end: NaiveDate, leaves: &U) -> u32
    where
        U: Unavailability + ?Sized,
    {
        start
            .iter_days()
            .take_while(|date| *date <= end)
            .filter(|date| self.is_working_day(*date, leaves))
            .count() as u32
    }

    fn walk_forward<U>(
        &self,
        from: NaiveDate,
        days: u32,
        leaves: &U,
    ) -> Result<NaiveDate, CalendarError>
    where
        U: Unavailability + ?Sized,
    {
        let exceeded = CalendarError::WalkLimitExceeded {
            from,
            limit: self.max_walk_days,
        };
        let mut current = from;
        let mut counted = 0;
        let mut walked = 0;

        while counted < days {
            if walked >= self.max_walk_days {
                return Err(exceeded);
            }
            current = current.succ_opt().ok_or_else(|| exceeded.clone())?;
            walked += 1;
            if self.is_working_day(current, leaves) {
                counted += 1;
            }
        }
        Ok(current)
    }
}
