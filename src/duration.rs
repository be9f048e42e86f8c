use crate::calendar::WorkCalendar;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Tolerance applied before rounding up so that float noise such as
/// `16.000000000000004` hours does not spill into an extra day.
const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationUnit {
    Minutes,
    Hours,
    Days,
    Weeks,
}

impl DurationUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            DurationUnit::Minutes => "minutes",
            DurationUnit::Hours => "hours",
            DurationUnit::Days => "days",
            DurationUnit::Weeks => "weeks",
        }
    }

    fn suffix(&self) -> &'static str {
        match self {
            DurationUnit::Minutes => "m",
            DurationUnit::Hours => "h",
            DurationUnit::Days => "d",
            DurationUnit::Weeks => "w",
        }
    }
}

/// Estimated effort for a task.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaskDuration {
    pub value: f64,
    pub unit: DurationUnit,
}

impl TaskDuration {
    pub fn new(value: f64, unit: DurationUnit) -> Self {
        Self { value, unit }
    }

    pub fn minutes(value: f64) -> Self {
        Self::new(value, DurationUnit::Minutes)
    }

    pub fn hours(value: f64) -> Self {
        Self::new(value, DurationUnit::Hours)
    }

    pub fn days(value: f64) -> Self {
        Self::new(value, DurationUnit::Days)
    }

    pub fn weeks(value: f64) -> Self {
        Self::new(value, DurationUnit::Weeks)
    }

    /// Whole working days this duration occupies on `calendar`.
    ///
    /// Minutes and hours are divided by the calendar's daily working span, weeks are
    /// multiplied by its days-per-week; every unit rounds up. A non-positive or
    /// non-finite value normalizes to zero, which marks the task as unschedulable.
    pub fn to_working_days(&self, calendar: &WorkCalendar) -> u32 {
        if !self.value.is_finite() || self.value <= 0.0 {
            return 0;
        }
        let hours_per_day = calendar.hours_per_day();
        let raw = match self.unit {
            DurationUnit::Minutes => self.value / (hours_per_day * 60.0),
            DurationUnit::Hours => self.value / hours_per_day,
            DurationUnit::Days => self.value,
            DurationUnit::Weeks => self.value * calendar.days_per_week(),
        };
        round_up_days(raw)
    }
}

fn round_up_days(raw: f64) -> u32 {
    if raw <= 0.0 {
        return 0;
    }
    // Any positive effort needs at least one day.
    let days = (raw - EPSILON).ceil().max(1.0);
    if days >= u32::MAX as f64 {
        u32::MAX
    } else {
        days as u32
    }
}

impl fmt::Display for TaskDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.suffix())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid duration '{0}' (expected a number followed by m, h, d or w)")]
pub struct ParseDurationError(String);

impl FromStr for TaskDuration {
    type Err = ParseDurationError;

    /// Parses compact forms such as `90m`, `16h`, `3d` or `1.5w`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || ParseDurationError(s.to_string());
        let suffix = trimmed.chars().last().ok_or_else(invalid)?;
        let unit = match suffix.to_ascii_lowercase() {
            'm' => DurationUnit::Minutes,
            'h' => DurationUnit::Hours,
            'd' => DurationUnit::Days,
            'w' => DurationUnit::Weeks,
            _ => return Err(invalid()),
        };
        let value: f64 = trimmed[..trimmed.len() - suffix.len_utf8()]
            .parse()
            .map_err(|_| invalid())?;
        if !value.is_finite() || value <= 0.0 {
            return Err(invalid());
        }
        Ok(Self::new(value, unit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::CalendarConfig;

    fn calendar(hours_per_day: f64) -> WorkCalendar {
        WorkCalendar::from_config(&CalendarConfig::default().with_hours_per_day(hours_per_day))
            .unwrap()
    }

    #[test]
    fn fractional_days_round_up() {
        assert_eq!(TaskDuration::days(2.2).to_working_days(&calendar(8.0)), 3);
        assert_eq!(TaskDuration::days(2.0).to_working_days(&calendar(8.0)), 2);
    }

    #[test]
    fn float_noise_does_not_add_a_day() {
        let cal = calendar(7.5);
        assert_eq!(TaskDuration::hours(15.0).to_working_days(&cal), 2);
        assert_eq!(TaskDuration::hours(0.1 + 0.2 + 14.7).to_working_days(&cal), 2);
    }

    #[test]
    fn tiny_positive_effort_still_takes_a_day() {
        let cal = calendar(8.0);
        assert_eq!(TaskDuration::minutes(1e-7).to_working_days(&cal), 1);
        assert_eq!(TaskDuration::days(1e-12).to_working_days(&cal), 1);
    }

    #[test]
    fn non_positive_values_normalize_to_zero() {
        let cal = calendar(8.0);
        assert_eq!(TaskDuration::hours(0.0).to_working_days(&cal), 0);
        assert_eq!(TaskDuration::hours(-4.0).to_working_days(&cal), 0);
        assert_eq!(TaskDuration::hours(f64::NAN).to_working_days(&cal), 0);
    }

    #[test]
    fn parses_compact_forms() {
        assert_eq!("90m".parse::<TaskDuration>().unwrap(), TaskDuration::minutes(90.0));
        assert_eq!("1.5w".parse::<TaskDuration>().unwrap(), TaskDuration::weeks(1.5));
        assert!("3x".parse::<TaskDuration>().is_err());
        assert!("h".parse::<TaskDuration>().is_err());
        assert!("0d".parse::<TaskDuration>().is_err());
    }
}
