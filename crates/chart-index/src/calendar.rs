// File: crates/chart-index/src/calendar.rs
// Summary: Calendar capability used by the calendar-bucketing strategy, its default
// chrono-backed implementation, and the ordered unit table.
// Notes:
// - Timestamps are f64 epoch milliseconds (UTC), matching the x channel of time series.
// - Non-finite or out-of-range timestamps are returned unchanged by `align`/`add`
//   and yield a zero span from `diff_in_units`.

use std::fmt;

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarUnit {
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
    Month,
    Year,
}

impl CalendarUnit {
    /// Length in milliseconds for units that have a fixed one.
    pub const fn fixed_millis(self) -> Option<i64> {
        match self {
            CalendarUnit::Millisecond => Some(1),
            CalendarUnit::Second => Some(1_000),
            CalendarUnit::Minute => Some(60_000),
            CalendarUnit::Hour => Some(3_600_000),
            CalendarUnit::Day => Some(86_400_000),
            CalendarUnit::Month | CalendarUnit::Year => None,
        }
    }

    /// Short prefix used in level names (`ms`, `s`, `mi`, `h`, `d`, `mo`, `y`).
    pub const fn prefix(self) -> &'static str {
        match self {
            CalendarUnit::Millisecond => "ms",
            CalendarUnit::Second => "s",
            CalendarUnit::Minute => "mi",
            CalendarUnit::Hour => "h",
            CalendarUnit::Day => "d",
            CalendarUnit::Month => "mo",
            CalendarUnit::Year => "y",
        }
    }
}

/// A calendar unit times a multiple, e.g. 5 minutes or 3 months.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CalendarStep {
    pub unit: CalendarUnit,
    pub multiple: u32,
}

impl CalendarStep {
    pub const fn new(unit: CalendarUnit, multiple: u32) -> Self {
        Self { unit, multiple }
    }
}

impl fmt::Display for CalendarStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.unit.prefix(), self.multiple)
    }
}

/// Entry of the unit table: the level to build and the finer level it is built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnitSpec {
    pub unit: CalendarUnit,
    pub multiple: u32,
    pub name: &'static str,
    pub parent: Option<&'static str>,
}

impl UnitSpec {
    pub const fn new(unit: CalendarUnit, multiple: u32, name: &'static str, parent: Option<&'static str>) -> Self {
        Self { unit, multiple, name, parent }
    }

    pub const fn step(&self) -> CalendarStep { CalendarStep::new(self.unit, self.multiple) }
}

use CalendarUnit::{Day, Hour, Millisecond, Minute, Month, Second, Year};

/// Default unit table, finest first.
pub const DEFAULT_UNITS: &[UnitSpec] = &[
    UnitSpec::new(Millisecond, 1, "ms1", None),
    UnitSpec::new(Millisecond, 2, "ms2", Some("ms1")),
    UnitSpec::new(Millisecond, 5, "ms5", Some("ms1")),
    UnitSpec::new(Millisecond, 10, "ms10", Some("ms5")),
    UnitSpec::new(Millisecond, 50, "ms50", Some("ms10")),
    UnitSpec::new(Millisecond, 100, "ms100", Some("ms50")),
    UnitSpec::new(Millisecond, 500, "ms500", Some("ms100")),
    UnitSpec::new(Second, 1, "s1", Some("ms500")),
    UnitSpec::new(Second, 10, "s10", Some("s1")),
    UnitSpec::new(Second, 30, "s30", Some("s10")),
    UnitSpec::new(Minute, 1, "mi1", Some("s10")),
    UnitSpec::new(Minute, 5, "mi5", Some("mi1")),
    UnitSpec::new(Minute, 10, "mi10", Some("mi5")),
    UnitSpec::new(Minute, 30, "mi30", Some("mi10")),
    UnitSpec::new(Hour, 1, "h1", Some("mi30")),
    UnitSpec::new(Hour, 6, "h6", Some("h1")),
    UnitSpec::new(Hour, 12, "h12", Some("h6")),
    UnitSpec::new(Day, 1, "d1", Some("h12")),
    UnitSpec::new(Day, 7, "d7", Some("d1")),
    UnitSpec::new(Month, 1, "mo1", Some("d1")),
    UnitSpec::new(Month, 3, "mo3", Some("mo1")),
    UnitSpec::new(Month, 6, "mo6", Some("mo3")),
    UnitSpec::new(Year, 1, "y1", Some("mo3")),
    UnitSpec::new(Year, 5, "y5", Some("y1")),
    UnitSpec::new(Year, 10, "y10", Some("y5")),
    UnitSpec::new(Year, 100, "y100", Some("y10")),
];

/// Date arithmetic injected into the calendar-bucketing strategy.
pub trait Calendar: Send + Sync {
    /// Round `timestamp` down to the start of its `multiple`-of-`unit` period.
    fn align(&self, timestamp: f64, unit: CalendarUnit, multiple: u32) -> f64;
    /// Advance `timestamp` by `multiple` units.
    fn add(&self, timestamp: f64, unit: CalendarUnit, multiple: u32) -> f64;
    /// Largest `n` such that `from + n * unit <= to`.
    fn diff_in_units(&self, from: f64, to: f64, unit: CalendarUnit) -> i64;
}

/// UTC calendar on top of chrono. Weeks (7 or 14 days) align to Monday.
#[derive(Clone, Copy, Debug, Default)]
pub struct ChronoCalendar;

impl Calendar for ChronoCalendar {
    fn align(&self, timestamp: f64, unit: CalendarUnit, multiple: u32) -> f64 {
        let Some(dt) = to_datetime(timestamp) else { return timestamp };
        let m = multiple.max(1);
        let date = dt.date_naive();
        let aligned = match unit {
            Millisecond => {
                let ms = dt.timestamp_millis();
                return (ms - ms.rem_euclid(i64::from(m))) as f64;
            }
            Second => date.and_hms_opt(dt.hour(), dt.minute(), floor_to(dt.second(), m)),
            Minute => date.and_hms_opt(dt.hour(), floor_to(dt.minute(), m), 0),
            Hour => date.and_hms_opt(floor_to(dt.hour(), m), 0, 0),
            Day => {
                let day = if m == 7 || m == 14 {
                    date - chrono::Duration::days(i64::from(date.weekday().num_days_from_monday()))
                } else {
                    date
                };
                day.and_hms_opt(0, 0, 0)
            }
            Month => NaiveDate::from_ymd_opt(date.year(), floor_to(date.month0(), m) + 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0)),
            Year => {
                let y = date.year();
                NaiveDate::from_ymd_opt(y - y.rem_euclid(m as i32), 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0))
            }
        };
        aligned.map(to_millis).unwrap_or(timestamp)
    }

    fn add(&self, timestamp: f64, unit: CalendarUnit, multiple: u32) -> f64 {
        if let Some(ms) = unit.fixed_millis() {
            return timestamp + (ms as f64) * f64::from(multiple);
        }
        let Some(dt) = to_datetime(timestamp) else { return timestamp };
        let months = match unit {
            Month => i64::from(multiple),
            _ => i64::from(multiple) * 12,
        };
        shift_months(dt, months).map(|d| d.timestamp_millis() as f64).unwrap_or(f64::INFINITY)
    }

    fn diff_in_units(&self, from: f64, to: f64, unit: CalendarUnit) -> i64 {
        if let Some(ms) = unit.fixed_millis() {
            return ((to - from) / ms as f64).floor() as i64;
        }
        let (Some(a), Some(b)) = (to_datetime(from), to_datetime(to)) else { return 0 };
        let months_per_step = if unit == Month { 1 } else { 12 };
        let est = if unit == Month {
            i64::from(b.year() * 12 + b.month0() as i32) - i64::from(a.year() * 12 + a.month0() as i32)
        } else {
            i64::from(b.year() - a.year())
        };
        match shift_months(a, est * months_per_step) {
            Some(shifted) if shifted > b => est - 1,
            _ => est,
        }
    }
}

fn floor_to(value: u32, multiple: u32) -> u32 { value - value % multiple }

fn to_datetime(timestamp: f64) -> Option<DateTime<Utc>> {
    if !timestamp.is_finite() { return None; }
    DateTime::from_timestamp_millis(timestamp.floor() as i64)
}

fn to_millis(naive: NaiveDateTime) -> f64 { naive.and_utc().timestamp_millis() as f64 }

fn shift_months(dt: DateTime<Utc>, months: i64) -> Option<DateTime<Utc>> {
    let n = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 { dt.checked_add_months(n) } else { dt.checked_sub_months(n) }
}
