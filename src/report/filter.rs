//! Date-range presets and the clock they are resolved against

use chrono::{Datelike, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::model::ParseEnumError;

/// Closed, inclusive range of calendar dates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Whole calendar month containing `year`/`month`
    pub fn month(year: i32, month: u32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        Some(Self {
            start,
            end: next.pred_opt()?,
        })
    }

    /// Whole calendar year
    pub fn year(year: i32) -> Option<Self> {
        Some(Self {
            start: NaiveDate::from_ymd_opt(year, 1, 1)?,
            end: NaiveDate::from_ymd_opt(year, 12, 31)?,
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// `start_date` / `end_date` query parameters in ISO form
    pub fn query_pairs(&self) -> [(&'static str, String); 2] {
        [
            ("start_date", self.start.format("%Y-%m-%d").to_string()),
            ("end_date", self.end.format("%Y-%m-%d").to_string()),
        ]
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Named preset resolved to explicit bounds at query time
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DateFilter {
    #[default]
    All,
    ThisMonth,
    LastMonth,
    ThisYear,
}

impl DateFilter {
    pub fn all() -> &'static [DateFilter] {
        &[
            DateFilter::All,
            DateFilter::ThisMonth,
            DateFilter::LastMonth,
            DateFilter::ThisYear,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DateFilter::All => "all",
            DateFilter::ThisMonth => "this-month",
            DateFilter::LastMonth => "last-month",
            DateFilter::ThisYear => "this-year",
        }
    }

    /// Resolve the preset against `today`.
    ///
    /// `All` yields no bounds: the backend returns the full set.
    pub fn bounds(&self, today: NaiveDate) -> Option<DateRange> {
        match self {
            DateFilter::All => None,
            DateFilter::ThisMonth => DateRange::month(today.year(), today.month()),
            DateFilter::LastMonth => {
                if today.month() == 1 {
                    DateRange::month(today.year() - 1, 12)
                } else {
                    DateRange::month(today.year(), today.month() - 1)
                }
            }
            DateFilter::ThisYear => DateRange::year(today.year()),
        }
    }
}

impl std::fmt::Display for DateFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateFilter {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "all" => Ok(DateFilter::All),
            "this-month" => Ok(DateFilter::ThisMonth),
            "last-month" => Ok(DateFilter::LastMonth),
            "this-year" => Ok(DateFilter::ThisYear),
            other => Err(ParseEnumError {
                kind: "date filter",
                value: other.to_string(),
                expected: "all, this-month, last-month, this-year",
            }),
        }
    }
}

/// Which calendar decides what "today" is
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CalendarZone {
    #[default]
    Local,
    Utc,
}

impl FromStr for CalendarZone {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(CalendarZone::Local),
            "utc" => Ok(CalendarZone::Utc),
            other => Err(ParseEnumError {
                kind: "calendar",
                value: other.to_string(),
                expected: "local, utc",
            }),
        }
    }
}

/// Source of the current calendar date.
///
/// Transaction dates are plain calendar dates; only "today" depends on a
/// time zone, and the zone is chosen explicitly.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall clock read in the configured calendar
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    pub zone: CalendarZone,
}

impl SystemClock {
    pub fn new(zone: CalendarZone) -> Self {
        Self { zone }
    }
}

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        match self.zone {
            CalendarZone::Local => Local::now().date_naive(),
            CalendarZone::Utc => Utc::now().date_naive(),
        }
    }
}

/// Clock pinned to one date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
