//! Reporting periods and cadences.
//!
//! A period is a half-open UTC range `[start, end)`. Historical snapshots are
//! computed over calendar days and calendar months; the scheduler derives the
//! "previous full day/month" variants from the current wall clock.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Scheduling cadence for historical aggregation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
    Daily,
    Monthly,
}

impl Cadence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Monthly => "monthly",
        }
    }
}

/// Metric families produced by the collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricFamily {
    Sales,
    Inventory,
    Customer,
    RealTime,
}

impl MetricFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sales => "sales",
            Self::Inventory => "inventory",
            Self::Customer => "customer",
            Self::RealTime => "real_time",
        }
    }
}

impl std::fmt::Display for MetricFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A closed reporting period, represented as half-open `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Period {
    /// Creates an arbitrary period. Fails if `end <= start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if end <= start {
            return Err(Error::invalid_period(format!(
                "end {} is not after start {}",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    /// The full calendar day `date`, midnight to midnight UTC.
    pub fn day(date: NaiveDate) -> Self {
        let start = Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap());
        Self {
            start,
            end: start + Duration::days(1),
        }
    }

    /// The full calendar month, first midnight to first midnight of the next month.
    pub fn month(year: i32, month: u32) -> Result<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| Error::invalid_period(format!("invalid month {}-{:02}", year, month)))?;
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1).unwrap()
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1).unwrap()
        };
        Ok(Self {
            start: Utc.from_utc_datetime(&first.and_hms_opt(0, 0, 0).unwrap()),
            end: Utc.from_utc_datetime(&next.and_hms_opt(0, 0, 0).unwrap()),
        })
    }

    /// The previous full day relative to `now`.
    pub fn previous_day(now: DateTime<Utc>) -> Self {
        Self::day(now.date_naive() - Duration::days(1))
    }

    /// The previous full calendar month relative to `now`.
    pub fn previous_month(now: DateTime<Utc>) -> Self {
        let date = now.date_naive();
        let (year, month) = if date.month() == 1 {
            (date.year() - 1, 12)
        } else {
            (date.year(), date.month() - 1)
        };
        // Both components are valid by construction.
        Self::month(year, month).unwrap()
    }

    /// Whether `ts` falls inside the period.
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts < self.end
    }

    /// The period immediately preceding this one, with the same length.
    ///
    /// Used for cohort comparison between consecutive periods.
    pub fn previous(&self) -> Self {
        let len = self.end - self.start;
        Self {
            start: self.start - len,
            end: self.start,
        }
    }

    /// Human-readable label for log lines.
    pub fn label(&self) -> String {
        format!(
            "{}..{}",
            self.start.format("%Y-%m-%dT%H:%M:%SZ"),
            self.end.format("%Y-%m-%dT%H:%M:%SZ")
        )
    }
}
