//! Granularity vocabulary: bucket width, truncation and labels.
//!
//! All arithmetic is UTC. Second/minute/hour/day are fixed widths; month and
//! year step on the calendar (day-of-month clamps, e.g. Mar 31 - 1 month is
//! Feb 28/29).

use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unit of time used for bucket width and truncation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Second,
    Minute,
    Hour,
    Day,
    Month,
    Year,
}

/// A granularity string outside the known vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown granularity: {0:?} (expected second|minute|hour|day|month|year)")]
pub struct InvalidGranularityError(pub String);

impl Granularity {
    pub const ALL: [Granularity; 6] = [
        Granularity::Second,
        Granularity::Minute,
        Granularity::Hour,
        Granularity::Day,
        Granularity::Month,
        Granularity::Year,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Granularity::Second => "second",
            Granularity::Minute => "minute",
            Granularity::Hour => "hour",
            Granularity::Day => "day",
            Granularity::Month => "month",
            Granularity::Year => "year",
        }
    }

    /// Round `ts` down to the start of its unit.
    pub fn truncate(self, ts: DateTime<Utc>) -> DateTime<Utc> {
        let date = ts.date_naive();
        let naive = match self {
            Granularity::Second => date.and_hms_opt(ts.hour(), ts.minute(), ts.second()),
            Granularity::Minute => date.and_hms_opt(ts.hour(), ts.minute(), 0),
            Granularity::Hour => date.and_hms_opt(ts.hour(), 0, 0),
            Granularity::Day => Some(date.and_time(NaiveTime::MIN)),
            Granularity::Month => date.with_day(1).map(|d| d.and_time(NaiveTime::MIN)),
            Granularity::Year => {
                NaiveDate::from_ymd_opt(date.year(), 1, 1).map(|d| d.and_time(NaiveTime::MIN))
            }
        };
        // Components come from a valid timestamp, so `None` is unreachable.
        naive.map(|n| n.and_utc()).unwrap_or(ts)
    }

    /// `ts` moved `periods` units into the past. `None` if out of calendar range.
    pub fn step_back(self, ts: DateTime<Utc>, periods: u32) -> Option<DateTime<Utc>> {
        match self.fixed_width(periods) {
            Some(width) => ts.checked_sub_signed(width?),
            None => ts.checked_sub_months(Months::new(self.months(periods)?)),
        }
    }

    /// `ts` moved `periods` units into the future. `None` if out of calendar range.
    pub fn advance(self, ts: DateTime<Utc>, periods: u32) -> Option<DateTime<Utc>> {
        match self.fixed_width(periods) {
            Some(width) => ts.checked_add_signed(width?),
            None => ts.checked_add_months(Months::new(self.months(periods)?)),
        }
    }

    /// Human-readable, locale-independent label for a bucket start.
    pub fn label(self, period_start: DateTime<Utc>) -> String {
        let pattern = match self {
            Granularity::Second => "%H:%M:%S",
            Granularity::Minute | Granularity::Hour => "%H:%M",
            Granularity::Day => "%d/%m",
            Granularity::Month => "%b %y",
            Granularity::Year => "%Y",
        };
        period_start.format(pattern).to_string()
    }

    // Outer `None`: calendar unit. Inner `None`: overflow.
    fn fixed_width(self, periods: u32) -> Option<Option<Duration>> {
        let n = i64::from(periods);
        match self {
            Granularity::Second => Some(Duration::try_seconds(n)),
            Granularity::Minute => Some(Duration::try_minutes(n)),
            Granularity::Hour => Some(Duration::try_hours(n)),
            Granularity::Day => Some(Duration::try_days(n)),
            Granularity::Month | Granularity::Year => None,
        }
    }

    fn months(self, periods: u32) -> Option<u32> {
        match self {
            Granularity::Year => periods.checked_mul(12),
            _ => Some(periods),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = InvalidGranularityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Granularity::ALL
            .into_iter()
            .find(|g| g.as_str() == s.trim())
            .ok_or_else(|| InvalidGranularityError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn truncate_discards_finer_units() {
        let ts = at(2024, 7, 19, 15, 42, 37) + Duration::milliseconds(250);

        assert_eq!(Granularity::Second.truncate(ts), at(2024, 7, 19, 15, 42, 37));
        assert_eq!(Granularity::Minute.truncate(ts), at(2024, 7, 19, 15, 42, 0));
        assert_eq!(Granularity::Hour.truncate(ts), at(2024, 7, 19, 15, 0, 0));
        assert_eq!(Granularity::Day.truncate(ts), at(2024, 7, 19, 0, 0, 0));
        assert_eq!(Granularity::Month.truncate(ts), at(2024, 7, 1, 0, 0, 0));
        assert_eq!(Granularity::Year.truncate(ts), at(2024, 1, 1, 0, 0, 0));
    }

    #[test]
    fn truncate_is_idempotent() {
        let ts = at(2023, 12, 31, 23, 59, 59);
        for g in Granularity::ALL {
            let once = g.truncate(ts);
            assert_eq!(g.truncate(once), once, "{g}");
        }
    }

    #[test]
    fn month_step_clamps_day_of_month() {
        let ts = at(2024, 3, 31, 10, 0, 0);
        let back = Granularity::Month.step_back(ts, 1).unwrap();
        assert_eq!(back, at(2024, 2, 29, 10, 0, 0));
        assert_eq!(Granularity::Month.truncate(back), at(2024, 2, 1, 0, 0, 0));
    }

    #[test]
    fn year_step_moves_twelve_months() {
        let ts = at(2024, 2, 29, 0, 0, 0);
        assert_eq!(
            Granularity::Year.step_back(ts, 1).unwrap(),
            at(2023, 2, 28, 0, 0, 0)
        );
        assert_eq!(
            Granularity::Year.advance(at(2023, 1, 1, 0, 0, 0), 2).unwrap(),
            at(2025, 1, 1, 0, 0, 0)
        );
    }

    #[test]
    fn step_back_reports_overflow() {
        let ts = at(2024, 1, 1, 0, 0, 0);
        assert!(Granularity::Year.step_back(ts, u32::MAX).is_none());
        assert!(Granularity::Day.step_back(ts, u32::MAX).is_none());
    }

    #[test]
    fn labels_follow_fixed_patterns() {
        let ts = at(2024, 1, 5, 9, 7, 3);
        assert_eq!(Granularity::Second.label(ts), "09:07:03");
        assert_eq!(Granularity::Minute.label(ts), "09:07");
        assert_eq!(Granularity::Hour.label(ts), "09:07");
        assert_eq!(Granularity::Day.label(ts), "05/01");
        assert_eq!(Granularity::Month.label(ts), "Jan 24");
        assert_eq!(Granularity::Year.label(ts), "2024");
    }

    #[test]
    fn vocabulary_round_trips_through_strings_and_serde() {
        for g in Granularity::ALL {
            assert_eq!(g.to_string().parse::<Granularity>().unwrap(), g);
            let json = serde_json::to_string(&g).unwrap();
            assert_eq!(json, format!("\"{}\"", g.as_str()));
            assert_eq!(serde_json::from_str::<Granularity>(&json).unwrap(), g);
        }
    }

    #[test]
    fn parse_rejects_unknown_granularity() {
        let err = "week".parse::<Granularity>().unwrap_err();
        assert_eq!(err, InvalidGranularityError("week".to_string()));
    }
}
