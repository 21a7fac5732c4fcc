use std::fmt;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use crate::error::{Error, Result};

static RE_MONTH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{2})$").unwrap());

/// The calendar month a report run covers.
///
/// Queries are bounded by the half-open window `[start, end_exclusive)`,
/// so the last instant of the month is included and the first instant of
/// the next month is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportMonth {
    year: i32,
    month: u32,
}

impl ReportMonth {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(Error::MonthParse(format!("month out of range: {month}")));
        }
        Ok(Self { year, month })
    }

    /// The month containing today, in local time.
    pub fn current() -> Self {
        let today = chrono::Local::now().date_naive();
        Self {
            year: today.year(),
            month: today.month(),
        }
    }

    /// Parse a `YYYY-MM` string.
    pub fn parse(s: &str) -> Result<Self> {
        let caps = RE_MONTH
            .captures(s.trim())
            .ok_or_else(|| Error::MonthParse(format!("expected YYYY-MM, got: {s}")))?;
        let year: i32 = caps[1].parse().unwrap();
        let month: u32 = caps[2].parse().unwrap();
        Self::new(year, month)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// First day of the month.
    pub fn start(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap()
    }

    /// First day of the following month.
    pub fn end_exclusive(&self) -> NaiveDate {
        if self.month == 12 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1).unwrap()
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 1, 1).unwrap()
        }
    }

    /// Full English month name, e.g. "August".
    pub fn name(&self) -> String {
        self.start().format("%B").to_string()
    }
}

impl fmt::Display for ReportMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(
            ReportMonth::parse("2026-08").unwrap(),
            ReportMonth::new(2026, 8).unwrap()
        );
        assert_eq!(
            ReportMonth::parse(" 2025-01 ").unwrap(),
            ReportMonth::new(2025, 1).unwrap()
        );
    }

    #[test]
    fn test_parse_invalid() {
        assert!(ReportMonth::parse("2026-13").is_err());
        assert!(ReportMonth::parse("2026-00").is_err());
        assert!(ReportMonth::parse("2026-8").is_err());
        assert!(ReportMonth::parse("garbage").is_err());
    }

    #[test]
    fn test_bounds() {
        let m = ReportMonth::new(2025, 2).unwrap();
        assert_eq!(m.start(), NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
        assert_eq!(
            m.end_exclusive(),
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
        );
    }

    #[test]
    fn test_bounds_december_rollover() {
        let m = ReportMonth::new(2025, 12).unwrap();
        assert_eq!(
            m.end_exclusive(),
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_name_and_display() {
        let m = ReportMonth::new(2026, 8).unwrap();
        assert_eq!(m.name(), "August");
        assert_eq!(m.to_string(), "2026-08");
    }
}
