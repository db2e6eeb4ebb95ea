//! Calendar-month keys for projection periods and plan effective dates

use crate::error::PeriodParseError;
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A calendar month (year + month 1-12)
///
/// Ordering is chronological. Displays and serializes as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u8,
}

impl YearMonth {
    /// Create from a year and a 1-based month, `None` if the month is out of range
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month: month as u8 })
        } else {
            None
        }
    }

    /// Month containing the given date
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month() as u8,
        }
    }

    /// Month containing today's local date
    pub fn current() -> Self {
        Self::from_date(Local::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month as u32
    }

    /// First calendar day of the month
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month(), 1)
    }

    /// The month `months` after this one
    pub fn offset(&self, months: u32) -> Self {
        Self::from_index(self.index() + months as i64)
    }

    /// Signed number of months from `earlier` to `self`
    pub fn months_since(&self, earlier: &YearMonth) -> i64 {
        self.index() - earlier.index()
    }

    fn index(&self) -> i64 {
        self.year as i64 * 12 + (self.month as i64 - 1)
    }

    fn from_index(index: i64) -> Self {
        Self {
            year: index.div_euclid(12) as i32,
            month: (index.rem_euclid(12) + 1) as u8,
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = PeriodParseError;

    /// Accepts `YYYY-MM`, `YYYY/MM`, `YYYY-MM-DD`, `YYYY/MM/DD`, and timestamps
    /// whose first ten characters are a date (`2025-04-01 00:00:00`, `2025-04-01T00:00`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let date_part = trimmed
            .split(|c: char| c == ' ' || c == 'T')
            .next()
            .unwrap_or(trimmed)
            .replace('/', "-");

        let date = match date_part.matches('-').count() {
            1 => NaiveDate::parse_from_str(&format!("{date_part}-01"), "%Y-%m-%d"),
            2 => NaiveDate::parse_from_str(&date_part, "%Y-%m-%d"),
            _ => return Err(PeriodParseError(s.to_string())),
        };

        date.map(Self::from_date)
            .map_err(|_| PeriodParseError(s.to_string()))
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    #[test]
    fn test_parse_formats() {
        assert_eq!("2025-04".parse::<YearMonth>().unwrap(), ym(2025, 4));
        assert_eq!("2025/4".parse::<YearMonth>().unwrap(), ym(2025, 4));
        assert_eq!("2025-04-17".parse::<YearMonth>().unwrap(), ym(2025, 4));
        assert_eq!("2025/12/01".parse::<YearMonth>().unwrap(), ym(2025, 12));
        assert_eq!("2025-04-01 00:00:00".parse::<YearMonth>().unwrap(), ym(2025, 4));
        assert_eq!(" 2025-04-01T09:30:00 ".parse::<YearMonth>().unwrap(), ym(2025, 4));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<YearMonth>().is_err());
        assert!("April".parse::<YearMonth>().is_err());
        assert!("2025-13".parse::<YearMonth>().is_err());
        assert!("2025-02-30".parse::<YearMonth>().is_err());
    }

    #[test]
    fn test_offset_crosses_year_boundary() {
        let start = ym(2025, 11);
        assert_eq!(start.offset(0), start);
        assert_eq!(start.offset(2), ym(2026, 1));
        assert_eq!(start.offset(59), ym(2030, 10));
        assert_eq!(start.offset(59).months_since(&start), 59);
        assert_eq!(start.months_since(&start.offset(3)), -3);
    }

    #[test]
    fn test_display_and_ordering() {
        assert_eq!(ym(2025, 4).to_string(), "2025-04");
        assert!(ym(2025, 12) < ym(2026, 1));
        assert!(ym(2025, 4) < ym(2025, 5));
        assert_eq!(ym(2025, 4).first_day(), NaiveDate::from_ymd_opt(2025, 4, 1));
    }

    #[test]
    fn test_new_rejects_bad_month() {
        assert!(YearMonth::new(2025, 0).is_none());
        assert!(YearMonth::new(2025, 13).is_none());
    }
}
