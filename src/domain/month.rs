use crate::utils::error::{HakoakeError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 以每月第一天表示的月份，播放清單與排程查詢都以它為單位
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// 接受 `YYYY-MM` 或 `YYYY-MM-DD`，日期部分會被截成當月一日
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        let invalid = || HakoakeError::ValidationError {
            message: format!(
                "Invalid date format: {}. Expected 'YYYY-MM' or 'YYYY-MM-DD'",
                value
            ),
        };

        match value.len() {
            7 => {
                let date = NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d")
                    .map_err(|_| invalid())?;
                Ok(Self::of(date))
            }
            10 => {
                let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| invalid())?;
                Ok(Self::of(date))
            }
            _ => Err(invalid()),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn first_day(&self) -> NaiveDate {
        // 只能由合法日期建構
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn end_exclusive(&self) -> NaiveDate {
        self.next().first_day()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first_day() && date < self.end_exclusive()
    }

    /// e.g. "November"
    pub fn month_name(&self) -> String {
        self.first_day().format("%B").to_string()
    }

    /// e.g. "November 2025"
    pub fn long_name(&self) -> String {
        self.first_day().format("%B %Y").to_string()
    }

    pub fn iter_from(self, count: usize) -> impl Iterator<Item = YearMonth> {
        std::iter::successors(Some(self), |m| Some(m.next())).take(count)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = HakoakeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for YearMonth {
    type Error = HakoakeError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_month_and_day_forms() {
        let month = YearMonth::parse("2025-11").unwrap();
        assert_eq!(month.to_string(), "2025-11");

        let truncated = YearMonth::parse("2025-11-23").unwrap();
        assert_eq!(truncated, month);
        assert_eq!(truncated.first_day(), NaiveDate::from_ymd_opt(2025, 11, 1).unwrap());
    }

    #[test]
    fn test_parse_rejects_other_formats() {
        assert!(YearMonth::parse("2025/11").is_err());
        assert!(YearMonth::parse("2025-13").is_err());
        assert!(YearMonth::parse("Nov 2025").is_err());
        assert!(YearMonth::parse("").is_err());
    }

    #[test]
    fn test_december_rolls_into_next_year() {
        let december = YearMonth::parse("2025-12").unwrap();
        assert_eq!(december.next().to_string(), "2026-01");
        assert_eq!(
            december.end_exclusive(),
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
        );
        assert!(december.contains(NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()));
        assert!(!december.contains(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()));
    }

    #[test]
    fn test_names_and_iteration() {
        let month = YearMonth::parse("2025-11").unwrap();
        assert_eq!(month.month_name(), "November");
        assert_eq!(month.long_name(), "November 2025");

        let months: Vec<String> = month.iter_from(3).map(|m| m.to_string()).collect();
        assert_eq!(months, vec!["2025-11", "2025-12", "2026-01"]);
    }

    #[test]
    fn test_serde_uses_display_form() {
        let month = YearMonth::parse("2026-02").unwrap();
        let json = serde_json::to_string(&month).unwrap();
        assert_eq!(json, "\"2026-02\"");
        let back: YearMonth = serde_json::from_str(&json).unwrap();
        assert_eq!(back, month);
    }
}
