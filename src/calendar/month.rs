use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Number of days in a month given a zero-based month index.
///
/// Matches "day 0 of the following month": the last day of `month0`.
pub fn days_in_month(year: i32, month0: u32) -> u32 {
    let (next_year, next_month) = if month0 >= 11 { (year + 1, 1) } else { (year, month0 + 2) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(30)
}

/// Weekday of the first of the month, Sunday = 0.
pub fn first_weekday(year: i32, month0: u32) -> u32 {
    NaiveDate::from_ymd_opt(year, month0 + 1, 1)
        .map(|d| d.weekday().num_days_from_sunday())
        .unwrap_or(0)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// The month shown by the calendar grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    /// 1..=12
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month: month.clamp(1, 12) }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self { year: date.year(), month: date.month() }
    }

    pub fn month0(&self) -> u32 {
        self.month - 1
    }

    pub fn step(&self, delta: i32) -> Self {
        let index = self.year * 12 + self.month0() as i32 + delta;
        Self {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn days(&self) -> u32 {
        days_in_month(self.year, self.month0())
    }

    pub fn first_weekday(&self) -> u32 {
        first_weekday(self.year, self.month0())
    }

    pub fn day(&self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn title(&self) -> String {
        format!("{}년 {}월", self.year, self.month)
    }
}
