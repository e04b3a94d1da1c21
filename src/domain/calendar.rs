//! Business-day calendar.
//!
//! A business day is Monday through Friday. No exchange holiday calendar is
//! applied, so a market holiday appears as a business day and is gap-filled
//! from the previous session.

use chrono::{Datelike, NaiveDate, Weekday};

pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Every business day in `[start, end]`, in order.
///
/// Returns an empty vector when `start > end` or when the range holds only a
/// weekend.
pub fn business_days(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    if start > end {
        return Vec::new();
    }
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| is_business_day(*d))
        .collect()
}

/// Monday = 0 through Sunday = 6.
pub fn day_of_week(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_monday()
}

pub fn quarter(date: NaiveDate) -> u32 {
    (date.month() - 1) / 3 + 1
}
