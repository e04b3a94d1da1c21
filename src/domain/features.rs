//! Derived columns: log close and calendar features.

use crate::domain::calendar;
use crate::domain::error::PricenormError;
use chrono::{Datelike, NaiveDate};

/// ln(1 + close). Undefined for close <= -1 and non-finite input.
pub fn log1p_close(date: NaiveDate, close: f64) -> Result<f64, PricenormError> {
    if !close.is_finite() || close <= -1.0 {
        return Err(PricenormError::NumericDomain { date, value: close });
    }
    Ok(close.ln_1p())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarFeatures {
    pub day_of_week: u32,
    pub month: u32,
    pub quarter: u32,
    pub year: i32,
}

impl CalendarFeatures {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            day_of_week: calendar::day_of_week(date),
            month: date.month(),
            quarter: calendar::quarter(date),
            year: date.year(),
        }
    }
}
