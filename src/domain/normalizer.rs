//! Series normalizer: raw daily series to cleaned, feature-augmented series.
//!
//! Pipeline, in order:
//! 1. reindex onto the business-day calendar spanning the input
//! 2. forward-fill every field
//! 3. rolling-band outlier correction on close
//! 4. standardize close with a scaler fit on this series only
//! 5. ln(1 + close)
//! 6. calendar features
//!
//! Dates are `NaiveDate` throughout, so the output carries no time of day and
//! no offset. The transform is pure: warnings are returned, not logged.

use crate::domain::calendar::business_days;
use crate::domain::error::PricenormError;
use crate::domain::features::{log1p_close, CalendarFeatures};
use crate::domain::outlier::{Correction, OutlierBand};
use crate::domain::scaler::FittedScaler;
use crate::domain::series::{CleanedObservation, CleanedSeries, RawObservation, RawSeries};
use std::fmt;

/// Conditions that do not stop normalization but should be surfaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizeWarning {
    /// Fewer than two business days: no rolling history, scaler yields 0.0.
    DegenerateSeries { business_days: usize },
    /// Input rows dated on a weekend are not part of the calendar.
    NonBusinessDaysDropped { count: usize },
    /// Leading calendar rows with no prior close to forward-fill from.
    LeadingNullClose { rows: usize },
}

impl fmt::Display for NormalizeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizeWarning::DegenerateSeries { business_days } => write!(
                f,
                "degenerate series: {} business day(s), outlier correction and standardization are no-ops",
                business_days
            ),
            NormalizeWarning::NonBusinessDaysDropped { count } => {
                write!(f, "dropped {} row(s) dated on a weekend", count)
            }
            NormalizeWarning::LeadingNullClose { rows } => {
                write!(f, "{} leading row(s) have no close to forward-fill", rows)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Normalization {
    pub series: CleanedSeries,
    /// `None` only when no row has a close after gap filling.
    pub scaler: Option<FittedScaler>,
    pub corrections: Vec<Correction>,
    pub warnings: Vec<NormalizeWarning>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SeriesNormalizer {
    band: OutlierBand,
}

impl SeriesNormalizer {
    pub fn new(band: OutlierBand) -> Self {
        Self { band }
    }

    pub fn normalize(&self, series: &RawSeries) -> Result<Normalization, PricenormError> {
        validate(series)?;
        let mut warnings = Vec::new();

        // validate() guarantees at least one row
        let (start, end) = match (series.first_date(), series.last_date()) {
            (Some(s), Some(e)) => (s, e),
            _ => return Err(PricenormError::EmptyInput),
        };
        let calendar = business_days(start, end);
        if calendar.is_empty() {
            return Err(PricenormError::NoBusinessDays { start, end });
        }
        if calendar.len() < 2 {
            warnings.push(NormalizeWarning::DegenerateSeries {
                business_days: calendar.len(),
            });
        }

        let (mut rows, dropped) = reindex(&series.observations, &calendar);
        if dropped > 0 {
            warnings.push(NormalizeWarning::NonBusinessDaysDropped { count: dropped });
        }
        forward_fill(&mut rows);

        let leading = rows.iter().take_while(|r| r.close.is_none()).count();
        if leading > 0 {
            warnings.push(NormalizeWarning::LeadingNullClose { rows: leading });
        }

        let mut closes: Vec<Option<f64>> = rows.iter().map(|r| r.close).collect();
        let corrections = self.band.correct(&mut closes);

        let scaler = FittedScaler::fit(&closes);
        let standardized = match scaler {
            Some(s) => s.transform_all(&closes),
            None => vec![None; closes.len()],
        };
        let mut observations = Vec::with_capacity(rows.len());
        for ((row, close), close_standardized) in rows.into_iter().zip(closes).zip(standardized) {
            let close_log = close.map(|c| log1p_close(row.date, c)).transpose()?;
            let features = CalendarFeatures::from_date(row.date);
            observations.push(CleanedObservation {
                date: row.date,
                open: row.open,
                high: row.high,
                low: row.low,
                close,
                volume: row.volume,
                close_standardized,
                close_log,
                day_of_week: features.day_of_week,
                month: features.month,
                quarter: features.quarter,
                year: features.year,
            });
        }

        Ok(Normalization {
            series: CleanedSeries {
                symbol: series.symbol.clone(),
                columns: series.columns,
                observations,
            },
            scaler,
            corrections,
            warnings,
        })
    }
}

fn validate(series: &RawSeries) -> Result<(), PricenormError> {
    if series.is_empty() {
        return Err(PricenormError::EmptyInput);
    }
    if !series.columns.close || series.observations.iter().all(|o| o.close.is_none()) {
        return Err(PricenormError::MissingField {
            field: "close".into(),
        });
    }
    for (i, pair) in series.observations.windows(2).enumerate() {
        if pair[1].date <= pair[0].date {
            return Err(PricenormError::UnorderedDates {
                index: i + 1,
                previous: pair[0].date,
                date: pair[1].date,
            });
        }
    }
    Ok(())
}

/// Place each observation on its calendar slot. Slots without data get an
/// all-null row; observations off the calendar are counted and discarded.
fn reindex(
    observations: &[RawObservation],
    calendar: &[chrono::NaiveDate],
) -> (Vec<RawObservation>, usize) {
    let mut rows = Vec::with_capacity(calendar.len());
    let mut source = observations.iter().peekable();
    let mut matched = 0;

    for &date in calendar {
        while source.next_if(|o| o.date < date).is_some() {}
        match source.next_if(|o| o.date == date) {
            Some(obs) => {
                matched += 1;
                rows.push(obs.clone());
            }
            None => rows.push(RawObservation::missing(date)),
        }
    }

    (rows, observations.len() - matched)
}

fn fill(slot: &mut Option<f64>, last: &mut Option<f64>) {
    match slot {
        Some(v) => *last = Some(*v),
        None => *slot = *last,
    }
}

/// Each field independently takes the most recent prior non-null value.
fn forward_fill(rows: &mut [RawObservation]) {
    let (mut open, mut high, mut low, mut close, mut volume) = (None, None, None, None, None);
    for row in rows.iter_mut() {
        fill(&mut row.open, &mut open);
        fill(&mut row.high, &mut high);
        fill(&mut row.low, &mut low);
        fill(&mut row.close, &mut close);
        fill(&mut row.volume, &mut volume);
    }
}
