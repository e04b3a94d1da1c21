//! Raw and cleaned daily series.

use chrono::NaiveDate;

/// One calendar day of market data for one instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct RawObservation {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

impl RawObservation {
    /// A calendar slot with no data.
    pub fn missing(date: NaiveDate) -> Self {
        Self {
            date,
            open: None,
            high: None,
            low: None,
            close: None,
            volume: None,
        }
    }

    pub fn with_close(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: None,
            high: None,
            low: None,
            close: Some(close),
            volume: None,
        }
    }
}

/// Which columns the source table carried. Absent optional columns are
/// omitted when the cleaned table is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Columns {
    pub open: bool,
    pub high: bool,
    pub low: bool,
    pub close: bool,
    pub volume: bool,
}

impl Columns {
    pub const ALL: Columns = Columns {
        open: true,
        high: true,
        low: true,
        close: true,
        volume: true,
    };

    pub const CLOSE_ONLY: Columns = Columns {
        open: false,
        high: false,
        low: false,
        close: true,
        volume: false,
    };
}

#[derive(Debug, Clone)]
pub struct RawSeries {
    pub symbol: String,
    pub columns: Columns,
    pub observations: Vec<RawObservation>,
}

impl RawSeries {
    pub fn new(symbol: impl Into<String>, columns: Columns, observations: Vec<RawObservation>) -> Self {
        Self {
            symbol: symbol.into(),
            columns,
            observations,
        }
    }

    /// Sort by date and collapse repeated dates, keeping the last occurrence
    /// in input order. Returns the series and the number of rows dropped.
    pub fn from_unsorted(
        symbol: impl Into<String>,
        columns: Columns,
        mut observations: Vec<RawObservation>,
    ) -> (Self, usize) {
        let before = observations.len();
        // stable sort keeps input order among equal dates
        observations.sort_by_key(|o| o.date);
        let mut deduped: Vec<RawObservation> = Vec::with_capacity(observations.len());
        for obs in observations {
            match deduped.last_mut() {
                Some(last) if last.date == obs.date => *last = obs,
                _ => deduped.push(obs),
            }
        }
        let dropped = before - deduped.len();
        (Self::new(symbol, columns, deduped), dropped)
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.observations.first().map(|o| o.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.last().map(|o| o.date)
    }
}

/// Output row: the forward-filled raw fields plus derived features.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedObservation {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
    pub close_standardized: Option<f64>,
    pub close_log: Option<f64>,
    pub day_of_week: u32,
    pub month: u32,
    pub quarter: u32,
    pub year: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CleanedSeries {
    pub symbol: String,
    pub columns: Columns,
    pub observations: Vec<CleanedObservation>,
}

impl CleanedSeries {
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.observations.iter().map(|o| o.date).collect()
    }

    pub fn closes(&self) -> Vec<Option<f64>> {
        self.observations.iter().map(|o| o.close).collect()
    }
}
