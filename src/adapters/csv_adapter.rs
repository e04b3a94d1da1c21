//! CSV file series store.
//!
//! Input tables need a `Date` and a `Close` column; `Open`, `High`, `Low` and
//! `Volume` are optional. Header names match case-insensitively and unknown
//! columns (e.g. `Adj Close`) are ignored. Output columns follow
//! [`OUTPUT_HEADER`] with absent optional columns left out.

use crate::domain::error::PricenormError;
use crate::domain::series::{CleanedObservation, CleanedSeries, Columns, RawObservation, RawSeries};
use crate::ports::series_port::{LoadedSeries, SeriesStore};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::StringRecord;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const OUTPUT_HEADER: [&str; 12] = [
    "Date",
    "Open",
    "High",
    "Low",
    "Close",
    "Volume",
    "Close_standardized",
    "Close_log",
    "Day_of_Week",
    "Month",
    "Quarter",
    "Year",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Default, Clone, Copy)]
pub struct CsvSeriesStore;

impl CsvSeriesStore {
    pub fn new() -> Self {
        Self
    }
}

/// Column positions found in an input header.
struct HeaderIndex {
    date: usize,
    open: Option<usize>,
    high: Option<usize>,
    low: Option<usize>,
    close: Option<usize>,
    volume: Option<usize>,
}

impl HeaderIndex {
    fn from_headers(headers: &StringRecord) -> Result<Self, PricenormError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let date = find("date").ok_or_else(|| PricenormError::MissingField {
            field: "date".into(),
        })?;
        Ok(Self {
            date,
            open: find("open"),
            high: find("high"),
            low: find("low"),
            close: find("close"),
            volume: find("volume"),
        })
    }

    fn columns(&self) -> Columns {
        Columns {
            open: self.open.is_some(),
            high: self.high.is_some(),
            low: self.low.is_some(),
            close: self.close.is_some(),
            volume: self.volume.is_some(),
        }
    }
}

/// Accepts a bare date, a naive timestamp, or an offset timestamp. Time of
/// day and offset are discarded; an offset timestamp keeps its local date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(d) = NaiveDate::parse_from_str(value, DATE_FORMAT) {
        return Some(d);
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt.date());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%:z")
        .ok()
        .map(|dt| dt.date_naive())
}

fn is_null(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "" | "null" | "nan" | "na" | "none"
    )
}

fn parse_error(file: &str, line: u64, reason: String) -> PricenormError {
    PricenormError::CsvParse {
        file: file.to_string(),
        line,
        reason,
    }
}

fn csv_error(file: &str, err: csv::Error) -> PricenormError {
    let line = err.position().map(|p| p.line()).unwrap_or(0);
    parse_error(file, line, err.to_string())
}

fn parse_cell(
    record: &StringRecord,
    index: Option<usize>,
    column: &str,
    file: &str,
    line: u64,
) -> Result<Option<f64>, PricenormError> {
    let Some(raw) = index.and_then(|i| record.get(i)).map(str::trim) else {
        return Ok(None);
    };
    if is_null(raw) {
        return Ok(None);
    }
    raw.parse::<f64>()
        .map(Some)
        .map_err(|e| parse_error(file, line, format!("invalid {} value '{}': {}", column, raw, e)))
}

/// Read one instrument's table. `name` labels errors and becomes the symbol.
pub fn read_series<R: io::Read>(reader: R, name: &str) -> Result<LoadedSeries, PricenormError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = rdr.headers().map_err(|e| csv_error(name, e))?.clone();
    let index = HeaderIndex::from_headers(&headers)?;
    if index.close.is_none() {
        return Err(PricenormError::MissingField {
            field: "close".into(),
        });
    }

    let mut observations = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| csv_error(name, e))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let date_str = record.get(index.date).unwrap_or_default();
        let date = parse_date(date_str)
            .ok_or_else(|| parse_error(name, line, format!("invalid date '{}'", date_str)))?;

        let volume = parse_cell(&record, index.volume, "volume", name, line)?;
        if volume.is_some_and(|v| v < 0.0) {
            return Err(parse_error(name, line, "volume must be non-negative".into()));
        }

        observations.push(RawObservation {
            date,
            open: parse_cell(&record, index.open, "open", name, line)?,
            high: parse_cell(&record, index.high, "high", name, line)?,
            low: parse_cell(&record, index.low, "low", name, line)?,
            close: parse_cell(&record, index.close, "close", name, line)?,
            volume,
        });
    }

    let symbol = Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string());
    let (series, duplicates_dropped) =
        RawSeries::from_unsorted(symbol, index.columns(), observations);
    Ok(LoadedSeries {
        series,
        duplicates_dropped,
    })
}

fn header_for(columns: &Columns) -> Vec<&'static str> {
    OUTPUT_HEADER
        .iter()
        .copied()
        .filter(|h| match *h {
            "Open" => columns.open,
            "High" => columns.high,
            "Low" => columns.low,
            "Volume" => columns.volume,
            _ => true,
        })
        .collect()
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn row_for(obs: &CleanedObservation, columns: &Columns) -> Vec<String> {
    let mut row = vec![obs.date.format(DATE_FORMAT).to_string()];
    if columns.open {
        row.push(fmt_opt(obs.open));
    }
    if columns.high {
        row.push(fmt_opt(obs.high));
    }
    if columns.low {
        row.push(fmt_opt(obs.low));
    }
    row.push(fmt_opt(obs.close));
    if columns.volume {
        row.push(fmt_opt(obs.volume));
    }
    row.push(fmt_opt(obs.close_standardized));
    row.push(fmt_opt(obs.close_log));
    row.push(obs.day_of_week.to_string());
    row.push(obs.month.to_string());
    row.push(obs.quarter.to_string());
    row.push(obs.year.to_string());
    row
}

pub fn write_series<W: io::Write>(writer: W, series: &CleanedSeries) -> Result<(), PricenormError> {
    let name = series.symbol.as_str();
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(header_for(&series.columns))
        .map_err(|e| csv_error(name, e))?;
    for obs in &series.observations {
        wtr.write_record(row_for(obs, &series.columns))
            .map_err(|e| csv_error(name, e))?;
    }
    wtr.flush()?;
    Ok(())
}

impl SeriesStore for CsvSeriesStore {
    fn list(&self, dir: &Path) -> Result<Vec<PathBuf>, PricenormError> {
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let is_csv = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
            if is_csv && path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    fn load(&self, path: &Path) -> Result<LoadedSeries, PricenormError> {
        let file = fs::File::open(path)?;
        read_series(file, &path.display().to_string())
    }

    fn save(&self, path: &Path, series: &CleanedSeries) -> Result<(), PricenormError> {
        let file = fs::File::create(path)?;
        write_series(io::BufWriter::new(file), series)
    }

    fn ensure_dir(&self, dir: &Path) -> Result<(), PricenormError> {
        fs::create_dir_all(dir)?;
        Ok(())
    }
}
