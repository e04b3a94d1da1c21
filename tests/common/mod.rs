#![allow(dead_code)]

use chrono::NaiveDate;
use pricenorm::domain::calendar::business_days;
use pricenorm::domain::error::PricenormError;
pub use pricenorm::domain::series::{CleanedSeries, Columns, RawObservation, RawSeries};
use pricenorm::ports::series_port::{LoadedSeries, SeriesStore};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// In-memory store: inputs keyed by path, saved outputs captured for
/// inspection.
pub struct MockSeriesStore {
    pub inputs: BTreeMap<PathBuf, Result<RawSeries, String>>,
    pub saved: Mutex<BTreeMap<PathBuf, CleanedSeries>>,
    pub created_dirs: Mutex<Vec<PathBuf>>,
}

impl MockSeriesStore {
    pub fn new() -> Self {
        Self {
            inputs: BTreeMap::new(),
            saved: Mutex::new(BTreeMap::new()),
            created_dirs: Mutex::new(Vec::new()),
        }
    }

    pub fn with_series(mut self, path: &str, series: RawSeries) -> Self {
        self.inputs.insert(PathBuf::from(path), Ok(series));
        self
    }

    pub fn with_error(mut self, path: &str, reason: &str) -> Self {
        self.inputs
            .insert(PathBuf::from(path), Err(reason.to_string()));
        self
    }

    pub fn saved_paths(&self) -> Vec<PathBuf> {
        self.saved.lock().unwrap().keys().cloned().collect()
    }

    pub fn saved_series(&self, path: &str) -> Option<CleanedSeries> {
        self.saved.lock().unwrap().get(Path::new(path)).cloned()
    }
}

impl SeriesStore for MockSeriesStore {
    fn list(&self, dir: &Path) -> Result<Vec<PathBuf>, PricenormError> {
        Ok(self
            .inputs
            .keys()
            .filter(|p| p.parent() == Some(dir))
            .cloned()
            .collect())
    }

    fn load(&self, path: &Path) -> Result<LoadedSeries, PricenormError> {
        match self.inputs.get(path) {
            Some(Ok(series)) => Ok(LoadedSeries {
                series: series.clone(),
                duplicates_dropped: 0,
            }),
            Some(Err(reason)) => Err(PricenormError::CsvParse {
                file: path.display().to_string(),
                line: 1,
                reason: reason.clone(),
            }),
            None => Err(PricenormError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no such file",
            ))),
        }
    }

    fn save(&self, path: &Path, series: &CleanedSeries) -> Result<(), PricenormError> {
        self.saved
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), series.clone());
        Ok(())
    }

    fn ensure_dir(&self, dir: &Path) -> Result<(), PricenormError> {
        self.created_dirs.lock().unwrap().push(dir.to_path_buf());
        Ok(())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn close_series(symbol: &str, rows: &[(NaiveDate, f64)]) -> RawSeries {
    RawSeries::new(
        symbol,
        Columns::CLOSE_ONLY,
        rows.iter()
            .map(|&(d, c)| RawObservation::with_close(d, c))
            .collect(),
    )
}

/// `count` consecutive business days from `start`, close at row `i` = `f(i)`.
pub fn business_day_series(
    symbol: &str,
    start: NaiveDate,
    count: usize,
    f: impl Fn(usize) -> f64,
) -> RawSeries {
    let end = start + chrono::Days::new(count as u64 * 2 + 7);
    let rows: Vec<(NaiveDate, f64)> = business_days(start, end)
        .into_iter()
        .take(count)
        .enumerate()
        .map(|(i, d)| (d, f(i)))
        .collect();
    close_series(symbol, &rows)
}

pub const SAMPLE_CSV: &str = "Date,Open,High,Low,Close,Volume\n\
    2021-01-04,99.0,101.0,98.0,100.0,5000\n\
    2021-01-05,100.0,102.0,99.0,101.0,6000\n\
    2021-01-06,100.5,101.5,98.5,99.0,5800\n\
    2021-01-08,101.0,103.0,100.0,102.0,5500\n\
    2021-01-11,101.5,103.5,100.5,102.5,5700\n";
