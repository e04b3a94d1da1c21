//! Per-instrument series storage port trait.

use crate::domain::error::PricenormError;
use crate::domain::series::{CleanedSeries, RawSeries};
use std::path::{Path, PathBuf};

/// A raw series as read from storage, already sorted and deduplicated.
#[derive(Debug, Clone)]
pub struct LoadedSeries {
    pub series: RawSeries,
    pub duplicates_dropped: usize,
}

/// Storage shared across batch workers, hence `Sync`.
pub trait SeriesStore: Send + Sync {
    /// Input files in `dir`, sorted by name.
    fn list(&self, dir: &Path) -> Result<Vec<PathBuf>, PricenormError>;

    fn load(&self, path: &Path) -> Result<LoadedSeries, PricenormError>;

    fn save(&self, path: &Path, series: &CleanedSeries) -> Result<(), PricenormError>;

    fn ensure_dir(&self, dir: &Path) -> Result<(), PricenormError>;
}
