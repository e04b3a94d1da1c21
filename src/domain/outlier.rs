//! Rolling-band outlier correction on the close column.
//!
//! Band statistics for each row come from the gap-filled close column as it
//! was before any correction, over a trailing window that includes the row
//! itself. A close strictly outside `mean ± num_std · std` is replaced by that
//! window's mean. Replacements are written to the output only and never feed
//! later windows, so a genuine level shift is absorbed within a few rows.
//!
//! With the sample standard deviation a value can lie more than `k` deviations
//! from the mean of `n` values only when `(n - 1) / sqrt(n) > k`; for the
//! default `k = 2` that needs at least six values in the window.
//!
//! Default parameters: window=20, num_std=2.0, min_periods=2.

use crate::domain::rolling::{trailing_stats, RollingStats};

pub const DEFAULT_WINDOW: usize = 20;
pub const DEFAULT_NUM_STD: f64 = 2.0;
pub const DEFAULT_MIN_PERIODS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlierBand {
    pub window: usize,
    pub num_std: f64,
    pub min_periods: usize,
}

impl Default for OutlierBand {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            num_std: DEFAULT_NUM_STD,
            min_periods: DEFAULT_MIN_PERIODS,
        }
    }
}

/// A close that was replaced by its rolling mean.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correction {
    pub index: usize,
    pub original: f64,
    pub replacement: f64,
    pub stats: RollingStats,
}

impl OutlierBand {
    /// Rolling statistics for every row of `closes`; `None` where history is
    /// insufficient.
    pub fn band_stats(&self, closes: &[Option<f64>]) -> Vec<Option<RollingStats>> {
        (0..closes.len())
            .map(|i| trailing_stats(closes, i, self.window, self.min_periods))
            .collect()
    }

    pub fn correct(&self, closes: &mut [Option<f64>]) -> Vec<Correction> {
        let stats = self.band_stats(closes);
        let corrections: Vec<Correction> = closes
            .iter()
            .zip(&stats)
            .enumerate()
            .filter_map(|(index, (close, stats))| {
                let (value, stats) = ((*close)?, (*stats)?);
                (!stats.contains(value, self.num_std)).then_some(Correction {
                    index,
                    original: value,
                    replacement: stats.mean,
                    stats,
                })
            })
            .collect();

        for c in &corrections {
            closes[c.index] = Some(c.replacement);
        }
        corrections
    }

    /// Indices of `closes` lying outside the band computed from `reference`.
    ///
    /// Passing the pre-correction column as `reference` and the output of
    /// [`OutlierBand::correct`] as `closes` always yields nothing.
    pub fn out_of_band(&self, reference: &[Option<f64>], closes: &[Option<f64>]) -> Vec<usize> {
        self.band_stats(reference)
            .into_iter()
            .zip(closes)
            .enumerate()
            .filter_map(|(i, (stats, close))| match (stats, close) {
                (Some(stats), Some(value)) if !stats.contains(*value, self.num_std) => Some(i),
                _ => None,
            })
            .collect()
    }

    /// Indices whose close lies outside the band of its own column.
    pub fn violations(&self, closes: &[Option<f64>]) -> Vec<usize> {
        self.out_of_band(closes, closes)
    }
}
