//! Trailing-window statistics.
//!
//! The window for row `i` is the up-to-`window` non-null values at rows
//! `i + 1 - window ..= i`, so the row being judged is part of its own window.
//! Standard deviation is the sample standard deviation (divides by N - 1), so
//! fewer than two observations yields no statistics at all rather than a zero.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RollingStats {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
}

impl RollingStats {
    pub fn from_window(values: &[f64]) -> Option<Self> {
        let count = values.len();
        if count < 2 {
            return None;
        }
        let mean = values.iter().sum::<f64>() / count as f64;
        let variance = values
            .iter()
            .map(|v| {
                let diff = v - mean;
                diff * diff
            })
            .sum::<f64>()
            / (count - 1) as f64;
        Some(Self {
            count,
            mean,
            std: variance.sqrt(),
        })
    }

    pub fn upper(&self, num_std: f64) -> f64 {
        self.mean + num_std * self.std
    }

    pub fn lower(&self, num_std: f64) -> f64 {
        self.mean - num_std * self.std
    }

    /// Closed band: values exactly on a bound are inside.
    pub fn contains(&self, value: f64, num_std: f64) -> bool {
        value >= self.lower(num_std) && value <= self.upper(num_std)
    }
}

/// Statistics over the trailing window ending at `index`, inclusive.
///
/// `None` when fewer than `min_periods` (and never fewer than two) non-null
/// values are available.
pub fn trailing_stats(
    values: &[Option<f64>],
    index: usize,
    window: usize,
    min_periods: usize,
) -> Option<RollingStats> {
    let end = (index + 1).min(values.len());
    let start = end.saturating_sub(window);
    let history: Vec<f64> = values[start..end].iter().flatten().copied().collect();
    if history.len() < min_periods.max(2) {
        return None;
    }
    RollingStats::from_window(&history)
}
