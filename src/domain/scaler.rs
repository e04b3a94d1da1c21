//! Per-series zero-mean, unit-variance scaler.
//!
//! Fit on the non-null values of one column using the population standard
//! deviation. A zero-variance column scales by 1, so every value of a
//! constant or single-row series standardizes to 0.0.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FittedScaler {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
}

impl FittedScaler {
    /// `None` when the column holds no values.
    pub fn fit(values: &[Option<f64>]) -> Option<Self> {
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        if present.is_empty() {
            return None;
        }
        let count = present.len();
        let mean = present.iter().sum::<f64>() / count as f64;
        let variance = present
            .iter()
            .map(|v| {
                let diff = v - mean;
                diff * diff
            })
            .sum::<f64>()
            / count as f64;
        Some(Self {
            count,
            mean,
            std: variance.sqrt(),
        })
    }

    fn scale(&self) -> f64 {
        if self.std == 0.0 { 1.0 } else { self.std }
    }

    pub fn transform(&self, value: f64) -> f64 {
        (value - self.mean) / self.scale()
    }

    pub fn transform_all(&self, values: &[Option<f64>]) -> Vec<Option<f64>> {
        values.iter().map(|v| v.map(|x| self.transform(x))).collect()
    }
}
