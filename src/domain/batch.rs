//! Batch normalization over a directory of per-instrument files.
//!
//! Every input file is loaded, normalized and saved independently. A failure
//! in one file is logged and recorded in the [`BatchReport`]; the remaining
//! files are still processed.

use crate::domain::error::PricenormError;
use crate::domain::normalizer::{NormalizeWarning, SeriesNormalizer};
use crate::domain::outlier::{OutlierBand, DEFAULT_MIN_PERIODS, DEFAULT_NUM_STD, DEFAULT_WINDOW};
use crate::ports::config_port::ConfigPort;
use crate::ports::series_port::SeriesStore;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const DEFAULT_OUTPUT_PREFIX: &str = "processed_";

#[derive(Debug, Clone, PartialEq)]
pub struct BatchConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub output_prefix: String,
    pub parallel: bool,
    pub band: OutlierBand,
}

impl BatchConfig {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            output_prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
            parallel: true,
            band: OutlierBand::default(),
        }
    }

    /// Build from `[paths]`, `[batch]` and `[normalize]`. Call
    /// `validate_batch_config` first; this only reads values.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, PricenormError> {
        let path = |key: &str| {
            config
                .get_string("paths", key)
                .map(PathBuf::from)
                .ok_or_else(|| PricenormError::ConfigMissing {
                    section: "paths".into(),
                    key: key.into(),
                })
        };
        Ok(Self {
            input_dir: path("input_dir")?,
            output_dir: path("output_dir")?,
            output_prefix: config
                .get_string("batch", "output_prefix")
                .unwrap_or_else(|| DEFAULT_OUTPUT_PREFIX.to_string()),
            parallel: config.get_bool("batch", "parallel", true),
            band: band_from_config(config),
        })
    }

    /// True for a file this batch would itself have written, when outputs
    /// land in the input directory.
    pub fn is_output_file(&self, path: &Path) -> bool {
        self.input_dir == self.output_dir
            && !self.output_prefix.is_empty()
            && path
                .file_name()
                .is_some_and(|n| n.to_string_lossy().starts_with(&self.output_prefix))
    }

    pub fn output_path(&self, input: &Path) -> PathBuf {
        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.output_dir.join(format!("{}{}", self.output_prefix, name))
    }
}

pub fn band_from_config(config: &dyn ConfigPort) -> OutlierBand {
    OutlierBand {
        window: config.get_int("normalize", "window", DEFAULT_WINDOW as i64).max(2) as usize,
        num_std: config.get_double("normalize", "num_std", DEFAULT_NUM_STD),
        min_periods: config
            .get_int("normalize", "min_periods", DEFAULT_MIN_PERIODS as i64)
            .max(2) as usize,
    }
}

#[derive(Debug, Clone)]
pub struct ProcessedFile {
    pub input: PathBuf,
    pub output: PathBuf,
    pub rows: usize,
    pub corrections: usize,
    pub warnings: Vec<NormalizeWarning>,
}

#[derive(Debug)]
pub struct FailedFile {
    pub input: PathBuf,
    pub error: PricenormError,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub processed: Vec<ProcessedFile>,
    pub failed: Vec<FailedFile>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.processed.len() + self.failed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Load, normalize and save one file.
pub fn process_file(
    store: &dyn SeriesStore,
    normalizer: &SeriesNormalizer,
    input: &Path,
    output: &Path,
) -> Result<ProcessedFile, PricenormError> {
    let loaded = store.load(input)?;
    if loaded.duplicates_dropped > 0 {
        warn!(
            file = %input.display(),
            count = loaded.duplicates_dropped,
            "dropped rows with repeated dates"
        );
    }

    let result = normalizer.normalize(&loaded.series)?;
    for warning in &result.warnings {
        warn!(file = %input.display(), "{}", warning);
    }
    for c in &result.corrections {
        debug!(
            file = %input.display(),
            date = %result.series.observations[c.index].date,
            original = c.original,
            replacement = c.replacement,
            "close outside rolling band"
        );
    }

    store.save(output, &result.series)?;
    info!(
        file = %input.display(),
        output = %output.display(),
        rows = result.series.len(),
        corrections = result.corrections.len(),
        "saved processed file"
    );

    Ok(ProcessedFile {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        rows: result.series.len(),
        corrections: result.corrections.len(),
        warnings: result.warnings,
    })
}

/// Fails only when the input directory cannot be listed or the output
/// directory cannot be created; per-file errors land in the report.
pub fn run_batch(store: &dyn SeriesStore, config: &BatchConfig) -> Result<BatchReport, PricenormError> {
    let (skipped, files): (Vec<PathBuf>, Vec<PathBuf>) = store
        .list(&config.input_dir)?
        .into_iter()
        .partition(|p| config.is_output_file(p));
    if !skipped.is_empty() {
        debug!(count = skipped.len(), "skipping earlier outputs in the input directory");
    }
    store.ensure_dir(&config.output_dir)?;
    info!(
        input_dir = %config.input_dir.display(),
        files = files.len(),
        parallel = config.parallel,
        "starting batch"
    );

    let normalizer = SeriesNormalizer::new(config.band);
    let run_one = |input: &PathBuf| {
        info!(file = %input.display(), "processing");
        let output = config.output_path(input);
        (input.clone(), process_file(store, &normalizer, input, &output))
    };

    let results: Vec<(PathBuf, Result<ProcessedFile, PricenormError>)> = if config.parallel {
        files.par_iter().map(run_one).collect()
    } else {
        files.iter().map(run_one).collect()
    };

    let mut report = BatchReport::default();
    for (input, result) in results {
        match result {
            Ok(processed) => report.processed.push(processed),
            Err(error) => {
                warn!(file = %input.display(), error = %error, "skipping file");
                report.failed.push(FailedFile { input, error });
            }
        }
    }

    info!(
        processed = report.processed.len(),
        failed = report.failed.len(),
        "batch complete"
    );
    Ok(report)
}
