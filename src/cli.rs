//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter::CsvSeriesStore;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::batch::{self, band_from_config, BatchConfig, BatchReport};
use crate::domain::config_validation::{
    validate_batch_config, validate_normalize_config, validate_output_prefix,
};
use crate::domain::error::PricenormError;
use crate::domain::normalizer::SeriesNormalizer;
use crate::domain::outlier::OutlierBand;
use crate::ports::config_port::ConfigPort;
use crate::ports::series_port::SeriesStore;

#[derive(Parser, Debug)]
#[command(name = "pricenorm", about = "Clean and normalize daily price series")]
pub struct Cli {
    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Normalize a single price file
    Normalize {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Normalize every CSV file in a directory
    Batch {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        input_dir: Option<PathBuf>,
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Process files one at a time
        #[arg(long)]
        sequential: bool,
    },
}

pub fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // a subscriber may already be installed when run from tests
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Normalize {
            input,
            output,
            config,
        } => run_normalize(&input, &output, config.as_deref()),
        Command::Batch {
            config,
            input_dir,
            output_dir,
            sequential,
        } => run_batch(config.as_deref(), input_dir, output_dir, sequential),
    }
}

fn report_error(err: &PricenormError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, PricenormError> {
    eprintln!("Loading config from {}", path.display());
    FileConfigAdapter::from_file(path)
}

/// Outlier parameters from an optional config file, validated.
pub fn build_band(config: Option<&dyn ConfigPort>) -> Result<OutlierBand, PricenormError> {
    match config {
        Some(c) => {
            validate_normalize_config(c)?;
            Ok(band_from_config(c))
        }
        None => Ok(OutlierBand::default()),
    }
}

/// Command-line directories take precedence over `[paths]`.
pub fn build_batch_config(
    config: Option<&dyn ConfigPort>,
    input_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    sequential: bool,
) -> Result<BatchConfig, PricenormError> {
    let mut batch_config = match (config, input_dir.is_some() && output_dir.is_some()) {
        (Some(c), false) => {
            validate_batch_config(c)?;
            BatchConfig::from_config(c)?
        }
        (Some(c), true) => {
            validate_normalize_config(c)?;
            validate_output_prefix(c)?;
            let mut bc = BatchConfig::new(PathBuf::new(), PathBuf::new());
            if let Some(prefix) = c.get_string("batch", "output_prefix") {
                bc.output_prefix = prefix;
            }
            bc.parallel = c.get_bool("batch", "parallel", true);
            bc.band = band_from_config(c);
            bc
        }
        (None, true) => BatchConfig::new(PathBuf::new(), PathBuf::new()),
        (None, false) => {
            let key = if input_dir.is_none() { "input_dir" } else { "output_dir" };
            return Err(PricenormError::ConfigMissing {
                section: "paths".into(),
                key: key.into(),
            });
        }
    };

    if let Some(dir) = input_dir {
        batch_config.input_dir = dir;
    }
    if let Some(dir) = output_dir {
        batch_config.output_dir = dir;
    }
    if sequential {
        batch_config.parallel = false;
    }
    Ok(batch_config)
}

pub fn run_normalize(input: &Path, output: &Path, config_path: Option<&Path>) -> ExitCode {
    let config = match config_path.map(load_config).transpose() {
        Ok(c) => c,
        Err(e) => return report_error(&e),
    };
    let band = match build_band(config.as_ref().map(|c| c as &dyn ConfigPort)) {
        Ok(b) => b,
        Err(e) => return report_error(&e),
    };

    let store = CsvSeriesStore::new();
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = store.ensure_dir(parent) {
            return report_error(&e);
        }
    }

    let normalizer = SeriesNormalizer::new(band);
    match batch::process_file(&store, &normalizer, input, output) {
        Ok(processed) => {
            for warning in &processed.warnings {
                eprintln!("warning: {warning}");
            }
            eprintln!(
                "Wrote {} rows ({} closes corrected) to {}",
                processed.rows,
                processed.corrections,
                processed.output.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => report_error(&e),
    }
}

fn run_batch(
    config_path: Option<&Path>,
    input_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    sequential: bool,
) -> ExitCode {
    let config = match config_path.map(load_config).transpose() {
        Ok(c) => c,
        Err(e) => return report_error(&e),
    };
    let batch_config = match build_batch_config(
        config.as_ref().map(|c| c as &dyn ConfigPort),
        input_dir,
        output_dir,
        sequential,
    ) {
        Ok(c) => c,
        Err(e) => return report_error(&e),
    };

    let store = CsvSeriesStore::new();
    let report = match batch::run_batch(&store, &batch_config) {
        Ok(r) => r,
        Err(e) => return report_error(&e),
    };

    print_summary(&report);
    batch_exit_code(&report)
}

fn print_summary(report: &BatchReport) {
    eprintln!("\n=== Batch Summary ===");
    eprintln!("Processed: {}", report.processed.len());
    eprintln!("Failed:    {}", report.failed.len());
    for p in &report.processed {
        println!("{}", p.output.display());
    }
    for f in &report.failed {
        eprintln!("  {}: {}", f.input.display(), f.error);
    }
}

/// Partial failure still succeeds; only a batch where every file failed
/// reports the first error's code.
pub fn batch_exit_code(report: &BatchReport) -> ExitCode {
    match report.failed.first() {
        Some(first) if report.processed.is_empty() => (&first.error).into(),
        _ => ExitCode::SUCCESS,
    }
}
