//! CLI integration tests.
//!
//! Tests cover:
//! - Batch config assembly from INI files and command-line overrides
//! - Argument parsing for both subcommands
//! - `normalize` and `batch` end-to-end against temp directories
//! - Exit codes for config errors and all-failed batches

mod common;

use clap::Parser;
use common::*;
use pricenorm::adapters::file_config_adapter::FileConfigAdapter;
use pricenorm::cli::{self, Cli, Command};
use pricenorm::domain::batch::{BatchConfig, BatchReport, FailedFile};
use pricenorm::domain::error::PricenormError;
use pricenorm::domain::outlier::OutlierBand;
use pricenorm::ports::config_port::ConfigPort;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn is_success(code: ExitCode) -> bool {
    // ExitCode has no PartialEq on every toolchain, compare via Debug
    format!("{code:?}") == format!("{:?}", ExitCode::SUCCESS)
}

const VALID_INI: &str = r#"
[paths]
input_dir = data/raw/SENSEX
output_dir = data/processed

[batch]
output_prefix = processed_
parallel = true

[normalize]
window = 20
num_std = 2.0
min_periods = 2
"#;

mod config_assembly {
    use super::*;

    fn adapter(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn from_ini_only() {
        let config = adapter(VALID_INI);
        let batch = cli::build_batch_config(Some(&config as &dyn ConfigPort), None, None, false).unwrap();
        assert_eq!(batch.input_dir, PathBuf::from("data/raw/SENSEX"));
        assert_eq!(batch.output_dir, PathBuf::from("data/processed"));
        assert!(batch.parallel);
        assert_eq!(batch.band, OutlierBand::default());
    }

    #[test]
    fn overrides_take_precedence() {
        let config = adapter(VALID_INI);
        let batch = cli::build_batch_config(
            Some(&config as &dyn ConfigPort),
            Some(PathBuf::from("in")),
            Some(PathBuf::from("out")),
            true,
        )
        .unwrap();
        assert_eq!(batch.input_dir, PathBuf::from("in"));
        assert_eq!(batch.output_dir, PathBuf::from("out"));
        assert!(!batch.parallel);
    }

    #[test]
    fn single_override_keeps_other_path() {
        let config = adapter(VALID_INI);
        let batch =
            cli::build_batch_config(Some(&config as &dyn ConfigPort), None, Some(PathBuf::from("elsewhere")), false)
                .unwrap();
        assert_eq!(batch.input_dir, PathBuf::from("data/raw/SENSEX"));
        assert_eq!(batch.output_dir, PathBuf::from("elsewhere"));
    }

    #[test]
    fn overrides_without_ini_paths() {
        let config = adapter("[normalize]\nwindow = 10\n[batch]\noutput_prefix = clean_\n");
        let batch = cli::build_batch_config(
            Some(&config as &dyn ConfigPort),
            Some(PathBuf::from("in")),
            Some(PathBuf::from("out")),
            false,
        )
        .unwrap();
        assert_eq!(batch.band.window, 10);
        assert_eq!(batch.output_prefix, "clean_");
    }

    #[test]
    fn no_config_no_paths_is_missing() {
        let err = cli::build_batch_config(None, Some(PathBuf::from("in")), None, false).unwrap_err();
        assert!(matches!(err, PricenormError::ConfigMissing { key, .. } if key == "output_dir"));
    }

    #[test]
    fn no_config_with_paths_uses_defaults() {
        let batch = cli::build_batch_config(
            None,
            Some(PathBuf::from("in")),
            Some(PathBuf::from("out")),
            false,
        )
        .unwrap();
        assert_eq!(batch, BatchConfig::new("in", "out"));
    }

    #[test]
    fn invalid_normalize_section_rejected() {
        let config = adapter("[paths]\ninput_dir = a\noutput_dir = b\n[normalize]\nnum_std = -1\n");
        let err = cli::build_batch_config(Some(&config as &dyn ConfigPort), None, None, false).unwrap_err();
        assert!(matches!(err, PricenormError::ConfigInvalid { key, .. } if key == "num_std"));
    }

    #[test]
    fn build_band_defaults_without_config() {
        assert_eq!(cli::build_band(None).unwrap(), OutlierBand::default());
    }

    #[test]
    fn build_band_from_config() {
        let config = adapter("[normalize]\nwindow = 15\nnum_std = 3\nmin_periods = 5\n");
        let band = cli::build_band(Some(&config as &dyn ConfigPort)).unwrap();
        assert_eq!(
            band,
            OutlierBand {
                window: 15,
                num_std: 3.0,
                min_periods: 5
            }
        );
    }
}

mod argument_parsing {
    use super::*;

    #[test]
    fn parses_normalize() {
        let cli = Cli::parse_from(["pricenorm", "normalize", "-i", "a.csv", "-o", "b.csv"]);
        assert_eq!(cli.log_level, "info");
        match cli.command {
            Command::Normalize {
                input,
                output,
                config,
            } => {
                assert_eq!(input, PathBuf::from("a.csv"));
                assert_eq!(output, PathBuf::from("b.csv"));
                assert!(config.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_batch_with_overrides() {
        let cli = Cli::parse_from([
            "pricenorm",
            "--log-level",
            "debug",
            "batch",
            "--config",
            "p.ini",
            "--input-dir",
            "raw",
            "--sequential",
        ]);
        assert_eq!(cli.log_level, "debug");
        match cli.command {
            Command::Batch {
                config,
                input_dir,
                output_dir,
                sequential,
            } => {
                assert_eq!(config, Some(PathBuf::from("p.ini")));
                assert_eq!(input_dir, Some(PathBuf::from("raw")));
                assert_eq!(output_dir, None);
                assert!(sequential);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn normalize_requires_output() {
        assert!(Cli::try_parse_from(["pricenorm", "normalize", "-i", "a.csv"]).is_err());
    }
}

mod end_to_end {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn normalize_single_file() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("TCS.BO.csv");
        fs::write(&input, SAMPLE_CSV).unwrap();
        let output = dir.path().join("nested").join("processed_TCS.BO.csv");

        let code = cli::run_normalize(&input, &output, None);
        assert!(is_success(code));
        let written = fs::read_to_string(&output).unwrap();
        assert_eq!(written.lines().count(), 7);
    }

    #[test]
    fn normalize_bad_input_fails() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("EMPTY.csv");
        fs::write(&input, "Date,Close\n").unwrap();
        let code = cli::run_normalize(&input, &dir.path().join("out.csv"), None);
        assert!(!is_success(code));
        assert!(!dir.path().join("out.csv").exists());
    }

    #[test]
    fn normalize_with_invalid_config_fails() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("A.csv");
        fs::write(&input, SAMPLE_CSV).unwrap();
        let ini = write_temp_ini("[normalize]\nwindow = 1\n");
        let code = cli::run_normalize(&input, &dir.path().join("out.csv"), Some(ini.path()));
        assert!(!is_success(code));
    }

    #[test]
    fn batch_via_run() {
        let dir = TempDir::new().unwrap();
        let raw = dir.path().join("raw");
        let out = dir.path().join("processed");
        fs::create_dir(&raw).unwrap();
        fs::write(raw.join("INFY.BO.csv"), SAMPLE_CSV).unwrap();
        fs::write(raw.join("WIPRO.BO.csv"), SAMPLE_CSV).unwrap();

        let ini = write_temp_ini(&format!(
            "[paths]\ninput_dir = {}\noutput_dir = {}\n",
            raw.display(),
            out.display()
        ));
        let cli = Cli::parse_from([
            "pricenorm".to_string(),
            "batch".to_string(),
            "--config".to_string(),
            ini.path().display().to_string(),
        ]);
        let code = cli::run(cli);
        assert!(is_success(code));
        assert!(out.join("processed_INFY.BO.csv").exists());
        assert!(out.join("processed_WIPRO.BO.csv").exists());
    }

    #[test]
    fn batch_missing_config_file_fails() {
        let cli = Cli::parse_from(["pricenorm", "batch", "--config", "/nonexistent/p.ini"]);
        assert!(!is_success(cli::run(cli)));
    }
}

mod exit_codes {
    use super::*;

    fn failed(error: PricenormError) -> FailedFile {
        FailedFile {
            input: PathBuf::from("x.csv"),
            error,
        }
    }

    #[test]
    fn empty_report_succeeds() {
        assert!(is_success(cli::batch_exit_code(&BatchReport::default())));
    }

    #[test]
    fn all_failed_reports_error() {
        let report = BatchReport {
            processed: vec![],
            failed: vec![failed(PricenormError::EmptyInput)],
        };
        let code = cli::batch_exit_code(&report);
        assert_eq!(
            format!("{code:?}"),
            format!("{:?}", ExitCode::from(&PricenormError::EmptyInput))
        );
    }

    #[test]
    fn config_errors_map_to_two() {
        let err = PricenormError::ConfigMissing {
            section: "paths".into(),
            key: "input_dir".into(),
        };
        assert_eq!(
            format!("{:?}", ExitCode::from(&err)),
            format!("{:?}", ExitCode::from(2))
        );
    }
}
