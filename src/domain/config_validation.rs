//! Configuration validation.
//!
//! Validates the `[paths]`, `[batch]` and `[normalize]` sections before a
//! batch run starts.

use crate::domain::error::PricenormError;
use crate::ports::config_port::ConfigPort;

pub fn validate_normalize_config(config: &dyn ConfigPort) -> Result<(), PricenormError> {
    validate_window(config)?;
    validate_num_std(config)?;
    validate_min_periods(config)?;
    Ok(())
}

pub fn validate_batch_config(config: &dyn ConfigPort) -> Result<(), PricenormError> {
    validate_paths(config)?;
    validate_output_prefix(config)?;
    validate_normalize_config(config)
}

fn invalid(section: &str, key: &str, reason: &str) -> PricenormError {
    PricenormError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_window(config: &dyn ConfigPort) -> Result<(), PricenormError> {
    let window = config.get_int("normalize", "window", 20);
    if window < 2 {
        return Err(invalid("normalize", "window", "window must be at least 2"));
    }
    Ok(())
}

fn validate_num_std(config: &dyn ConfigPort) -> Result<(), PricenormError> {
    let value = config.get_double("normalize", "num_std", 2.0);
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid("normalize", "num_std", "num_std must be positive"));
    }
    Ok(())
}

fn validate_min_periods(config: &dyn ConfigPort) -> Result<(), PricenormError> {
    let window = config.get_int("normalize", "window", 20);
    let min_periods = config.get_int("normalize", "min_periods", 2);
    if min_periods < 2 {
        return Err(invalid(
            "normalize",
            "min_periods",
            "min_periods must be at least 2",
        ));
    }
    if min_periods > window {
        return Err(invalid(
            "normalize",
            "min_periods",
            "min_periods must not exceed window",
        ));
    }
    Ok(())
}

fn validate_paths(config: &dyn ConfigPort) -> Result<(), PricenormError> {
    for key in ["input_dir", "output_dir"] {
        if config.get_string("paths", key).is_none() {
            return Err(PricenormError::ConfigMissing {
                section: "paths".into(),
                key: key.into(),
            });
        }
    }
    Ok(())
}

pub fn validate_output_prefix(config: &dyn ConfigPort) -> Result<(), PricenormError> {
    let prefix = config.get_string("batch", "output_prefix");
    if prefix.is_some_and(|p| p.contains(['/', '\\'])) {
        return Err(invalid(
            "batch",
            "output_prefix",
            "output_prefix must not contain path separators",
        ));
    }
    Ok(())
}
