//! Core domain types and logic.

pub mod series;
pub mod calendar;
pub mod rolling;
pub mod outlier;
pub mod scaler;
pub mod features;
pub mod normalizer;
pub mod batch;
pub mod config_validation;
pub mod error;
