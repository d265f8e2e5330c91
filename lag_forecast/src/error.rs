//! Error types for the lag_forecast crate

use lag_math::LagError;
use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the lag_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Configuration cannot support a run (e.g. lags need more history than exists)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A declared feature has no exogenous value and the fallback policy supplies none
    #[error("Unresolved feature '{feature}': no exogenous value and no fallback available")]
    UnresolvedFeature { feature: String },

    /// Lag buffer queried beyond its populated length
    #[error("Range error: {0}")]
    RangeError(#[from] LagError),

    /// The predictor rejected a feature vector
    #[error("Prediction error: {0}")]
    PredictionError(String),

    /// A forecast step failed; the run is aborted
    #[error("Forecast step {step} failed: {source}")]
    StepFailed {
        step: usize,
        #[source]
        source: Box<ForecastError>,
    },

    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),

    /// Error writing CSV output
    #[error("CSV error: {0}")]
    CsvError(String),

    /// Error parsing config, model or date input
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl ForecastError {
    /// Wrap an error with the index of the step that produced it
    pub fn at_step(self, step: usize) -> Self {
        match self {
            // Keep the innermost step
            err @ ForecastError::StepFailed { .. } => err,
            err => ForecastError::StepFailed {
                step,
                source: Box::new(err),
            },
        }
    }

    /// Step index the error is attached to, if any
    pub fn step(&self) -> Option<usize> {
        match self {
            ForecastError::StepFailed { step, .. } => Some(*step),
            _ => None,
        }
    }

    /// Innermost error, skipping step context
    pub fn root(&self) -> &ForecastError {
        match self {
            ForecastError::StepFailed { source, .. } => source.root(),
            err => err,
        }
    }
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::CsvError(err.to_string())
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::ParseError(err.to_string())
    }
}

impl From<toml::de::Error> for ForecastError {
    fn from(err: toml::de::Error) -> Self {
        ForecastError::ParseError(err.to_string())
    }
}

impl From<chrono::ParseError> for ForecastError {
    fn from(err: chrono::ParseError) -> Self {
        ForecastError::ParseError(err.to_string())
    }
}
