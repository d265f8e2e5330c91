//! # Lag Math
//!
//! Numeric building blocks for recursive multi-step forecasting.
//! This crate has no I/O: it provides the lag set a model is trained on,
//! the rolling buffer that feeds lag features, and the fixed envelope
//! placed around each prediction.

use thiserror::Error;

pub mod band;
pub mod buffer;
pub mod lags;

pub use band::ConfidenceBand;
pub use buffer::LagBuffer;
pub use lags::LagSpec;

/// Errors that can occur in lag calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LagError {
    #[error("Lag {steps_back} is out of range for a buffer holding {len} values")]
    OutOfRange { steps_back: usize, len: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),
}

/// Result type for lag math operations
pub type Result<T> = std::result::Result<T, LagError>;
