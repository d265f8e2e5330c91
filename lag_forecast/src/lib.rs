//! # Lag Forecast
//!
//! Recursive multi-step forecasting around a pre-trained regression model.
//!
//! The model is a black box mapping an ordered feature vector to one value.
//! To forecast `N` days ahead, each step assembles its features from
//! exogenous inputs and lagged values of the target, predicts, and feeds the
//! prediction back into the lag buffer so later steps read it as history.
//!
//! ## Features
//!
//! - Historical datasets from CSV (date, target and exogenous columns)
//! - Feature schemas reconciled against the model's declared feature order
//! - Explicit fallback policy for features missing from the inputs
//! - Constant, drifting or seeded-noise exogenous scenarios
//! - Optional fixed multiplicative band around each prediction
//! - Result tables written as CSV or JSON
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lag_forecast::{DataLoader, ForecastConfig, LinearModel, PreparedForecast};
//!
//! # fn main() -> lag_forecast::error::Result<()> {
//! let dataset = DataLoader::from_csv("merged_prices.csv", "coal_price", None)?;
//! let model = LinearModel::from_json_path("model.json")?;
//! let config = ForecastConfig::default();
//!
//! let prepared = PreparedForecast::from_dataset(model, &config, &dataset)?;
//! let table = prepared.run()?;
//! table.to_csv_path("forecast_30_days.csv")?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod exogenous;
pub mod forecaster;
pub mod models;
pub mod result;
pub mod schema;
pub mod utils;

// Re-export commonly used types
pub use crate::config::ForecastConfig;
pub use crate::data::{DataLoader, HistoricalDataset, TargetSeries};
pub use crate::error::ForecastError;
pub use crate::exogenous::{ExogenousInputs, ExogenousStrategy, ExogenousUpdate};
pub use crate::forecaster::{ForecastRun, Forecaster, PreparedForecast, RunState};
pub use crate::models::{FnPredictor, LinearModel, Persistence, Predictor};
pub use crate::result::{assemble, ForecastStep, ForecastTable};
pub use crate::schema::{FallbackPolicy, FeatureSchema, FeatureVector};
pub use lag_math::{ConfidenceBand, LagBuffer, LagSpec};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
