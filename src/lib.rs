//! # lagcast
//!
//! Umbrella crate for the recursive lag forecasting workspace.
//!
//! - [`lag_math`]: lag sets, the rolling lag buffer and the forecast band
//! - [`lag_forecast`]: datasets, feature schemas, predictors and the forecast loop
//!
//! ## Example
//!
//! ```
//! use lagcast::prelude::*;
//!
//! let schema = FeatureSchema::new(LagSpec::new(vec![1, 2]).unwrap(), &[] as &[&str]).unwrap();
//! let model = Persistence::new(schema.names().to_vec(), "lag_1").unwrap();
//! let forecaster = Forecaster::new(model, schema).unwrap().with_horizon(3);
//!
//! let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let history = TargetSeries::from_pairs(
//!     [98.0, 100.0]
//!         .iter()
//!         .enumerate()
//!         .map(|(i, &v)| (start + chrono::Days::new(i as u64), v)),
//! )
//! .unwrap();
//!
//! let steps = forecaster.forecast(&history, &ExogenousInputs::new()).unwrap();
//! assert_eq!(steps.len(), 3);
//! assert!(steps.iter().all(|s| s.value == 100.0));
//! ```

pub use lag_forecast;
pub use lag_math;

/// Types most forecasts need
pub mod prelude {
    pub use lag_forecast::{
        assemble, ConfidenceBand, DataLoader, ExogenousInputs, ExogenousUpdate, FallbackPolicy,
        FeatureSchema, FnPredictor, ForecastConfig, ForecastError, ForecastStep, ForecastTable,
        Forecaster, HistoricalDataset, LagBuffer, LagSpec, LinearModel, Persistence,
        PreparedForecast, Predictor, TargetSeries,
    };
}
