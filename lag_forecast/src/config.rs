//! Forecast configuration loaded from TOML
//!
//! One configuration object covers every dataset variant: which column is
//! the target, which lags the model was trained on, which columns are
//! exogenous and how they evolve over the horizon.
//!
//! ```toml
//! target_column = "coal_price"
//! lags = [1, 2, 3, 7, 14]
//! horizon = 30
//! fallback = "last_known_then_zero"
//!
//! [overrides]
//! brent = 85.0
//!
//! [update]
//! kind = "drift"
//! rate = 0.001
//!
//! [band]
//! epsilon = 0.02
//! ```

use crate::error::{ForecastError, Result};
use crate::exogenous::ExogenousUpdate;
use crate::schema::FallbackPolicy;
use lag_math::{ConfidenceBand, LagSpec};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

/// Forecast horizon used when none is configured
pub const DEFAULT_HORIZON: usize = 30;

/// Parameters of a forecast run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForecastConfig {
    /// Target column in the historical dataset
    pub target_column: Option<String>,
    /// Date column; detected by name when absent
    pub date_column: Option<String>,
    /// Lags the model was trained on
    pub lags: LagSpec,
    /// Number of steps to forecast
    pub horizon: usize,
    /// Exogenous columns; every numeric non-target column when absent
    pub exogenous_columns: Option<Vec<String>>,
    /// User-set exogenous values replacing last known values
    pub overrides: BTreeMap<String, f64>,
    /// How exogenous values evolve over the horizon
    pub update: ExogenousUpdate,
    /// How missing exogenous values are filled
    pub fallback: FallbackPolicy,
    /// Fixed multiplicative band; disabled when absent
    pub band: Option<ConfidenceBand>,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            target_column: None,
            date_column: None,
            lags: LagSpec::default(),
            horizon: DEFAULT_HORIZON,
            exogenous_columns: None,
            overrides: BTreeMap::new(),
            update: ExogenousUpdate::default(),
            fallback: FallbackPolicy::default(),
            band: None,
        }
    }
}

impl ForecastConfig {
    /// Parse and validate a configuration from a TOML string
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration from a TOML file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        if let Some((name, value)) = self.overrides.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ForecastError::ConfigError(format!(
                "Override for '{}' must be finite, got {}",
                name, value
            )));
        }

        if let Some(columns) = &self.exogenous_columns {
            let mut seen = HashSet::new();
            for column in columns {
                if !seen.insert(column) {
                    return Err(ForecastError::ConfigError(format!(
                        "Exogenous column '{}' is listed more than once",
                        column
                    )));
                }
            }
        }

        // Surface bad strategy parameters before any data is loaded
        self.update.build()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ForecastConfig::from_toml_str("").unwrap();
        assert_eq!(config.horizon, 30);
        assert_eq!(config.lags.as_slice(), &[1, 2, 3, 7, 14]);
        assert_eq!(config.update, ExogenousUpdate::Constant);
        assert_eq!(config.fallback, FallbackPolicy::LastKnownThenZero);
        assert!(config.band.is_none());
    }

    #[test]
    fn test_full_config() {
        let config = ForecastConfig::from_toml_str(
            r#"
            target_column = "coal_price"
            date_column = "Date"
            lags = [7, 1]
            horizon = 10
            exogenous_columns = ["brent", "fx"]
            fallback = "strict"

            [overrides]
            brent = 85.0

            [update]
            kind = "noise"
            std_dev = 0.02
            seed = 42

            [band]
            "#,
        )
        .unwrap();

        assert_eq!(config.target_column.as_deref(), Some("coal_price"));
        assert_eq!(config.lags.as_slice(), &[1, 7]);
        assert_eq!(config.horizon, 10);
        assert_eq!(config.overrides.get("brent"), Some(&85.0));
        assert_eq!(config.fallback, FallbackPolicy::Strict);
        assert_eq!(
            config.update,
            ExogenousUpdate::Noise {
                std_dev: 0.02,
                seed: 42
            }
        );
        assert_eq!(config.band.unwrap().epsilon(), 0.02);
    }

    #[test]
    fn test_rejects_unknown_fields_and_bad_values() {
        assert!(ForecastConfig::from_toml_str("horizn = 3").is_err());
        assert!(ForecastConfig::from_toml_str("lags = []").is_err());
        assert!(ForecastConfig::from_toml_str("[band]\nepsilon = -0.5").is_err());
        assert!(ForecastConfig::from_toml_str("[update]\nkind = \"drift\"\nrate = -2.0").is_err());
        assert!(ForecastConfig::from_toml_str("exogenous_columns = [\"a\", \"a\"]").is_err());
    }
}
