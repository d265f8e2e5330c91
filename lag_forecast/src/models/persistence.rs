//! Persistence (naive) model: echoes one feature as the prediction

use crate::error::{ForecastError, Result};
use crate::models::{check_arity, check_output, Predictor};
use crate::schema::FeatureVector;

/// Predicts the value of a single named feature, typically `lag_1`
#[derive(Debug, Clone, PartialEq)]
pub struct Persistence {
    name: String,
    feature_names: Vec<String>,
    source_index: usize,
}

impl Persistence {
    /// Create a persistence model over `feature_names` echoing `source`
    pub fn new(feature_names: Vec<String>, source: &str) -> Result<Self> {
        let source_index = feature_names
            .iter()
            .position(|n| n == source)
            .ok_or_else(|| {
                ForecastError::ConfigError(format!(
                    "Persistence source '{}' is not among the declared features",
                    source
                ))
            })?;

        Ok(Self {
            name: format!("Persistence ({})", source),
            feature_names,
            source_index,
        })
    }
}

impl Predictor for Persistence {
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        check_arity(self.feature_names.len(), features)?;
        check_output(features.values()[self.source_index])
    }

    fn feature_names(&self) -> Option<&[String]> {
        Some(&self.feature_names)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
