//! Linear regression artifact loaded from JSON

use crate::error::{ForecastError, Result};
use crate::models::{check_arity, check_output, Predictor};
use crate::schema::FeatureVector;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Exported linear model: `intercept + Σ coefficient_i × feature_i`
///
/// ```json
/// {
///   "name": "coal-richards-bay",
///   "feature_names": ["brent", "lag_1", "lag_7"],
///   "coefficients": [0.05, 0.9, 0.05],
///   "intercept": 1.5
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinearModel {
    #[serde(default = "default_name")]
    name: String,
    feature_names: Vec<String>,
    coefficients: Vec<f64>,
    #[serde(default)]
    intercept: f64,
}

fn default_name() -> String {
    "linear".to_string()
}

impl LinearModel {
    /// Create a new linear model
    pub fn new(feature_names: Vec<String>, coefficients: Vec<f64>, intercept: f64) -> Result<Self> {
        let model = Self {
            name: default_name(),
            feature_names,
            coefficients,
            intercept,
        };
        model.validate()?;
        Ok(model)
    }

    /// Set the model name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Parse a model from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let model: Self = serde_json::from_str(json)?;
        model.validate()?;
        Ok(model)
    }

    /// Load a model from a JSON file
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Coefficients in feature order
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Intercept term
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    fn validate(&self) -> Result<()> {
        if self.feature_names.len() != self.coefficients.len() {
            return Err(ForecastError::ConfigError(format!(
                "Linear model declares {} features but {} coefficients",
                self.feature_names.len(),
                self.coefficients.len()
            )));
        }
        if self.coefficients.iter().any(|c| !c.is_finite()) || !self.intercept.is_finite() {
            return Err(ForecastError::ConfigError(
                "Linear model parameters must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

impl Predictor for LinearModel {
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        check_arity(self.coefficients.len(), features)?;

        let value = self
            .coefficients
            .iter()
            .zip(features.values())
            .fold(self.intercept, |acc, (c, x)| acc + c * x);

        check_output(value)
    }

    fn feature_names(&self) -> Option<&[String]> {
        Some(&self.feature_names)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
