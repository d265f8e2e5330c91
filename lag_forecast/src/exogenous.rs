//! Exogenous inputs and how they evolve across forecast steps

use crate::error::{ForecastError, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Debug;

/// Named exogenous values supplied by the caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExogenousInputs {
    values: BTreeMap<String, f64>,
}

impl ExogenousInputs {
    /// Create an empty set of inputs
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, replacing any previous one
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    /// Builder-style `insert`
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.insert(name, value);
        self
    }

    /// Value for a feature name
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Check whether a value is present
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Apply user overrides on top of these inputs
    pub fn overridden_by(mut self, overrides: &BTreeMap<String, f64>) -> Self {
        for (name, &value) in overrides {
            self.values.insert(name.clone(), value);
        }
        self
    }

    /// Iterate names and values in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, &v)| (k.as_str(), v))
    }

    /// Names in name order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|k| k.as_str())
    }

    /// Number of values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if there are no values
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn map_values<F>(&self, mut f: F) -> Self
    where
        F: FnMut(f64) -> f64,
    {
        Self {
            values: self.values.iter().map(|(k, &v)| (k.clone(), f(v))).collect(),
        }
    }
}

impl From<BTreeMap<String, f64>> for ExogenousInputs {
    fn from(values: BTreeMap<String, f64>) -> Self {
        Self { values }
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for ExogenousInputs {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Strategy producing the exogenous values used at each forecast step
pub trait ExogenousStrategy: Debug + Send {
    /// Exogenous values for step `step` (0-based), derived from `base`
    fn resolve(&mut self, step: usize, base: &ExogenousInputs) -> Result<ExogenousInputs>;

    /// Name of the strategy
    fn name(&self) -> &str;
}

/// Hold every value at its base level
#[derive(Debug, Clone, Copy, Default)]
pub struct Constant;

impl ExogenousStrategy for Constant {
    fn resolve(&mut self, _step: usize, base: &ExogenousInputs) -> Result<ExogenousInputs> {
        Ok(base.clone())
    }

    fn name(&self) -> &str {
        "constant"
    }
}

/// Compound every value by `rate` per step: `v × (1 + rate)^(step + 1)`
#[derive(Debug, Clone, Copy)]
pub struct Drift {
    rate: f64,
}

impl Drift {
    /// Create a new drift strategy
    pub fn new(rate: f64) -> Result<Self> {
        if !rate.is_finite() || rate <= -1.0 {
            return Err(ForecastError::ConfigError(format!(
                "Drift rate must be finite and greater than -1, got {}",
                rate
            )));
        }

        Ok(Self { rate })
    }

    /// Per-step growth rate
    pub fn rate(&self) -> f64 {
        self.rate
    }
}

impl ExogenousStrategy for Drift {
    fn resolve(&mut self, step: usize, base: &ExogenousInputs) -> Result<ExogenousInputs> {
        let exponent = i32::try_from(step)
            .ok()
            .and_then(|s| s.checked_add(1))
            .ok_or_else(|| {
                ForecastError::ConfigError(format!(
                    "Drift step {} exceeds the supported horizon",
                    step
                ))
            })?;
        let factor = (1.0 + self.rate).powi(exponent);
        Ok(base.map_values(|v| v * factor))
    }

    fn name(&self) -> &str {
        "drift"
    }
}

/// Multiply every value by `1 + N(0, std_dev)` drawn independently per step.
///
/// The generator is seeded, so two runs with the same seed see the same
/// perturbations.
#[derive(Debug, Clone)]
pub struct Noise {
    normal: Normal<f64>,
    rng: StdRng,
}

impl Noise {
    /// Create a new noise strategy
    pub fn new(std_dev: f64, seed: u64) -> Result<Self> {
        if !std_dev.is_finite() || std_dev < 0.0 {
            return Err(ForecastError::ConfigError(format!(
                "Noise standard deviation must be finite and non-negative, got {}",
                std_dev
            )));
        }
        let normal = Normal::new(0.0, std_dev)
            .map_err(|e| ForecastError::ConfigError(e.to_string()))?;

        Ok(Self {
            normal,
            rng: StdRng::seed_from_u64(seed),
        })
    }
}

impl ExogenousStrategy for Noise {
    fn resolve(&mut self, _step: usize, base: &ExogenousInputs) -> Result<ExogenousInputs> {
        let normal = self.normal;
        let rng = &mut self.rng;
        Ok(base.map_values(|v| v * (1.0 + normal.sample(rng))))
    }

    fn name(&self) -> &str {
        "noise"
    }
}

/// Configured exogenous update strategy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum ExogenousUpdate {
    /// Values stay at their base level
    #[default]
    Constant,
    /// Values compound by `rate` per step
    Drift { rate: f64 },
    /// Values are perturbed by seeded Gaussian noise
    Noise {
        #[serde(default = "default_noise_std_dev")]
        std_dev: f64,
        #[serde(default)]
        seed: u64,
    },
}

fn default_noise_std_dev() -> f64 {
    0.01
}

impl ExogenousUpdate {
    /// Build a fresh strategy instance for one run
    pub fn build(&self) -> Result<Box<dyn ExogenousStrategy>> {
        Ok(match *self {
            ExogenousUpdate::Constant => Box::new(Constant),
            ExogenousUpdate::Drift { rate } => Box::new(Drift::new(rate)?),
            ExogenousUpdate::Noise { std_dev, seed } => Box::new(Noise::new(std_dev, seed)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn base() -> ExogenousInputs {
        ExogenousInputs::new().with("brent", 80.0).with("fx", 1.25)
    }

    #[test]
    fn test_constant() {
        let mut strategy = Constant;
        for step in 0..5 {
            assert_eq!(strategy.resolve(step, &base()).unwrap(), base());
        }
    }

    #[test]
    fn test_drift_compounds() {
        let mut strategy = Drift::new(0.1).unwrap();
        let first = strategy.resolve(0, &base()).unwrap();
        let third = strategy.resolve(2, &base()).unwrap();

        assert_relative_eq!(first.get("brent").unwrap(), 88.0);
        assert_relative_eq!(third.get("brent").unwrap(), 80.0 * 1.1_f64.powi(3));
    }

    #[test]
    fn test_drift_rejects_step_beyond_exponent_range() {
        let mut strategy = Drift::new(0.1).unwrap();
        let step = i32::MAX as usize;
        let err = strategy.resolve(step, &base()).unwrap_err();
        assert!(matches!(err, ForecastError::ConfigError(_)));

        // Largest step whose exponent still fits
        let last = strategy.resolve(step - 1, &base()).unwrap();
        assert!(last.get("brent").unwrap().is_infinite());
    }

    #[test]
    fn test_drift_rejects_invalid_rate() {
        assert!(Drift::new(-1.0).is_err());
        assert!(Drift::new(f64::NAN).is_err());
    }

    #[test]
    fn test_noise_is_reproducible() {
        let mut a = Noise::new(0.05, 7).unwrap();
        let mut b = Noise::new(0.05, 7).unwrap();

        for step in 0..10 {
            assert_eq!(
                a.resolve(step, &base()).unwrap(),
                b.resolve(step, &base()).unwrap()
            );
        }
    }

    #[test]
    fn test_zero_noise_is_constant() {
        let mut strategy = Noise::new(0.0, 1).unwrap();
        assert_eq!(strategy.resolve(0, &base()).unwrap(), base());
    }

    #[test]
    fn test_overrides_take_precedence() {
        let mut overrides = BTreeMap::new();
        overrides.insert("fx".to_string(), 1.5);
        overrides.insert("coal_index".to_string(), 3.0);

        let inputs = base().overridden_by(&overrides);
        assert_eq!(inputs.get("fx"), Some(1.5));
        assert_eq!(inputs.get("brent"), Some(80.0));
        assert_eq!(inputs.get("coal_index"), Some(3.0));
    }

    #[test]
    fn test_update_defaults_to_constant() {
        assert_eq!(ExogenousUpdate::default(), ExogenousUpdate::Constant);
        assert_eq!(ExogenousUpdate::default().build().unwrap().name(), "constant");
    }

    #[test]
    fn test_update_from_toml() {
        let update: ExogenousUpdate = toml::from_str("kind = \"drift\"\nrate = 0.002").unwrap();
        assert_eq!(update, ExogenousUpdate::Drift { rate: 0.002 });

        let update: ExogenousUpdate = toml::from_str("kind = \"noise\"").unwrap();
        assert_eq!(
            update,
            ExogenousUpdate::Noise {
                std_dev: 0.01,
                seed: 0
            }
        );
        assert_eq!(update.build().unwrap().name(), "noise");
    }
}
