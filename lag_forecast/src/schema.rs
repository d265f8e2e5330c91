//! Feature schema: which features a model expects and where each value comes from
//!
//! Every feature name resolves through one fixed order:
//!
//! 1. `lag_<d>` names read the lag buffer `d` steps back
//! 2. other names read the exogenous inputs for the current step
//! 3. missing exogenous names fall back to the dataset's last known value
//! 4. names unknown to both fall back to zero
//!
//! Steps 3 and 4 are governed by [`FallbackPolicy`], so callers can demand
//! that every exogenous feature be supplied explicitly.

use crate::error::{ForecastError, Result};
use crate::exogenous::ExogenousInputs;
use lag_math::{LagBuffer, LagSpec};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

/// How a declared feature missing from the exogenous inputs is filled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Dataset last known value, else zero
    #[default]
    LastKnownThenZero,
    /// Dataset last known value, else fail
    LastKnownOnly,
    /// Fail on any missing exogenous value
    Strict,
}

/// Where a feature value is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureSource {
    /// Lag buffer, `d` steps back
    Lag(usize),
    /// Exogenous inputs (with fallback)
    Exogenous,
}

/// Origin of a resolved exogenous value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Supplied by the exogenous inputs
    Input,
    /// Dataset last known value
    LastKnown,
    /// Sentinel zero
    Zero,
}

/// Ordered feature vector handed to a predictor; built fresh per step
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    /// Create a new feature vector
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Values in schema order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value at a position
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    /// Number of features
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the vector is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}

/// Canonical ordered feature list and how each entry is resolved
#[derive(Debug, Clone)]
pub struct FeatureSchema {
    lag_spec: LagSpec,
    names: Vec<String>,
    sources: Vec<FeatureSource>,
    fallbacks: BTreeMap<String, f64>,
    policy: FallbackPolicy,
}

impl FeatureSchema {
    /// Create a schema: exogenous names in caller order, then lag features ascending
    pub fn new<S: AsRef<str>>(lag_spec: LagSpec, exogenous: &[S]) -> Result<Self> {
        let mut names = Vec::with_capacity(exogenous.len() + lag_spec.len());
        let mut sources = Vec::with_capacity(names.capacity());

        for name in exogenous {
            let name = name.as_ref();
            if LagSpec::parse_feature_name(name).is_some() {
                return Err(ForecastError::ConfigError(format!(
                    "Exogenous feature '{}' collides with a lag feature name",
                    name
                )));
            }
            names.push(name.to_string());
            sources.push(FeatureSource::Exogenous);
        }
        for lag in lag_spec.iter() {
            names.push(LagSpec::feature_name(lag));
            sources.push(FeatureSource::Lag(lag));
        }

        check_unique(&names)?;

        Ok(Self {
            lag_spec,
            names,
            sources,
            fallbacks: BTreeMap::new(),
            policy: FallbackPolicy::default(),
        })
    }

    /// Adopt a model's declared feature order
    ///
    /// Lag features the model declares must be covered by the lag set. Names
    /// that are neither lags nor known exogenous features are resolved through
    /// the fallback policy.
    pub fn reconcile<S: AsRef<str>>(mut self, model_features: &[S]) -> Result<Self> {
        let mut names = Vec::with_capacity(model_features.len());
        let mut sources = Vec::with_capacity(model_features.len());

        for name in model_features {
            let name = name.as_ref();
            match LagSpec::parse_feature_name(name) {
                Some(lag) if self.lag_spec.contains(lag) => {
                    sources.push(FeatureSource::Lag(lag));
                }
                Some(lag) => {
                    return Err(ForecastError::ConfigError(format!(
                        "Model expects '{}' but the lag set {} does not include lag {}",
                        name, self.lag_spec, lag
                    )));
                }
                None => {
                    if !self.names.iter().any(|n| n == name) {
                        debug!(feature = name, "model feature not in assembled schema");
                    }
                    sources.push(FeatureSource::Exogenous);
                }
            }
            names.push(name.to_string());
        }

        check_unique(&names)?;

        for dropped in self.names.iter().filter(|n| !names.contains(n)) {
            debug!(feature = %dropped, "feature not used by model");
        }

        self.names = names;
        self.sources = sources;
        Ok(self)
    }

    /// Attach dataset last known values used as fallbacks
    pub fn with_fallbacks(mut self, fallbacks: BTreeMap<String, f64>) -> Self {
        self.fallbacks = fallbacks;
        self
    }

    /// Set the fallback policy
    pub fn with_policy(mut self, policy: FallbackPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Feature names in vector order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Source of each feature, in vector order
    pub fn sources(&self) -> &[FeatureSource] {
        &self.sources
    }

    /// Exogenous feature names in vector order
    pub fn exogenous_names(&self) -> impl Iterator<Item = &str> {
        self.names
            .iter()
            .zip(&self.sources)
            .filter(|(_, s)| **s == FeatureSource::Exogenous)
            .map(|(n, _)| n.as_str())
    }

    /// Lag set backing the lag features
    pub fn lag_spec(&self) -> &LagSpec {
        &self.lag_spec
    }

    /// Fallback policy in effect
    pub fn policy(&self) -> FallbackPolicy {
        self.policy
    }

    /// Number of features
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if the schema declares no features
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Resolve one exogenous feature
    pub fn resolve_exogenous(
        &self,
        name: &str,
        inputs: &ExogenousInputs,
    ) -> Result<(f64, Resolution)> {
        if let Some(value) = inputs.get(name) {
            return Ok((value, Resolution::Input));
        }

        let last_known = self.fallbacks.get(name).copied();
        match (self.policy, last_known) {
            (FallbackPolicy::Strict, _) => Err(ForecastError::UnresolvedFeature {
                feature: name.to_string(),
            }),
            (_, Some(value)) => Ok((value, Resolution::LastKnown)),
            (FallbackPolicy::LastKnownThenZero, None) => Ok((0.0, Resolution::Zero)),
            (FallbackPolicy::LastKnownOnly, None) => Err(ForecastError::UnresolvedFeature {
                feature: name.to_string(),
            }),
        }
    }

    /// Check that every exogenous feature resolves, logging each fallback
    ///
    /// Returns the resolution of every exogenous feature in vector order.
    pub fn validate(&self, inputs: &ExogenousInputs) -> Result<Vec<(String, Resolution)>> {
        let mut resolutions = Vec::new();
        for name in self.exogenous_names() {
            let (value, resolution) = self.resolve_exogenous(name, inputs)?;
            match resolution {
                Resolution::Input => {}
                Resolution::LastKnown => {
                    warn!(feature = name, value, "using dataset last known value")
                }
                Resolution::Zero => warn!(feature = name, "no value available, using zero"),
            }
            resolutions.push((name.to_string(), resolution));
        }

        Ok(resolutions)
    }

    /// Assemble the feature vector for one step
    pub fn build_row(
        &self,
        lag_buffer: &LagBuffer,
        exogenous: &ExogenousInputs,
    ) -> Result<FeatureVector> {
        let mut values = Vec::with_capacity(self.names.len());
        for (name, source) in self.names.iter().zip(&self.sources) {
            let value = match *source {
                FeatureSource::Lag(lag) => lag_buffer.value_at(lag)?,
                FeatureSource::Exogenous => self.resolve_exogenous(name, exogenous)?.0,
            };
            values.push(value);
        }

        Ok(FeatureVector::new(values))
    }
}

fn check_unique(names: &[String]) -> Result<()> {
    let mut seen = HashSet::with_capacity(names.len());
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(ForecastError::ConfigError(format!(
                "Feature '{}' is declared more than once",
                name
            )));
        }
    }
    Ok(())
}
