//! Lag sets describing which past steps feed a model

use crate::{LagError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lags used when none are configured
pub const DEFAULT_LAGS: [usize; 5] = [1, 2, 3, 7, 14];

/// Set of positive lags, kept sorted ascending without duplicates.
///
/// Lags are positional: lag `d` is the value `d` rows before the step being
/// predicted, regardless of calendar gaps in the source series.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct LagSpec {
    lags: Vec<usize>,
}

impl LagSpec {
    /// Create a new lag set
    ///
    /// Fails if the set is empty or contains a zero lag.
    pub fn new<I>(lags: I) -> Result<Self>
    where
        I: IntoIterator<Item = usize>,
    {
        let mut lags: Vec<usize> = lags.into_iter().collect();
        if lags.is_empty() {
            return Err(LagError::InvalidInput(
                "Lag set must contain at least one lag".to_string(),
            ));
        }
        if lags.contains(&0) {
            return Err(LagError::InvalidInput(
                "Lags must be positive".to_string(),
            ));
        }

        lags.sort_unstable();
        lags.dedup();

        Ok(Self { lags })
    }

    /// Largest lag, which is also the lag buffer capacity
    pub fn max_lag(&self) -> usize {
        // Non-empty by construction
        self.lags[self.lags.len() - 1]
    }

    /// Number of lags in the set
    pub fn len(&self) -> usize {
        self.lags.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.lags.is_empty()
    }

    /// Check whether a lag is part of the set
    pub fn contains(&self, lag: usize) -> bool {
        self.lags.binary_search(&lag).is_ok()
    }

    /// Iterate the lags in ascending order
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.lags.iter().copied()
    }

    /// Lags as a slice
    pub fn as_slice(&self) -> &[usize] {
        &self.lags
    }

    /// Feature name for a lag, e.g. `lag_7`
    pub fn feature_name(lag: usize) -> String {
        format!("lag_{}", lag)
    }

    /// Parse a lag feature name back into its lag
    pub fn parse_feature_name(name: &str) -> Option<usize> {
        name.strip_prefix("lag_")
            .and_then(|d| d.parse::<usize>().ok())
            .filter(|&d| d > 0)
    }

    /// Feature names for every lag, ascending
    pub fn feature_names(&self) -> Vec<String> {
        self.lags.iter().map(|&d| Self::feature_name(d)).collect()
    }
}

impl Default for LagSpec {
    fn default() -> Self {
        Self {
            lags: DEFAULT_LAGS.to_vec(),
        }
    }
}

impl TryFrom<Vec<usize>> for LagSpec {
    type Error = LagError;

    fn try_from(lags: Vec<usize>) -> Result<Self> {
        Self::new(lags)
    }
}

impl From<LagSpec> for Vec<usize> {
    fn from(spec: LagSpec) -> Self {
        spec.lags
    }
}

impl fmt::Display for LagSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.lags.iter().map(|d| d.to_string()).collect();
        write!(f, "{{{}}}", parts.join(","))
    }
}
