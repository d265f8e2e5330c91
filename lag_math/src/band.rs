//! Fixed multiplicative envelope around point forecasts
//!
//! The band is `prediction × (1 ± ε)`. It is a presentation aid, not a
//! statistically derived interval: its width does not grow with the horizon
//! and carries no coverage guarantee.

use crate::{LagError, Result};
use serde::{Deserialize, Serialize};

/// Epsilon used when a band is enabled without an explicit width
pub const DEFAULT_EPSILON: f64 = 0.02;

/// Multiplicative band of relative half-width `epsilon`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BandRepr", into = "BandRepr")]
pub struct ConfidenceBand {
    epsilon: f64,
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct BandRepr {
    #[serde(default = "default_epsilon")]
    epsilon: f64,
}

fn default_epsilon() -> f64 {
    DEFAULT_EPSILON
}

impl ConfidenceBand {
    /// Create a new band
    ///
    /// Fails if `epsilon` is negative or not finite.
    pub fn new(epsilon: f64) -> Result<Self> {
        if !epsilon.is_finite() || epsilon < 0.0 {
            return Err(LagError::InvalidInput(format!(
                "Band epsilon must be a finite non-negative number, got {}",
                epsilon
            )));
        }

        Ok(Self { epsilon })
    }

    /// Relative half-width of the band
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Lower and upper bound for a prediction
    ///
    /// The two products are ordered, so `lower <= prediction <= upper` also
    /// holds for negative predictions.
    pub fn bounds(&self, prediction: f64) -> (f64, f64) {
        let a = prediction * (1.0 - self.epsilon);
        let b = prediction * (1.0 + self.epsilon);
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }
}

impl Default for ConfidenceBand {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl TryFrom<BandRepr> for ConfidenceBand {
    type Error = LagError;

    fn try_from(repr: BandRepr) -> Result<Self> {
        Self::new(repr.epsilon)
    }
}

impl From<ConfidenceBand> for BandRepr {
    fn from(band: ConfidenceBand) -> Self {
        Self {
            epsilon: band.epsilon,
        }
    }
}
