//! Predictor port: the boundary to an externally trained model
//!
//! A predictor is a pure function from an ordered feature vector to one
//! scalar. Any failure is fatal to the current forecast run; predictors are
//! assumed deterministic, so a rejected vector would be rejected again on retry.

use crate::error::{ForecastError, Result};
use crate::schema::FeatureVector;
use std::fmt::{self, Debug};

/// Pre-trained model exposed as a pure feature-vector → scalar function.
///
/// `Send + Sync` lets independent forecast runs share one artifact. An
/// artifact that is not reentrant must serialize calls internally.
pub trait Predictor: Debug + Send + Sync {
    /// Predict one value from an ordered feature vector
    fn predict(&self, features: &FeatureVector) -> Result<f64>;

    /// Feature names the model was trained on, in order, if it declares them
    fn feature_names(&self) -> Option<&[String]> {
        None
    }

    /// Name of the model
    fn name(&self) -> &str;
}

impl<P: Predictor + ?Sized> Predictor for &P {
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        (**self).predict(features)
    }

    fn feature_names(&self) -> Option<&[String]> {
        (**self).feature_names()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<P: Predictor + ?Sized> Predictor for Box<P> {
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        (**self).predict(features)
    }

    fn feature_names(&self) -> Option<&[String]> {
        (**self).feature_names()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<P: Predictor + ?Sized> Predictor for std::sync::Arc<P> {
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        (**self).predict(features)
    }

    fn feature_names(&self) -> Option<&[String]> {
        (**self).feature_names()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Predictor backed by a closure over the raw feature values
pub struct FnPredictor<F> {
    name: String,
    arity: Option<usize>,
    f: F,
}

impl<F> FnPredictor<F>
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    /// Create a new closure predictor accepting vectors of any length
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            arity: None,
            f,
        }
    }

    /// Reject vectors whose length differs from `arity`
    pub fn with_arity(mut self, arity: usize) -> Self {
        self.arity = Some(arity);
        self
    }
}

impl<F> Debug for FnPredictor<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnPredictor")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

impl<F> Predictor for FnPredictor<F>
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        if let Some(arity) = self.arity {
            check_arity(arity, features)?;
        }
        check_output((self.f)(features.values()))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Fail unless the vector has exactly `expected` features
pub(crate) fn check_arity(expected: usize, features: &FeatureVector) -> Result<()> {
    if features.len() != expected {
        return Err(ForecastError::PredictionError(format!(
            "Expected {} features, got {}",
            expected,
            features.len()
        )));
    }
    Ok(())
}

/// Fail on a non-finite prediction
pub(crate) fn check_output(value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(ForecastError::PredictionError(format!(
            "Model produced a non-finite prediction ({})",
            value
        )));
    }
    Ok(value)
}

pub mod linear;
pub mod persistence;

pub use linear::LinearModel;
pub use persistence::Persistence;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fn_predictor() {
        let model = FnPredictor::new("sum", |x: &[f64]| x.iter().sum()).with_arity(2);
        assert_eq!(model.predict(&vec![1.0, 2.0].into()).unwrap(), 3.0);
        assert!(model.predict(&vec![1.0].into()).is_err());
        assert_eq!(model.name(), "sum");
        assert!(model.feature_names().is_none());
    }

    #[test]
    fn test_non_finite_prediction_is_rejected() {
        let model = FnPredictor::new("nan", |_: &[f64]| f64::NAN);
        let err = model.predict(&vec![1.0].into()).unwrap_err();
        assert!(matches!(err, ForecastError::PredictionError(_)));
    }

    #[test]
    fn test_boxed_predictor_delegates() {
        let boxed: Box<dyn Predictor> = Box::new(FnPredictor::new("first", |x: &[f64]| x[0]));
        assert_eq!(boxed.predict(&vec![4.0, 5.0].into()).unwrap(), 4.0);
        assert_eq!(boxed.name(), "first");
    }
}
