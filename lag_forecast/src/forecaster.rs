//! Recursive multi-step forecast loop
//!
//! Each step builds a feature vector from the exogenous inputs and the lag
//! buffer, asks the predictor for the next value, records it, and pushes it
//! into the lag buffer so the following step sees it as `lag_1`. Beyond the
//! last observation there is no ground truth, so predictions stand in for it.
//!
//! Lags are positional: the buffer is seeded from the last rows of the target
//! series, whatever calendar gaps lie between them.

use crate::config::ForecastConfig;
use crate::data::{HistoricalDataset, TargetSeries};
use crate::error::{ForecastError, Result};
use crate::exogenous::{ExogenousInputs, ExogenousStrategy, ExogenousUpdate};
use crate::models::Predictor;
use crate::result::{assemble, ForecastStep, ForecastTable};
use crate::schema::FeatureSchema;
use crate::utils::step_date;
use chrono::NaiveDate;
use lag_math::{ConfidenceBand, LagBuffer};
use tracing::{debug, info};

/// Lifecycle of a forecast run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Buffer seeded, no step taken yet
    Initialized,
    /// Next step to execute
    Stepping(usize),
    /// All steps recorded
    Done,
    /// Aborted at the given step
    Failed(usize),
}

/// Forecast loop configuration around one predictor
#[derive(Debug, Clone)]
pub struct Forecaster<P> {
    predictor: P,
    schema: FeatureSchema,
    horizon: usize,
    band: Option<ConfidenceBand>,
    update: ExogenousUpdate,
}

impl<P: Predictor> Forecaster<P> {
    /// Create a new forecaster
    ///
    /// If the predictor declares its feature names, the schema adopts that
    /// order.
    pub fn new(predictor: P, schema: FeatureSchema) -> Result<Self> {
        let schema = match predictor.feature_names() {
            Some(names) => schema.reconcile(names)?,
            None => schema,
        };

        Ok(Self {
            predictor,
            schema,
            horizon: crate::config::DEFAULT_HORIZON,
            band: None,
            update: ExogenousUpdate::default(),
        })
    }

    /// Set the number of steps per run
    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    /// Attach a fixed multiplicative band to every step
    pub fn with_band(mut self, band: Option<ConfidenceBand>) -> Self {
        self.band = band;
        self
    }

    /// Set how exogenous values evolve over the horizon
    pub fn with_update(mut self, update: ExogenousUpdate) -> Self {
        self.update = update;
        self
    }

    /// Predictor in use
    pub fn predictor(&self) -> &P {
        &self.predictor
    }

    /// Feature schema in use
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Steps per run
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Start a run seeded from the tail of `series`
    ///
    /// Fails before any step if the series is shorter than the largest lag or
    /// an exogenous feature cannot be resolved.
    pub fn start(
        &self,
        series: &TargetSeries,
        exogenous: &ExogenousInputs,
    ) -> Result<ForecastRun<'_, P>> {
        let lag_spec = self.schema.lag_spec();
        let capacity = lag_spec.max_lag();
        if series.len() < capacity {
            return Err(ForecastError::ConfigError(format!(
                "Lag set {} needs {} observations but the target series has {}",
                lag_spec,
                capacity,
                series.len()
            )));
        }

        let buffer = LagBuffer::seeded(capacity, series.values())?;
        self.schema.validate(exogenous)?;
        let strategy = self.update.build()?;

        info!(
            model = self.predictor.name(),
            horizon = self.horizon,
            lags = %lag_spec,
            features = self.schema.len(),
            strategy = strategy.name(),
            "starting forecast run"
        );

        Ok(ForecastRun {
            forecaster: self,
            buffer,
            base: exogenous.clone(),
            strategy,
            last_date: series.last_date(),
            steps: Vec::with_capacity(self.horizon),
            state: RunState::Initialized,
        })
    }

    /// Run all steps; either every step succeeds or the run fails
    pub fn forecast(
        &self,
        series: &TargetSeries,
        exogenous: &ExogenousInputs,
    ) -> Result<Vec<ForecastStep>> {
        self.start(series, exogenous)?.run()
    }

    /// Run all steps and assemble the result table
    pub fn forecast_table(
        &self,
        series: &TargetSeries,
        exogenous: &ExogenousInputs,
    ) -> Result<ForecastTable> {
        let steps = self.forecast(series, exogenous)?;
        Ok(assemble(&steps))
    }
}

/// One forecast run; owns its lag buffer and is not resumable once finished
#[derive(Debug)]
pub struct ForecastRun<'a, P> {
    forecaster: &'a Forecaster<P>,
    buffer: LagBuffer,
    base: ExogenousInputs,
    strategy: Box<dyn ExogenousStrategy>,
    last_date: NaiveDate,
    steps: Vec<ForecastStep>,
    state: RunState,
}

impl<'a, P: Predictor> ForecastRun<'a, P> {
    /// Current state
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Lag buffer as it stands
    pub fn buffer(&self) -> &LagBuffer {
        &self.buffer
    }

    /// Steps recorded so far
    pub fn steps(&self) -> &[ForecastStep] {
        &self.steps
    }

    /// Execute the next step; `None` once the run is done
    pub fn step(&mut self) -> Result<Option<&ForecastStep>> {
        let i = match self.state {
            RunState::Initialized => 0,
            RunState::Stepping(i) => i,
            RunState::Done => return Ok(None),
            RunState::Failed(step) => {
                return Err(ForecastError::ConfigError(format!(
                    "Forecast run was aborted at step {}",
                    step
                )))
            }
        };

        let horizon = self.forecaster.horizon;
        if i >= horizon {
            self.state = RunState::Done;
            return Ok(None);
        }

        match self.advance(i) {
            Ok(step) => {
                self.steps.push(step);
                self.state = if i + 1 == horizon {
                    RunState::Done
                } else {
                    RunState::Stepping(i + 1)
                };
                Ok(self.steps.last())
            }
            Err(err) => {
                self.state = RunState::Failed(i);
                Err(err.at_step(i))
            }
        }
    }

    /// Execute every remaining step and return all of them
    pub fn run(mut self) -> Result<Vec<ForecastStep>> {
        while self.step()?.is_some() {}
        info!(steps = self.steps.len(), "forecast run complete");
        Ok(self.steps)
    }

    fn advance(&mut self, i: usize) -> Result<ForecastStep> {
        let forecaster = self.forecaster;

        let exogenous = self.strategy.resolve(i, &self.base)?;
        let features = forecaster.schema.build_row(&self.buffer, &exogenous)?;
        let value = forecaster.predictor.predict(&features)?;
        if !value.is_finite() {
            return Err(ForecastError::PredictionError(format!(
                "Model produced a non-finite prediction ({})",
                value
            )));
        }

        let date = step_date(self.last_date, i)?;
        let (lower, upper) = match forecaster.band {
            Some(band) => {
                let (lower, upper) = band.bounds(value);
                (Some(lower), Some(upper))
            }
            None => (None, None),
        };

        self.buffer.push(value);
        debug!(step = i, %date, value, "forecast step");

        Ok(ForecastStep {
            step: i,
            date,
            value,
            lower,
            upper,
        })
    }
}

/// Forecaster, target series and base exogenous inputs prepared from a dataset
#[derive(Debug)]
pub struct PreparedForecast<P> {
    pub forecaster: Forecaster<P>,
    pub series: TargetSeries,
    pub exogenous: ExogenousInputs,
}

impl<P: Predictor> PreparedForecast<P> {
    /// Prepare a forecast from a historical dataset
    ///
    /// Exogenous values start at each column's last known value, with user
    /// overrides taking precedence; every dataset column's last known value
    /// is also available as a fallback for model features.
    pub fn from_dataset(
        predictor: P,
        config: &ForecastConfig,
        dataset: &HistoricalDataset,
    ) -> Result<Self> {
        if let Some(target) = &config.target_column {
            if target != dataset.target_column() {
                return Err(ForecastError::ConfigError(format!(
                    "Configured target '{}' does not match dataset target '{}'",
                    target,
                    dataset.target_column()
                )));
            }
        }

        let exogenous_columns = config
            .exogenous_columns
            .clone()
            .unwrap_or_else(|| dataset.exogenous_columns());
        let schema = FeatureSchema::new(config.lags.clone(), &exogenous_columns)?
            .with_fallbacks(dataset.last_known_exogenous())
            .with_policy(config.fallback);

        let forecaster = Forecaster::new(predictor, schema)?
            .with_horizon(config.horizon)
            .with_band(config.band)
            .with_update(config.update.clone());

        let exogenous: ExogenousInputs = forecaster
            .schema()
            .exogenous_names()
            .filter_map(|name| dataset.last_known(name).map(|v| (name, v)))
            .collect();
        let exogenous = exogenous.overridden_by(&config.overrides);

        let series = dataset.target_series()?;

        Ok(Self {
            forecaster,
            series,
            exogenous,
        })
    }

    /// Run the forecast and assemble the result table
    pub fn run(&self) -> Result<ForecastTable> {
        self.forecaster.forecast_table(&self.series, &self.exogenous)
    }
}
