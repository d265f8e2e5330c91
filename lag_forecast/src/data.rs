//! Historical data handling for forecasting

use crate::error::{ForecastError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use lag_math::LagSpec;
use polars::prelude::*;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use tracing::{debug, warn};

/// Ordered (date, value) observations of the forecasted quantity.
///
/// Dates are strictly increasing and values finite. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetSeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl TargetSeries {
    /// Create a new target series
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(ForecastError::DataError(format!(
                "Dates length ({}) doesn't match values length ({})",
                dates.len(),
                values.len()
            )));
        }
        if dates.is_empty() {
            return Err(ForecastError::DataError("Target series is empty".to_string()));
        }
        if let Some(i) = dates.windows(2).position(|w| w[0] >= w[1]) {
            return Err(ForecastError::DataError(format!(
                "Dates must be strictly increasing: {} is followed by {}",
                dates[i],
                dates[i + 1]
            )));
        }
        if let Some(i) = values.iter().position(|v| !v.is_finite()) {
            return Err(ForecastError::DataError(format!(
                "Non-finite target value on {}",
                dates[i]
            )));
        }

        Ok(Self { dates, values })
    }

    /// Create a target series from (date, value) pairs
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        let (dates, values) = pairs.into_iter().unzip();
        Self::new(dates, values)
    }

    /// Observation dates
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Observed values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Date of the most recent observation
    pub fn last_date(&self) -> NaiveDate {
        self.dates[self.dates.len() - 1]
    }

    /// Most recent observed value
    pub fn last_value(&self) -> f64 {
        self.values[self.values.len() - 1]
    }

    /// The last `n` values (or all of them if fewer exist)
    pub fn tail(&self, n: usize) -> &[f64] {
        &self.values[self.values.len().saturating_sub(n)..]
    }

    /// Number of observations
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false: a series holds at least one observation
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Historical table with a date column, a target column and exogenous columns
#[derive(Debug, Clone)]
pub struct HistoricalDataset {
    /// Data frame containing the raw table
    df: DataFrame,
    /// Name of the date column
    date_column: String,
    /// Name of the target column
    target_column: String,
    /// Parsed date per row
    dates: Vec<Option<NaiveDate>>,
    /// Row indices with a date, in chronological order
    order: Vec<usize>,
}

/// Data loader for historical datasets
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load a historical dataset from a CSV file
    ///
    /// # Arguments
    /// * `path` - CSV file with a header row
    /// * `target_column` - Column holding the forecasted quantity
    /// * `date_column` - Date column; detected by name when `None`
    pub fn from_csv<P: AsRef<Path>>(
        path: P,
        target_column: &str,
        date_column: Option<&str>,
    ) -> Result<HistoricalDataset> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(Some(1000))
            .has_header(true)
            .finish()?;

        debug!(path = %path.display(), rows = df.height(), "loaded dataset");
        Self::from_dataframe(df, target_column, date_column)
    }

    /// Create a historical dataset from an existing DataFrame
    pub fn from_dataframe(
        df: DataFrame,
        target_column: &str,
        date_column: Option<&str>,
    ) -> Result<HistoricalDataset> {
        let date_column = match date_column {
            Some(name) => name.to_string(),
            None => Self::detect_date_column(&df, target_column)?,
        };

        let target = df.column(target_column).map_err(|e| {
            ForecastError::DataError(format!("Target column '{}' not found: {}", target_column, e))
        })?;
        if !target.dtype().is_numeric() {
            return Err(ForecastError::DataError(format!(
                "Target column '{}' is not numeric",
                target_column
            )));
        }

        let dates = parse_dates(&df, &date_column)?;
        let mut order: Vec<usize> = (0..dates.len()).filter(|&i| dates[i].is_some()).collect();
        order.sort_by_key(|&i| dates[i]);

        if order.len() < dates.len() {
            warn!(skipped = dates.len() - order.len(), "rows without a date are ignored");
        }

        Ok(HistoricalDataset {
            df,
            date_column,
            target_column: target_column.to_string(),
            dates,
            order,
        })
    }

    /// Detect the date column in a DataFrame
    ///
    /// An exact `date` name wins; otherwise the first string or temporal
    /// column named like a date, then the first temporal column. The target
    /// column is never a candidate.
    fn detect_date_column(df: &DataFrame, target_column: &str) -> Result<String> {
        let candidates: Vec<&Series> = df
            .get_columns()
            .iter()
            .filter(|s| s.name() != target_column)
            .collect();

        if let Some(col) = candidates.iter().find(|s| s.name().eq_ignore_ascii_case("date")) {
            return Ok(col.name().to_string());
        }

        // Look for common date column names among string and temporal columns
        let date_like = candidates
            .iter()
            .filter(|s| matches!(s.dtype(), DataType::Utf8) || s.dtype().is_temporal());
        for col in date_like {
            let lower_name = col.name().to_lowercase();
            if lower_name.contains("date")
                || lower_name.contains("time")
                || lower_name.contains("timestamp")
            {
                return Ok(col.name().to_string());
            }
        }

        // Otherwise use the first temporal column
        if let Some(col) = candidates.iter().find(|s| s.dtype().is_temporal()) {
            return Ok(col.name().to_string());
        }

        Err(ForecastError::DataError("No date column found in data".to_string()))
    }
}

/// Parse a date column into calendar dates, one entry per row
fn parse_dates(df: &DataFrame, column: &str) -> Result<Vec<Option<NaiveDate>>> {
    let col = df.column(column).map_err(|e| {
        ForecastError::DataError(format!("Date column '{}' not found: {}", column, e))
    })?;

    match col.dtype() {
        DataType::Utf8 => col
            .utf8()?
            .into_iter()
            .map(|opt| opt.map(parse_date_str).transpose())
            .collect(),
        DataType::Date => {
            let days = col.cast(&DataType::Int32)?;
            let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)
                .ok_or_else(|| ForecastError::DataError("Invalid epoch".to_string()))?;
            Ok(days
                .i32()?
                .into_iter()
                .map(|opt| {
                    opt.and_then(|d| epoch.checked_add_signed(chrono::Duration::days(d as i64)))
                })
                .collect())
        }
        DataType::Datetime(unit, _) => {
            let unit = *unit;
            let raw = col.cast(&DataType::Int64)?;
            Ok(raw
                .i64()?
                .into_iter()
                .map(|opt| {
                    opt.and_then(|ts| {
                        let millis = match unit {
                            TimeUnit::Nanoseconds => ts / 1_000_000,
                            TimeUnit::Microseconds => ts / 1_000,
                            TimeUnit::Milliseconds => ts,
                        };
                        DateTime::<Utc>::from_timestamp_millis(millis).map(|dt| dt.date_naive())
                    })
                })
                .collect())
        }
        other => Err(ForecastError::DataError(format!(
            "Date column '{}' has unsupported type {}",
            column, other
        ))),
    }
}

/// Parse a date string in one of the common layouts
pub fn parse_date_str(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }

    Err(ForecastError::ParseError(format!("Unrecognized date '{}'", s)))
}

impl HistoricalDataset {
    /// Get the DataFrame
    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    /// Get the date column name
    pub fn date_column(&self) -> &str {
        &self.date_column
    }

    /// Get the target column name
    pub fn target_column(&self) -> &str {
        &self.target_column
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.df.height()
    }

    /// Check if the dataset has no rows
    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// All column names in table order
    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Numeric columns other than the date and target, in table order
    ///
    /// Precomputed `lag_<d>` columns are excluded: lag features are rebuilt
    /// from the target history.
    pub fn exogenous_columns(&self) -> Vec<String> {
        self.df
            .get_columns()
            .iter()
            .filter(|s| s.name() != self.date_column && s.name() != self.target_column)
            .filter(|s| s.dtype().is_numeric())
            .filter(|s| LagSpec::parse_feature_name(s.name()).is_none())
            .map(|s| s.name().to_string())
            .collect()
    }

    /// Build the target series from dated rows with a target value
    pub fn target_series(&self) -> Result<TargetSeries> {
        let values = self.column_as_f64(&self.target_column)?;
        let pairs: Vec<(NaiveDate, f64)> = self
            .order
            .iter()
            .filter_map(|&i| match (self.dates[i], values[i]) {
                (Some(date), Some(value)) => Some((date, value)),
                _ => None,
            })
            .collect();

        if pairs.len() < self.order.len() {
            warn!(
                skipped = self.order.len() - pairs.len(),
                column = %self.target_column,
                "rows without a target value are ignored"
            );
        }

        TargetSeries::from_pairs(pairs)
    }

    /// Most recent non-null value of a numeric column
    ///
    /// Returns `None` if the column is absent, not numeric, or entirely null.
    pub fn last_known(&self, column: &str) -> Option<f64> {
        let values = self.column_as_f64(column).ok()?;
        self.order.iter().rev().find_map(|&i| values[i])
    }

    /// Last known value for each named column that has one
    pub fn last_known_values<S: AsRef<str>>(&self, columns: &[S]) -> BTreeMap<String, f64> {
        columns
            .iter()
            .filter_map(|c| {
                let name = c.as_ref();
                self.last_known(name).map(|v| (name.to_string(), v))
            })
            .collect()
    }

    /// Last known value of every numeric column except the date and target
    pub fn last_known_exogenous(&self) -> BTreeMap<String, f64> {
        self.last_known_values(&self.exogenous_columns())
    }

    /// Helper method to get a numeric column as optional f64 values
    fn column_as_f64(&self, column_name: &str) -> Result<Vec<Option<f64>>> {
        let col = self.df.column(column_name).map_err(|e| {
            ForecastError::DataError(format!("Column '{}' not found: {}", column_name, e))
        })?;

        if !col.dtype().is_numeric() {
            return Err(ForecastError::DataError(format!(
                "Column '{}' cannot be converted to f64",
                column_name
            )));
        }

        let cast = col.cast(&DataType::Float64)?;
        let values = cast.f64()?.into_iter().collect();
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_target_series_validation() {
        let ok = TargetSeries::new(vec![date(2024, 1, 1), date(2024, 1, 2)], vec![1.0, 2.0]);
        assert!(ok.is_ok());

        let mismatched = TargetSeries::new(vec![date(2024, 1, 1)], vec![1.0, 2.0]);
        assert!(mismatched.is_err());

        let unordered = TargetSeries::new(vec![date(2024, 1, 2), date(2024, 1, 1)], vec![1.0, 2.0]);
        assert!(unordered.is_err());

        let duplicate = TargetSeries::new(vec![date(2024, 1, 1), date(2024, 1, 1)], vec![1.0, 2.0]);
        assert!(duplicate.is_err());

        let nan = TargetSeries::new(vec![date(2024, 1, 1)], vec![f64::NAN]);
        assert!(nan.is_err());

        assert!(TargetSeries::new(Vec::new(), Vec::new()).is_err());
    }

    #[test]
    fn test_target_series_accessors() {
        let series = TargetSeries::from_pairs(vec![
            (date(2024, 1, 1), 100.0),
            (date(2024, 1, 2), 102.0),
            (date(2024, 1, 5), 101.0),
        ])
        .unwrap();

        assert_eq!(series.len(), 3);
        assert_eq!(series.last_date(), date(2024, 1, 5));
        assert_eq!(series.last_value(), 101.0);
        assert_eq!(series.tail(2), &[102.0, 101.0]);
        assert_eq!(series.tail(10), &[100.0, 102.0, 101.0]);
    }

    #[test]
    fn test_parse_date_str() {
        assert_eq!(parse_date_str("2024-03-01").unwrap(), date(2024, 3, 1));
        assert_eq!(parse_date_str("2024/03/01").unwrap(), date(2024, 3, 1));
        assert_eq!(parse_date_str("2024-03-01 00:00:00").unwrap(), date(2024, 3, 1));
        assert!(parse_date_str("yesterday").is_err());
    }

    #[test]
    fn test_dataset_from_dataframe() {
        let df = DataFrame::new(vec![
            Series::new("Date", &["2024-01-02", "2024-01-01", "2024-01-03"]),
            Series::new("price", &[Some(11.0), Some(10.0), None]),
            Series::new("brent", &[Some(80.0), Some(79.0), Some(81.5)]),
            Series::new("fx", &[Some(1.1), None, None]),
        ])
        .unwrap();

        let dataset = DataLoader::from_dataframe(df, "price", None).unwrap();
        assert_eq!(dataset.date_column(), "Date");
        assert_eq!(dataset.exogenous_columns(), vec!["brent", "fx"]);

        let series = dataset.target_series().unwrap();
        assert_eq!(series.values(), &[10.0, 11.0]);
        assert_eq!(series.last_date(), date(2024, 1, 2));

        assert_eq!(dataset.last_known("brent"), Some(81.5));
        assert_eq!(dataset.last_known("fx"), Some(1.1));
        assert_eq!(dataset.last_known("missing"), None);
        assert_eq!(dataset.last_known("Date"), None);
    }

    #[test]
    fn test_missing_target_column() {
        let df = DataFrame::new(vec![
            Series::new("date", &["2024-01-01"]),
            Series::new("x", &[1.0]),
        ])
        .unwrap();

        assert!(DataLoader::from_dataframe(df, "price", None).is_err());
    }
}
