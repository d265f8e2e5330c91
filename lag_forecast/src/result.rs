//! Forecast steps and the assembled result table

use crate::error::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// One forecast step: produced once, in chronological order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastStep {
    /// 0-based step index
    pub step: usize,
    /// Target date of the prediction
    pub date: NaiveDate,
    /// Predicted value
    pub value: f64,
    /// Lower bound of the fixed band, when enabled
    pub lower: Option<f64>,
    /// Upper bound of the fixed band, when enabled
    pub upper: Option<f64>,
}

/// One row of the result table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    pub date: NaiveDate,
    pub forecast: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper: Option<f64>,
}

/// Ordered result table with columns date, forecast and optionally lower, upper
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastTable {
    rows: Vec<ForecastRow>,
    with_bounds: bool,
}

/// Assemble forecast steps into a table, ordered by step index
///
/// Bound columns are present when any step carries bounds; steps without
/// bounds then leave those cells empty.
pub fn assemble(steps: &[ForecastStep]) -> ForecastTable {
    let mut ordered: Vec<&ForecastStep> = steps.iter().collect();
    ordered.sort_by_key(|s| s.step);

    let with_bounds = steps.iter().any(|s| s.lower.is_some() || s.upper.is_some());
    let rows = ordered
        .into_iter()
        .map(|s| ForecastRow {
            date: s.date,
            forecast: s.value,
            lower: s.lower,
            upper: s.upper,
        })
        .collect();

    ForecastTable { rows, with_bounds }
}

impl ForecastTable {
    /// Column names in output order
    pub fn columns(&self) -> Vec<&'static str> {
        if self.with_bounds {
            vec!["date", "forecast", "lower", "upper"]
        } else {
            vec!["date", "forecast"]
        }
    }

    /// Table rows in date order
    pub fn rows(&self) -> &[ForecastRow] {
        &self.rows
    }

    /// Whether the band columns are present
    pub fn has_bounds(&self) -> bool {
        self.with_bounds
    }

    /// Forecast values in date order
    pub fn values(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.forecast).collect()
    }

    /// Forecast dates in order
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.date).collect()
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write the table as CSV with a header row
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(self.columns())?;

        for row in &self.rows {
            let mut record = vec![
                row.date.format("%Y-%m-%d").to_string(),
                row.forecast.to_string(),
            ];
            if self.with_bounds {
                record.push(row.lower.map(|v| v.to_string()).unwrap_or_default());
                record.push(row.upper.map(|v| v.to_string()).unwrap_or_default());
            }
            wtr.write_record(&record)?;
        }

        wtr.flush()?;
        Ok(())
    }

    /// Write the table to a CSV file
    pub fn to_csv_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write_csv(file)
    }

    /// CSV text of the table
    pub fn to_csv_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Serialize the rows to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.rows)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn step(step: usize, day: u32, value: f64, band: Option<(f64, f64)>) -> ForecastStep {
        ForecastStep {
            step,
            date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            value,
            lower: band.map(|b| b.0),
            upper: band.map(|b| b.1),
        }
    }

    #[test]
    fn test_assemble_without_bounds() {
        let table = assemble(&[step(0, 1, 10.0, None), step(1, 2, 11.0, None)]);
        assert_eq!(table.columns(), vec!["date", "forecast"]);
        assert_eq!(table.values(), vec![10.0, 11.0]);
        assert_eq!(
            table.to_csv_string().unwrap(),
            "date,forecast\n2024-05-01,10\n2024-05-02,11\n"
        );
    }

    #[test]
    fn test_assemble_with_bounds() {
        let table = assemble(&[step(0, 1, 100.0, Some((98.0, 102.0)))]);
        assert!(table.has_bounds());
        assert_eq!(table.columns(), vec!["date", "forecast", "lower", "upper"]);
        assert_eq!(
            table.to_csv_string().unwrap(),
            "date,forecast,lower,upper\n2024-05-01,100,98,102\n"
        );
    }

    #[test]
    fn test_assemble_orders_by_step_and_is_idempotent() {
        let steps = vec![step(1, 2, 11.0, None), step(0, 1, 10.0, None)];
        let first = assemble(&steps);
        let second = assemble(&steps);

        assert_eq!(first, second);
        assert_eq!(first.values(), vec![10.0, 11.0]);
    }

    #[test]
    fn test_empty_table() {
        let table = assemble(&[]);
        assert!(table.is_empty());
        assert_eq!(table.to_csv_string().unwrap(), "date,forecast\n");
    }

    #[test]
    fn test_json_skips_missing_bounds() {
        let table = assemble(&[step(0, 1, 10.5, None)]);
        assert_eq!(
            table.to_json().unwrap(),
            r#"[{"date":"2024-05-01","forecast":10.5}]"#
        );
    }
}
