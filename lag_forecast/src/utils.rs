//! Utility functions for the lag_forecast crate

use crate::error::{ForecastError, Result};
use chrono::{Days, NaiveDate};

/// Date of forecast step `step` (0-based): `last_date + step + 1` days
pub fn step_date(last_date: NaiveDate, step: usize) -> Result<NaiveDate> {
    last_date
        .checked_add_days(Days::new(step as u64 + 1))
        .ok_or_else(|| {
            ForecastError::DataError(format!(
                "Forecast date overflow {} days after {}",
                step + 1,
                last_date
            ))
        })
}

/// Consecutive calendar days following `last_date`
pub fn future_dates(last_date: NaiveDate, horizon: usize) -> Result<Vec<NaiveDate>> {
    (0..horizon).map(|step| step_date(last_date, step)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_future_dates_cross_month_end() {
        let last = NaiveDate::from_ymd_opt(2024, 2, 28).unwrap();
        let dates = future_dates(last, 3).unwrap();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
            ]
        );
    }

    #[test]
    fn test_zero_horizon() {
        let last = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(future_dates(last, 0).unwrap().is_empty());
    }

    #[test]
    fn test_overflow() {
        assert!(step_date(NaiveDate::MAX, 0).is_err());
    }
}
