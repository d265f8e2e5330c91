use chrono::NaiveDate;
use lag_forecast::data::{DataLoader, TargetSeries};
use std::io::Write;
use tempfile::NamedTempFile;

fn create_sample_csv() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "Date,coal_price,brent,api2").unwrap();
    writeln!(file, "2024-01-01,100.0,80.0,95.0").unwrap();
    writeln!(file, "2024-01-02,102.0,81.0,").unwrap();
    writeln!(file, "2024-01-03,101.0,82.5,").unwrap();
    file
}

#[test]
fn test_data_loader_from_csv() {
    let file = create_sample_csv();
    let dataset = DataLoader::from_csv(file.path(), "coal_price", None).unwrap();

    assert_eq!(dataset.len(), 3);
    assert_eq!(dataset.date_column(), "Date");
    assert_eq!(dataset.target_column(), "coal_price");
    assert_eq!(dataset.exogenous_columns(), vec!["brent", "api2"]);
}

#[test]
fn test_target_series_from_csv() {
    let file = create_sample_csv();
    let dataset = DataLoader::from_csv(file.path(), "coal_price", Some("Date")).unwrap();
    let series: TargetSeries = dataset.target_series().unwrap();

    assert_eq!(series.values(), &[100.0, 102.0, 101.0]);
    assert_eq!(series.last_date(), NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
}

#[test]
fn test_last_known_skips_trailing_nulls() {
    let file = create_sample_csv();
    let dataset = DataLoader::from_csv(file.path(), "coal_price", None).unwrap();

    assert_eq!(dataset.last_known("brent"), Some(82.5));
    assert_eq!(dataset.last_known("api2"), Some(95.0));
    assert_eq!(dataset.last_known("newcastle"), None);

    let last = dataset.last_known_exogenous();
    assert_eq!(last.len(), 2);
    assert_eq!(last.get("api2"), Some(&95.0));
}

#[test]
fn test_data_loader_error_handling() {
    // Non-existent file
    assert!(DataLoader::from_csv("nonexistent_file.csv", "coal_price", None).is_err());

    // Missing target column
    let file = create_sample_csv();
    assert!(DataLoader::from_csv(file.path(), "richards_bay", None).is_err());

    // Unsorted, duplicated dates
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,price").unwrap();
    writeln!(file, "2024-01-02,1.0").unwrap();
    writeln!(file, "2024-01-02,2.0").unwrap();
    let dataset = DataLoader::from_csv(file.path(), "price", None).unwrap();
    assert!(dataset.target_series().is_err());
}

#[test]
fn test_unsorted_rows_are_ordered_by_date() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,price,brent").unwrap();
    writeln!(file, "2024-01-03,3.0,30.0").unwrap();
    writeln!(file, "2024-01-01,1.0,10.0").unwrap();
    writeln!(file, "2024-01-02,2.0,20.0").unwrap();

    let dataset = DataLoader::from_csv(file.path(), "price", None).unwrap();
    assert_eq!(dataset.target_series().unwrap().values(), &[1.0, 2.0, 3.0]);
    assert_eq!(dataset.last_known("brent"), Some(30.0));
}

#[test]
fn test_date_detection_skips_numeric_time_stamp_columns() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "\"Coal, No time stamp, USD/t\",Date,\"Brent, No time stamp, USD/bbl\""
    )
    .unwrap();
    writeln!(file, "100.0,2024-01-01,80.0").unwrap();
    writeln!(file, "102.0,2024-01-02,81.0").unwrap();

    let dataset = DataLoader::from_csv(file.path(), "Coal, No time stamp, USD/t", None).unwrap();
    assert_eq!(dataset.date_column(), "Date");
    assert_eq!(
        dataset.exogenous_columns(),
        vec!["Brent, No time stamp, USD/bbl"]
    );
    assert_eq!(dataset.target_series().unwrap().values(), &[100.0, 102.0]);
}

#[test]
fn test_date_detection_falls_back_to_date_like_string_column() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "price,obs_time").unwrap();
    writeln!(file, "10.0,2024-03-01").unwrap();
    writeln!(file, "11.0,2024-03-02").unwrap();

    let dataset = DataLoader::from_csv(file.path(), "price", None).unwrap();
    assert_eq!(dataset.date_column(), "obs_time");
}

#[test]
fn test_precomputed_lag_columns_are_not_exogenous() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "Date,price,brent,lag_1,lag_7").unwrap();
    writeln!(file, "2024-01-01,100.0,80.0,,").unwrap();
    writeln!(file, "2024-01-02,101.0,81.0,100.0,").unwrap();

    let dataset = DataLoader::from_csv(file.path(), "price", None).unwrap();
    assert_eq!(dataset.exogenous_columns(), vec!["brent"]);
    assert!(!dataset.last_known_exogenous().contains_key("lag_1"));
}
