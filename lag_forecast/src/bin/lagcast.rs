use anyhow::{bail, Context};
use clap::Parser;
use lag_forecast::{
    ConfidenceBand, DataLoader, ForecastConfig, LagSpec, LinearModel, PreparedForecast,
};
use std::io;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Project a price series forward with a pre-trained lag model")]
struct Cli {
    /// Historical dataset (CSV with a header row)
    #[arg(long, value_name = "FILE")]
    data: PathBuf,

    /// Model artifact (linear model JSON)
    #[arg(long, value_name = "FILE")]
    model: PathBuf,

    /// Forecast configuration (TOML)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Target column; overrides the config file
    #[arg(long)]
    target: Option<String>,

    /// Date column; overrides the config file
    #[arg(long)]
    date_column: Option<String>,

    /// Comma-separated lags, e.g. 1,2,3,7,14
    #[arg(long, value_delimiter = ',')]
    lags: Option<Vec<usize>>,

    /// Number of days to forecast
    #[arg(long)]
    horizon: Option<usize>,

    /// Add a fixed ±epsilon band around each prediction
    #[arg(long, value_name = "EPSILON")]
    band: Option<f64>,

    /// Output CSV; `-` writes to stdout
    #[arg(long, short, default_value = "forecast_30_days.csv")]
    output: String,
}

fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ForecastConfig::from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ForecastConfig::default(),
    };
    if let Some(target) = cli.target {
        config.target_column = Some(target);
    }
    if let Some(date_column) = cli.date_column {
        config.date_column = Some(date_column);
    }
    if let Some(lags) = cli.lags {
        config.lags = LagSpec::new(lags)?;
    }
    if let Some(horizon) = cli.horizon {
        config.horizon = horizon;
    }
    if let Some(epsilon) = cli.band {
        config.band = Some(ConfidenceBand::new(epsilon)?);
    }

    let Some(target) = config.target_column.clone() else {
        bail!("no target column: pass --target or set target_column in the config");
    };

    let dataset = DataLoader::from_csv(&cli.data, &target, config.date_column.as_deref())
        .with_context(|| format!("loading dataset {}", cli.data.display()))?;
    let model = LinearModel::from_json_path(&cli.model)
        .with_context(|| format!("loading model {}", cli.model.display()))?;

    let prepared = PreparedForecast::from_dataset(model, &config, &dataset)?;
    let table = prepared.run()?;

    if cli.output == "-" {
        table.write_csv(io::stdout().lock())?;
    } else {
        table.to_csv_path(&cli.output)?;
        info!(path = %cli.output, rows = table.len(), "forecast written");
    }

    Ok(())
}
