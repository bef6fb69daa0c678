use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use serde_json::Value;
use tracing::info;

use cashflow_core::forecast::{self, ForecastInput};

use crate::input;

/// Which rollups to keep in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Series {
    Daily,
    Weekly,
    Monthly,
    All,
}

impl Series {
    fn keeps(self, key: &str) -> bool {
        match self {
            Series::All => true,
            Series::Daily => key == "daily_data",
            Series::Weekly => key == "weekly_data",
            Series::Monthly => key == "monthly_data",
        }
    }
}

/// Arguments for the cash-flow forecast
#[derive(Args)]
pub struct ForecastArgs {
    /// Path to JSON or YAML input file (invoices, optional horizon_days, as_of, config)
    #[arg(long)]
    pub input: Option<String>,

    /// Forecast horizon in days (overrides the input document)
    #[arg(long)]
    pub horizon_days: Option<i64>,

    /// Anchor date, YYYY-MM-DD (overrides the input; defaults to today)
    #[arg(long)]
    pub as_of: Option<NaiveDate>,

    /// Probability curve configuration file (JSON or YAML)
    #[arg(long)]
    pub config: Option<String>,

    /// Series to include in the output
    #[arg(long, value_enum, default_value = "all")]
    pub series: Series,
}

pub fn run_forecast(args: ForecastArgs, precision: u32) -> Result<Value, Box<dyn std::error::Error>> {
    let mut document: Value = if let Some(ref path) = args.input {
        input::file::read_value(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--input file or invoices on stdin are required for a forecast".into());
    };

    let config = match args.config {
        Some(ref path) => Some(input::file::read_value(path)?),
        None => None,
    };
    apply_overrides(&mut document, args.horizon_days, args.as_of, config)?;

    let forecast_input: ForecastInput = serde_json::from_value(document)?;
    info!(
        invoices = forecast_input.invoices.len(),
        horizon_days = forecast_input.horizon_days,
        as_of = %forecast_input.as_of,
        "running forecast"
    );

    let mut output = forecast::forecast_cash_flow(&forecast_input)?;
    output.result = output.result.rounded(precision);

    let mut value = serde_json::to_value(output)?;
    if let Some(Value::Object(result)) = value.get_mut("result") {
        result.retain(|key, _| !key.ends_with("_data") || args.series.keeps(key));
    }
    Ok(value)
}

/// Fold command-line overrides into the input document before it is typed.
///
/// Config file keys are layered over any `config` object already present.
fn apply_overrides(
    document: &mut Value,
    horizon_days: Option<i64>,
    as_of: Option<NaiveDate>,
    config: Option<Value>,
) -> Result<(), Box<dyn std::error::Error>> {
    let Value::Object(map) = document else {
        return Err("forecast input must be an object with an \"invoices\" array".into());
    };

    if let Some(days) = horizon_days {
        map.insert("horizon_days".into(), days.into());
    }
    if !map.contains_key("horizon_days") {
        return Err("--horizon-days is required (or set horizon_days in the input)".into());
    }

    match as_of {
        Some(date) => {
            map.insert("as_of".into(), serde_json::to_value(date)?);
        }
        None if !map.contains_key("as_of") => {
            let today = chrono::Local::now().date_naive();
            map.insert("as_of".into(), serde_json::to_value(today)?);
        }
        None => {}
    }

    match config {
        Some(Value::Object(overrides)) => {
            let entry = map
                .entry("config")
                .or_insert_with(|| Value::Object(Default::default()));
            match entry {
                Value::Object(existing) => existing.extend(overrides),
                other => *other = Value::Object(overrides),
            }
        }
        Some(_) => return Err("--config must contain a mapping of curve parameters".into()),
        None => {}
    }

    Ok(())
}
