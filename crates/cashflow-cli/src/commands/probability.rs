use clap::Args;
use serde_json::{json, Value};

use cashflow_core::forecast::{scenario_probabilities, ForecastConfig};
use cashflow_core::PaymentStatus;

use crate::input;

/// Arguments for a single probability lookup
#[derive(Args)]
#[command(allow_negative_numbers = true)]
pub struct ProbabilityArgs {
    /// Days past the due date (negative while not yet due)
    #[arg(long)]
    pub days_from_due: i64,

    /// Payment status (unpaid, partial, overdue)
    #[arg(long, default_value = "unpaid")]
    pub status: PaymentStatus,

    /// Probability curve configuration file (JSON or YAML)
    #[arg(long)]
    pub config: Option<String>,
}

pub fn run_probability(args: ProbabilityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let config: ForecastConfig = match args.config {
        Some(ref path) => input::file::read_document(path)?,
        None => ForecastConfig::default(),
    };
    config.validate()?;

    if !args.status.is_open() {
        return Err(format!("{} invoices are not forecast", args.status).into());
    }

    let probabilities = scenario_probabilities(args.days_from_due, args.status, &config);
    Ok(json!({
        "result": {
            "days_from_due": args.days_from_due,
            "status": args.status,
            "expected": probabilities.expected,
            "optimistic": probabilities.optimistic,
            "pessimistic": probabilities.pessimistic,
        }
    }))
}
