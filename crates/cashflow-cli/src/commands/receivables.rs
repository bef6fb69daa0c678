use clap::Args;
use serde_json::Value;

use cashflow_core::receivables::aging::{self, AgingInput};
use cashflow_core::receivables::kpis::{self, InvoiceKpiInput};
use cashflow_core::receivables::offers::{self, OfferKpiInput};

use crate::input;

/// Arguments for receivables aging
#[derive(Args)]
pub struct AgingArgs {
    /// Path to JSON or YAML input file (invoices, as_of)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for invoice KPIs
#[derive(Args)]
pub struct KpiArgs {
    /// Path to JSON or YAML input file (invoices, as_of)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for offer pipeline KPIs
#[derive(Args)]
pub struct OfferArgs {
    /// Path to JSON or YAML input file (offers, as_of)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_aging(args: AgingArgs, precision: u32) -> Result<Value, Box<dyn std::error::Error>> {
    let aging_input: AgingInput = if let Some(ref path) = args.input {
        input::file::read_document(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input file is required for aging".into());
    };

    let mut output = aging::aging_report(&aging_input)?;
    output.result = output.result.rounded(precision);
    Ok(serde_json::to_value(output)?)
}

pub fn run_kpis(args: KpiArgs, precision: u32) -> Result<Value, Box<dyn std::error::Error>> {
    let kpi_input: InvoiceKpiInput = if let Some(ref path) = args.input {
        input::file::read_document(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input file is required for invoice KPIs".into());
    };

    let mut output = kpis::invoice_kpis(&kpi_input)?;
    output.result = output.result.rounded(precision);
    Ok(serde_json::to_value(output)?)
}

pub fn run_offers(args: OfferArgs, precision: u32) -> Result<Value, Box<dyn std::error::Error>> {
    let offer_input: OfferKpiInput = if let Some(ref path) = args.input {
        input::file::read_document(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input file is required for offer KPIs".into());
    };

    let mut output = offers::offer_kpis(&offer_input)?;
    output.result = output.result.rounded(precision);
    Ok(serde_json::to_value(output)?)
}
