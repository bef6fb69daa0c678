mod commands;
mod input;
mod logging;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::forecast::ForecastArgs;
use commands::probability::ProbabilityArgs;
use commands::receivables::{AgingArgs, KpiArgs, OfferArgs};

/// Receivables cash-flow forecasting
#[derive(Parser)]
#[command(
    name = "cff",
    version,
    about = "Receivables cash-flow forecasting",
    long_about = "A CLI for projecting expected cash receipts from open invoices \
                  with decimal precision. Supports probability-weighted forecasts \
                  with optimistic and pessimistic scenarios, receivables aging, \
                  and invoice and offer KPIs."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Decimal places for monetary values in the output
    #[arg(long, default_value_t = 2, global = true)]
    precision: u32,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Forecast expected cash receipts over a horizon
    Forecast(ForecastArgs),
    /// Receivables aging buckets
    Aging(AgingArgs),
    /// Invoice KPIs (collected, outstanding, overdue)
    Kpis(KpiArgs),
    /// Offer pipeline KPIs
    Offers(OfferArgs),
    /// Collection probabilities for one invoice age
    Probability(ProbabilityArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_json);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Forecast(args) => commands::forecast::run_forecast(args, cli.precision),
        Commands::Aging(args) => commands::receivables::run_aging(args, cli.precision),
        Commands::Kpis(args) => commands::receivables::run_kpis(args, cli.precision),
        Commands::Offers(args) => commands::receivables::run_offers(args, cli.precision),
        Commands::Probability(args) => commands::probability::run_probability(args),
        Commands::Version => {
            println!("cff {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
