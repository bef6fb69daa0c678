use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

use cashflow_core::forecast::{self, ForecastConfig};
use cashflow_core::receivables::{aging, kpis, offers};
use cashflow_core::PaymentStatus;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Forecast
// ---------------------------------------------------------------------------

/// Full forecast envelope. Values are unrounded; the caller formats them.
#[napi]
pub fn forecast_cash_flow(input_json: String) -> NapiResult<String> {
    let input: forecast::ForecastInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = forecast::forecast_cash_flow(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct ProbabilityRequest {
    days_from_due: i64,
    #[serde(default = "default_status")]
    status: PaymentStatus,
    #[serde(default)]
    config: ForecastConfig,
}

fn default_status() -> PaymentStatus {
    PaymentStatus::Unpaid
}

#[napi]
pub fn collection_probability(input_json: String) -> NapiResult<String> {
    let request: ProbabilityRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    request.config.validate().map_err(to_napi_error)?;
    let probabilities =
        forecast::scenario_probabilities(request.days_from_due, request.status, &request.config);
    serde_json::to_string(&probabilities).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Receivables
// ---------------------------------------------------------------------------

#[napi]
pub fn aging_report(input_json: String) -> NapiResult<String> {
    let input: aging::AgingInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = aging::aging_report(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn invoice_kpis(input_json: String) -> NapiResult<String> {
    let input: kpis::InvoiceKpiInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = kpis::invoice_kpis(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn offer_kpis(input_json: String) -> NapiResult<String> {
    let input: offers::OfferKpiInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = offers::offer_kpis(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
