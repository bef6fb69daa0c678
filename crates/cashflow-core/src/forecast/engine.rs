//! Receivables cash-flow forecast.
//!
//! Projects expected cash receipts from open invoices over a horizon of
//! `horizon_days` days after an explicit `as_of` date:
//! - Paid and cancelled invoices, and anything with nothing outstanding, are
//!   dropped.
//! - Each remaining invoice gets expected / optimistic / pessimistic
//!   collection probabilities from its age relative to the due date.
//! - Invoices due inside `[as_of, as_of + horizon_days]` land on their due
//!   date; overdue ones land on `as_of`; later ones are excluded.
//! - Daily values are accumulated left to right, then rolled up into weekly
//!   and calendar-month windows.
//!
//! The engine is a pure function of `(invoices, horizon_days, as_of, config)`.
//! All calculations use `rust_decimal::Decimal`; rounding is left to the
//! presentation layer via [`CashFlowForecast::rounded`].

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, trace};

use super::config::ForecastConfig;
use super::probability::{scenario_probabilities, ScenarioProbabilities};
use super::rollup;
use crate::invoice::{validate_invoices, Invoice};
use crate::types::{round_money, with_metadata, ComputationOutput, Money};
use crate::{CashFlowError, CashFlowResult};

/// Number of leading daily points summed into `next_30_days`.
const NEAR_TERM_DAYS: usize = 30;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

/// Input document for [`forecast_cash_flow`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastInput {
    pub invoices: Vec<Invoice>,
    /// Forecast window length in days (observed: 30, 60, 90, 180).
    pub horizon_days: i64,
    /// Day the forecast is anchored to ("today").
    pub as_of: NaiveDate,
    #[serde(default)]
    pub config: ForecastConfig,
}

/// Amounts receivable on one day, or within one rollup window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub expected: Money,
    pub optimistic: Money,
    pub pessimistic: Money,
    pub cumulative: Money,
    pub cumulative_optimistic: Money,
    pub cumulative_pessimistic: Money,
}

impl ForecastPoint {
    fn empty(date: NaiveDate) -> Self {
        ForecastPoint {
            date,
            expected: Decimal::ZERO,
            optimistic: Decimal::ZERO,
            pessimistic: Decimal::ZERO,
            cumulative: Decimal::ZERO,
            cumulative_optimistic: Decimal::ZERO,
            cumulative_pessimistic: Decimal::ZERO,
        }
    }

    fn rounded(&self, dp: u32) -> Self {
        ForecastPoint {
            date: self.date,
            expected: round_money(self.expected, dp),
            optimistic: round_money(self.optimistic, dp),
            pessimistic: round_money(self.pessimistic, dp),
            cumulative: round_money(self.cumulative, dp),
            cumulative_optimistic: round_money(self.cumulative_optimistic, dp),
            cumulative_pessimistic: round_money(self.cumulative_pessimistic, dp),
        }
    }
}

/// How one invoice feeds the forecast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceContribution {
    pub invoice_id: String,
    pub outstanding: Money,
    /// Positive when overdue, negative while not yet due.
    pub days_from_due: i64,
    /// Day the receipt is projected on.
    pub expected_date: NaiveDate,
    pub probabilities: ScenarioProbabilities,
    pub expected_amount: Money,
    pub optimistic_amount: Money,
    pub pessimistic_amount: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastSummary {
    /// Sum of expected receipts over the full horizon.
    pub total_expected: Money,
    pub total_optimistic: Money,
    /// Expected receipts over the first 30 days.
    pub next_30_days: Money,
    /// Sum of pessimistic receipts: the conservative floor.
    pub high_probability_amount: Money,
    /// `total_expected - high_probability_amount`.
    pub risk_amount: Money,
    pub included_invoices: u32,
    pub excluded_beyond_horizon: u32,
    /// Overdue invoices projected onto the as-of date.
    pub overdue_invoices: u32,
}

/// Full forecast result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowForecast {
    pub as_of: NaiveDate,
    pub horizon_days: i64,
    pub daily_data: Vec<ForecastPoint>,
    pub weekly_data: Vec<ForecastPoint>,
    pub monthly_data: Vec<ForecastPoint>,
    pub summary: ForecastSummary,
    pub contributions: Vec<InvoiceContribution>,
}

impl CashFlowForecast {
    /// Copy with every monetary value rounded to `dp` places. Meant for
    /// display only; never feed a rounded forecast back into calculations.
    pub fn rounded(&self, dp: u32) -> Self {
        let points = |series: &[ForecastPoint]| -> Vec<ForecastPoint> {
            series.iter().map(|p| p.rounded(dp)).collect()
        };
        let s = &self.summary;

        CashFlowForecast {
            as_of: self.as_of,
            horizon_days: self.horizon_days,
            daily_data: points(&self.daily_data),
            weekly_data: points(&self.weekly_data),
            monthly_data: points(&self.monthly_data),
            summary: ForecastSummary {
                total_expected: round_money(s.total_expected, dp),
                total_optimistic: round_money(s.total_optimistic, dp),
                next_30_days: round_money(s.next_30_days, dp),
                high_probability_amount: round_money(s.high_probability_amount, dp),
                risk_amount: round_money(s.risk_amount, dp),
                ..s.clone()
            },
            contributions: self
                .contributions
                .iter()
                .map(|c| InvoiceContribution {
                    outstanding: round_money(c.outstanding, dp),
                    expected_amount: round_money(c.expected_amount, dp),
                    optimistic_amount: round_money(c.optimistic_amount, dp),
                    pessimistic_amount: round_money(c.pessimistic_amount, dp),
                    ..c.clone()
                })
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run a forecast and wrap it in the standard output envelope.
pub fn forecast_cash_flow(
    input: &ForecastInput,
) -> CashFlowResult<ComputationOutput<CashFlowForecast>> {
    let start = Instant::now();

    let result = forecast(
        &input.invoices,
        input.horizon_days,
        input.as_of,
        &input.config,
    )?;

    let mut warnings: Vec<String> = Vec::new();
    let summary = &result.summary;
    if summary.excluded_beyond_horizon > 0 {
        warnings.push(format!(
            "{} invoice(s) due after the {}-day horizon were excluded.",
            summary.excluded_beyond_horizon, input.horizon_days
        ));
    }
    if summary.overdue_invoices > 0 {
        warnings.push(format!(
            "{} overdue invoice(s) are projected as collectible on {}.",
            summary.overdue_invoices, input.as_of
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "as_of": input.as_of,
        "horizon_days": input.horizon_days,
        "overdue_assignment": "collapsed onto as_of",
        "horizon_boundary": "inclusive",
        "probability_curve": input.config,
    });

    Ok(with_metadata(
        "Probability-weighted receivables forecast",
        &assumptions,
        warnings,
        elapsed,
        result,
    ))
}

/// Forecast expected cash receipts from `invoices` over
/// `[as_of, as_of + horizon_days]`.
///
/// Rejects a non-positive or oversized horizon and any invoice that breaks
/// the [`Invoice::validate`] contract; no partial result is returned.
pub fn forecast(
    invoices: &[Invoice],
    horizon_days: i64,
    as_of: NaiveDate,
    config: &ForecastConfig,
) -> CashFlowResult<CashFlowForecast> {
    config.validate()?;
    validate_horizon(horizon_days, as_of, config)?;
    validate_invoices(invoices)?;

    let mut daily: Vec<ForecastPoint> = as_of
        .iter_days()
        .take(horizon_days as usize + 1)
        .map(ForecastPoint::empty)
        .collect();

    let mut contributions: Vec<InvoiceContribution> = Vec::new();
    let mut excluded_beyond_horizon: u32 = 0;
    let mut overdue_invoices: u32 = 0;

    for invoice in invoices.iter().filter(|inv| inv.is_open()) {
        let outstanding = invoice.outstanding();
        if outstanding <= Decimal::ZERO {
            continue;
        }
        // validate_invoices guarantees a due date on open invoices
        let Some(days_from_due) = invoice.days_from_due(as_of) else {
            continue;
        };

        let offset = if days_from_due >= 0 {
            0
        } else {
            days_from_due.unsigned_abs()
        };
        if offset > horizon_days.unsigned_abs() {
            trace!(invoice = %invoice.id, days_from_due, "due beyond horizon, excluded");
            excluded_beyond_horizon += 1;
            continue;
        }
        let Some(point) = daily.get_mut(offset as usize) else {
            continue;
        };

        if days_from_due > 0 {
            overdue_invoices += 1;
        }

        let probabilities = scenario_probabilities(days_from_due, invoice.payment_status, config);
        let expected_amount = outstanding * probabilities.expected;
        let optimistic_amount = outstanding * probabilities.optimistic;
        let pessimistic_amount = outstanding * probabilities.pessimistic;

        point.expected += expected_amount;
        point.optimistic += optimistic_amount;
        point.pessimistic += pessimistic_amount;

        trace!(
            invoice = %invoice.id,
            days_from_due,
            date = %point.date,
            p_expected = %probabilities.expected,
            "invoice assigned"
        );

        contributions.push(InvoiceContribution {
            invoice_id: invoice.id.clone(),
            outstanding,
            days_from_due,
            expected_date: point.date,
            probabilities,
            expected_amount,
            optimistic_amount,
            pessimistic_amount,
        });
    }

    accumulate(&mut daily);
    let summary = summarise(
        &daily,
        contributions.len() as u32,
        excluded_beyond_horizon,
        overdue_invoices,
    );

    debug!(
        %as_of,
        horizon_days,
        invoices = invoices.len(),
        included = summary.included_invoices,
        excluded = summary.excluded_beyond_horizon,
        total_expected = %summary.total_expected,
        "cash-flow forecast computed"
    );

    Ok(CashFlowForecast {
        as_of,
        horizon_days,
        weekly_data: rollup::weekly(&daily),
        monthly_data: rollup::monthly(&daily),
        daily_data: daily,
        summary,
        contributions,
    })
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_horizon(
    horizon_days: i64,
    as_of: NaiveDate,
    config: &ForecastConfig,
) -> CashFlowResult<()> {
    if horizon_days <= 0 {
        return Err(CashFlowError::InvalidHorizon {
            horizon_days,
            reason: "Horizon must be a positive number of days.".into(),
        });
    }
    if horizon_days > config.max_horizon_days {
        return Err(CashFlowError::InvalidHorizon {
            horizon_days,
            reason: format!(
                "Horizon exceeds the configured maximum of {} days.",
                config.max_horizon_days
            ),
        });
    }
    if as_of
        .checked_add_days(Days::new(horizon_days.unsigned_abs()))
        .is_none()
    {
        return Err(CashFlowError::DateError(format!(
            "{as_of} plus {horizon_days} days is outside the supported calendar range"
        )));
    }
    Ok(())
}

/// Left-to-right running sums: `cumulative[d] = cumulative[d-1] + expected[d]`.
fn accumulate(daily: &mut [ForecastPoint]) {
    let mut expected = Decimal::ZERO;
    let mut optimistic = Decimal::ZERO;
    let mut pessimistic = Decimal::ZERO;

    for point in daily.iter_mut() {
        expected += point.expected;
        optimistic += point.optimistic;
        pessimistic += point.pessimistic;
        point.cumulative = expected;
        point.cumulative_optimistic = optimistic;
        point.cumulative_pessimistic = pessimistic;
    }
}

fn summarise(
    daily: &[ForecastPoint],
    included_invoices: u32,
    excluded_beyond_horizon: u32,
    overdue_invoices: u32,
) -> ForecastSummary {
    let total_expected: Money = daily.iter().map(|p| p.expected).sum();
    let total_optimistic: Money = daily.iter().map(|p| p.optimistic).sum();
    let high_probability_amount: Money = daily.iter().map(|p| p.pessimistic).sum();
    let next_30_days: Money = daily
        .iter()
        .take(NEAR_TERM_DAYS)
        .map(|p| p.expected)
        .sum();

    ForecastSummary {
        total_expected,
        total_optimistic,
        next_30_days,
        high_probability_amount,
        risk_amount: total_expected - high_probability_amount,
        included_invoices,
        excluded_beyond_horizon,
        overdue_invoices,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::PaymentStatus;
    use rust_decimal_macros::dec;

    // -- Test helpers --------------------------------------------------------

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn due_in(days: i64) -> NaiveDate {
        if days >= 0 {
            as_of() + Days::new(days as u64)
        } else {
            as_of() - Days::new(days.unsigned_abs())
        }
    }

    fn invoice(id: &str, total: Decimal, status: PaymentStatus, due_in_days: i64) -> Invoice {
        Invoice::new(id, total, status, due_in(due_in_days))
    }

    fn run(invoices: &[Invoice], horizon: i64) -> CashFlowForecast {
        forecast(invoices, horizon, as_of(), &ForecastConfig::default()).unwrap()
    }

    // -- Validation tests ----------------------------------------------------

    #[test]
    fn test_zero_horizon_rejected() {
        let result = forecast(&[], 0, as_of(), &ForecastConfig::default());
        assert!(matches!(
            result,
            Err(CashFlowError::InvalidHorizon { horizon_days: 0, .. })
        ));
    }

    #[test]
    fn test_negative_horizon_rejected() {
        let result = forecast(&[], -30, as_of(), &ForecastConfig::default());
        assert!(matches!(result, Err(CashFlowError::InvalidHorizon { .. })));
    }

    #[test]
    fn test_horizon_above_maximum_rejected() {
        let result = forecast(&[], 3651, as_of(), &ForecastConfig::default());
        assert!(matches!(result, Err(CashFlowError::InvalidHorizon { .. })));
    }

    #[test]
    fn test_horizon_past_calendar_end_rejected() {
        let result = forecast(&[], 30, NaiveDate::MAX, &ForecastConfig::default());
        assert!(matches!(result, Err(CashFlowError::DateError(_))));
    }

    #[test]
    fn test_invalid_invoice_rejected_without_partial_result() {
        let invoices = vec![
            invoice("OK", dec!(100), PaymentStatus::Unpaid, 5),
            invoice("NEG", dec!(-100), PaymentStatus::Unpaid, 5),
        ];
        let result = forecast(&invoices, 30, as_of(), &ForecastConfig::default());
        assert!(matches!(
            result,
            Err(CashFlowError::InvalidInvoiceData { ref invoice_id, .. }) if invoice_id == "NEG"
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let cfg = ForecastConfig {
            pessimistic_factor: dec!(1.5),
            ..ForecastConfig::default()
        };
        assert!(forecast(&[], 30, as_of(), &cfg).is_err());
    }

    // -- Structure tests -----------------------------------------------------

    #[test]
    fn test_daily_series_length_inclusive() {
        let f = run(&[], 30);
        assert_eq!(f.daily_data.len(), 31);
        assert_eq!(f.daily_data[0].date, as_of());
        assert_eq!(f.daily_data[30].date, due_in(30));
    }

    #[test]
    fn test_empty_invoices_all_zero() {
        let f = run(&[], 90);
        assert!(f
            .daily_data
            .iter()
            .all(|p| p == &ForecastPoint::empty(p.date)));
        assert_eq!(f.summary.total_expected, Decimal::ZERO);
        assert_eq!(f.summary.high_probability_amount, Decimal::ZERO);
        assert_eq!(f.summary.risk_amount, Decimal::ZERO);
        assert!(f.contributions.is_empty());
    }

    #[test]
    fn test_weekly_and_monthly_present() {
        let f = run(&[], 60);
        assert_eq!(f.weekly_data.len(), 9); // 61 days
        // 2024-06-01 .. 2024-07-31
        assert_eq!(f.monthly_data.len(), 2);
    }

    // -- Assignment tests ----------------------------------------------------

    #[test]
    fn test_future_invoice_lands_on_due_date() {
        let f = run(&[invoice("A", dec!(1000), PaymentStatus::Unpaid, 10)], 30);
        // p(10 days out) = 0.85 + 0.0025 * 9 = 0.8725
        assert_eq!(f.daily_data[10].expected, dec!(872.5));
        assert_eq!(f.daily_data[9].cumulative, Decimal::ZERO);
        assert_eq!(f.daily_data[10].cumulative, dec!(872.5));
        assert_eq!(f.daily_data[30].cumulative, dec!(872.5));
        assert_eq!(f.summary.total_expected, dec!(872.5));
        assert_eq!(f.summary.next_30_days, dec!(872.5));
    }

    #[test]
    fn test_overdue_invoice_collapses_onto_as_of() {
        let f = run(&[invoice("B", dec!(500), PaymentStatus::Overdue, -20)], 90);
        // p = 0.52, pessimistic = 0.39
        assert_eq!(f.daily_data[0].expected, dec!(260));
        assert_eq!(f.daily_data[0].pessimistic, dec!(195));
        assert!(f.daily_data[1..].iter().all(|p| p.expected.is_zero()));
        assert_eq!(f.summary.high_probability_amount, dec!(195));
        assert_eq!(f.summary.risk_amount, dec!(65));
        assert_eq!(f.summary.overdue_invoices, 1);
    }

    #[test]
    fn test_horizon_boundary_inclusive() {
        let invoices = vec![
            invoice("EDGE", dec!(100), PaymentStatus::Unpaid, 30),
            invoice("OUT", dec!(100), PaymentStatus::Unpaid, 31),
        ];
        let f = run(&invoices, 30);
        assert_eq!(f.summary.included_invoices, 1);
        assert_eq!(f.summary.excluded_beyond_horizon, 1);
        assert!(f.daily_data[30].expected > Decimal::ZERO);
        assert_eq!(f.contributions[0].invoice_id, "EDGE");
    }

    #[test]
    fn test_paid_and_cancelled_ignored() {
        let invoices = vec![
            invoice("P", dec!(100), PaymentStatus::Paid, 3),
            invoice("C", dec!(100), PaymentStatus::Cancelled, -3),
        ];
        let f = run(&invoices, 30);
        assert_eq!(f.summary.total_expected, Decimal::ZERO);
        assert_eq!(f.summary.excluded_beyond_horizon, 0);
    }

    #[test]
    fn test_partial_uses_remainder() {
        let inv = invoice("PART", dec!(1000), PaymentStatus::Partial, 0)
            .with_payment_amount(dec!(400));
        let f = run(&[inv], 30);
        // p = 0.80 + 0.10 boost
        assert_eq!(f.contributions[0].outstanding, dec!(600));
        assert_eq!(f.daily_data[0].expected, dec!(540));
    }

    #[test]
    fn test_fully_paid_partial_dropped() {
        let inv = invoice("PART", dec!(1000), PaymentStatus::Partial, 0)
            .with_payment_amount(dec!(1000));
        let f = run(&[inv], 30);
        assert!(f.contributions.is_empty());
    }

    #[test]
    fn test_next_30_days_excludes_day_30() {
        let invoices = vec![
            invoice("IN", dec!(100), PaymentStatus::Unpaid, 29),
            invoice("LATE", dec!(100), PaymentStatus::Unpaid, 30),
        ];
        let f = run(&invoices, 90);
        assert_eq!(f.summary.next_30_days, f.daily_data[29].expected);
        assert!(f.summary.total_expected > f.summary.next_30_days);
    }

    #[test]
    fn test_same_day_invoices_summed() {
        let invoices = vec![
            invoice("A", dec!(100), PaymentStatus::Unpaid, 5),
            invoice("B", dec!(300), PaymentStatus::Unpaid, 5),
        ];
        let f = run(&invoices, 30);
        // p(5 days out) = 0.86
        assert_eq!(f.daily_data[5].expected, dec!(344));
    }

    // -- Summary tests -------------------------------------------------------

    #[test]
    fn test_summary_matches_contributions() {
        let invoices = vec![
            invoice("A", dec!(1234.56), PaymentStatus::Unpaid, 3),
            invoice("B", dec!(987.65), PaymentStatus::Overdue, -45),
            invoice("C", dec!(50), PaymentStatus::Partial, 17).with_payment_amount(dec!(20)),
        ];
        let f = run(&invoices, 60);
        let contributed: Decimal = f.contributions.iter().map(|c| c.expected_amount).sum();
        assert_eq!(f.summary.total_expected, contributed);
        assert_eq!(
            f.daily_data.last().unwrap().cumulative,
            f.summary.total_expected
        );
        assert_eq!(
            f.weekly_data.last().unwrap().cumulative,
            f.summary.total_expected
        );
    }

    #[test]
    fn test_scenario_ordering_in_summary() {
        let invoices = vec![
            invoice("A", dec!(1000), PaymentStatus::Unpaid, 3),
            invoice("B", dec!(1000), PaymentStatus::Overdue, -200),
        ];
        let f = run(&invoices, 30);
        assert!(f.summary.high_probability_amount <= f.summary.total_expected);
        assert!(f.summary.total_expected <= f.summary.total_optimistic);
    }

    // -- Envelope / presentation ---------------------------------------------

    #[test]
    fn test_envelope_warnings() {
        let input = ForecastInput {
            invoices: vec![
                invoice("LATE", dec!(100), PaymentStatus::Unpaid, 400),
                invoice("OLD", dec!(100), PaymentStatus::Overdue, -4),
            ],
            horizon_days: 90,
            as_of: as_of(),
            config: ForecastConfig::default(),
        };
        let out = forecast_cash_flow(&input).unwrap();
        assert_eq!(out.warnings.len(), 2);
        assert!(out.warnings[0].contains("excluded"));
        assert!(out.warnings[1].contains("overdue"));
    }

    #[test]
    fn test_rounded_copy() {
        let f = run(&[invoice("A", dec!(333.33), PaymentStatus::Overdue, -7)], 30);
        let r = f.rounded(2);
        assert!(r.summary.total_expected.scale() <= 2);
        assert!(r.daily_data[0].expected.scale() <= 2);
        assert!(r.contributions[0].expected_amount.scale() <= 2);
        assert_eq!(r.contributions[0].probabilities, f.contributions[0].probabilities);
        assert_eq!(r.summary.included_invoices, 1);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let f = run(&[invoice("A", dec!(10), PaymentStatus::Unpaid, 1)], 30);
        let json = serde_json::to_string(&f).unwrap();
        let back: CashFlowForecast = serde_json::from_str(&json).unwrap();
        assert_eq!(back, f);
    }

    #[test]
    fn test_input_deserialises_with_default_config() {
        let json = r#"{
            "invoices": [],
            "horizon_days": 30,
            "as_of": "2024-06-01"
        }"#;
        let input: ForecastInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.config, ForecastConfig::default());
    }
}
