use cashflow_core::forecast::{self, engine, probability, ForecastConfig};
use cashflow_core::invoice::MAX_DOCUMENT_TOTAL;
use cashflow_core::{CashFlowError, Invoice, PaymentStatus};
use chrono::{Days, NaiveDate};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
}

fn days_after(days: u64) -> NaiveDate {
    as_of() + Days::new(days)
}

fn days_before(days: u64) -> NaiveDate {
    as_of() - Days::new(days)
}

// ===========================================================================
// Worked scenarios
// ===========================================================================

#[test]
fn test_single_unpaid_invoice_due_in_ten_days() {
    let invoices = vec![Invoice::new(
        "INV-1000",
        dec!(1000),
        PaymentStatus::Unpaid,
        days_after(10),
    )];
    let cfg = ForecastConfig::default();
    let f = forecast::forecast(&invoices, 30, as_of(), &cfg).unwrap();

    let p = probability::probability_for_age(-10, PaymentStatus::Unpaid, &cfg);
    let expected = dec!(1000) * p;

    for (offset, point) in f.daily_data.iter().enumerate() {
        if offset == 10 {
            assert_eq!(point.expected, expected);
        } else {
            assert_eq!(point.expected, Decimal::ZERO, "day {offset}");
        }
        let carried = if offset >= 10 { expected } else { Decimal::ZERO };
        assert_eq!(point.cumulative, carried, "cumulative on day {offset}");
    }
    assert_eq!(f.summary.total_expected, expected);
    assert_eq!(f.summary.next_30_days, expected);
}

#[test]
fn test_single_overdue_invoice_twenty_days_late() {
    let invoices = vec![Invoice::new(
        "INV-500",
        dec!(500),
        PaymentStatus::Overdue,
        days_before(20),
    )];
    let cfg = ForecastConfig::default();
    let f = forecast::forecast(&invoices, 90, as_of(), &cfg).unwrap();

    let probs = probability::scenario_probabilities(20, PaymentStatus::Overdue, &cfg);
    assert_eq!(f.daily_data[0].date, as_of());
    assert_eq!(f.daily_data[0].expected, dec!(500) * probs.expected);
    assert!(f.daily_data[1..].iter().all(|p| p.expected.is_zero()));
    assert_eq!(
        f.summary.high_probability_amount,
        dec!(500) * probs.pessimistic
    );
    assert!(f.summary.high_probability_amount < f.summary.total_expected);
}

#[test]
fn test_mixed_portfolio() {
    let invoices = vec![
        Invoice::new("A", dec!(1200), PaymentStatus::Unpaid, days_after(5)),
        Invoice::new("B", dec!(800), PaymentStatus::Overdue, days_before(40)),
        Invoice::new("C", dec!(2000), PaymentStatus::Partial, days_after(45))
            .with_payment_amount(dec!(500)),
        Invoice::new("D", dec!(999), PaymentStatus::Paid, days_after(2)),
        Invoice::new("E", dec!(350), PaymentStatus::Cancelled, days_before(3)),
        Invoice::new("F", dec!(4000), PaymentStatus::Unpaid, days_after(120)),
    ];
    let f = forecast::forecast(&invoices, 60, as_of(), &ForecastConfig::default()).unwrap();

    assert_eq!(f.summary.included_invoices, 3);
    assert_eq!(f.summary.excluded_beyond_horizon, 1);
    assert_eq!(f.summary.overdue_invoices, 1);

    let ids: Vec<&str> = f.contributions.iter().map(|c| c.invoice_id.as_str()).collect();
    assert_eq!(ids, vec!["A", "B", "C"]);
    assert_eq!(f.contributions[2].outstanding, dec!(1500));
    assert_eq!(f.contributions[1].expected_date, as_of());

    // C lands on day 45, outside the first 30 days
    let near: Decimal = f.contributions[..2].iter().map(|c| c.expected_amount).sum();
    assert_eq!(f.summary.next_30_days, near);
}

// ===========================================================================
// Horizons
// ===========================================================================

#[test]
fn test_observed_horizons() {
    for horizon in [30_i64, 60, 90, 180] {
        let f = forecast::forecast(&[], horizon, as_of(), &ForecastConfig::default()).unwrap();
        assert_eq!(f.daily_data.len() as i64, horizon + 1);
        assert_eq!(f.daily_data.last().unwrap().date, days_after(horizon as u64));
        let weekly_days = (horizon as usize + 1).div_ceil(7);
        assert_eq!(f.weekly_data.len(), weekly_days);
    }
}

#[test]
fn test_horizon_shorter_than_every_due_date() {
    let invoices = vec![
        Invoice::new("A", dec!(100), PaymentStatus::Unpaid, days_after(40)),
        Invoice::new("B", dec!(100), PaymentStatus::Unpaid, days_after(50)),
    ];
    let f = forecast::forecast(&invoices, 30, as_of(), &ForecastConfig::default()).unwrap();
    assert_eq!(f.summary.total_expected, Decimal::ZERO);
    assert_eq!(f.summary.excluded_beyond_horizon, 2);
}

#[test]
fn test_non_positive_horizon_is_an_error() {
    for horizon in [0, -1, i64::MIN] {
        match forecast::forecast(&[], horizon, as_of(), &ForecastConfig::default()) {
            Err(CashFlowError::InvalidHorizon { horizon_days, .. }) => {
                assert_eq!(horizon_days, horizon)
            }
            other => panic!("Expected InvalidHorizon, got {other:?}"),
        }
    }
}

#[test]
fn test_custom_max_horizon() {
    let cfg = ForecastConfig {
        max_horizon_days: 365,
        ..ForecastConfig::default()
    };
    assert!(forecast::forecast(&[], 365, as_of(), &cfg).is_ok());
    assert!(forecast::forecast(&[], 366, as_of(), &cfg).is_err());
}

// ===========================================================================
// Amount limits
// ===========================================================================

#[test]
fn test_totals_beyond_decimal_range_rejected() {
    let huge = Decimal::MAX / dec!(2) + Decimal::ONE;
    let invoices: Vec<Invoice> = (0..3)
        .map(|n| Invoice::new(format!("BIG-{n}"), huge, PaymentStatus::Unpaid, as_of()))
        .collect();
    match forecast::forecast(&invoices, 30, as_of(), &ForecastConfig::default()) {
        Err(CashFlowError::InvalidInvoiceData { invoice_id, .. }) => assert_eq!(invoice_id, "BIG-0"),
        other => panic!("Expected InvalidInvoiceData, got {other:?}"),
    }
}

#[test]
fn test_many_invoices_at_maximum_total() {
    let invoices: Vec<Invoice> = (0..1_000)
        .map(|n| {
            Invoice::new(format!("MAX-{n}"), MAX_DOCUMENT_TOTAL, PaymentStatus::Unpaid, as_of())
        })
        .collect();
    let f = forecast::forecast(&invoices, 30, as_of(), &ForecastConfig::default()).unwrap();
    // due today: 0.80 each
    assert_eq!(f.summary.total_expected, MAX_DOCUMENT_TOTAL * dec!(800));
    assert!(f.summary.total_optimistic <= MAX_DOCUMENT_TOTAL * dec!(1000));
}

// ===========================================================================
// Rollups
// ===========================================================================

#[test]
fn test_monthly_rollup_sums_match_daily() {
    let invoices = vec![
        Invoice::new("A", dec!(100), PaymentStatus::Unpaid, days_after(3)),
        Invoice::new("B", dec!(200), PaymentStatus::Unpaid, days_after(33)),
        Invoice::new("C", dec!(300), PaymentStatus::Unpaid, days_after(64)),
    ];
    let f = forecast::forecast(&invoices, 90, as_of(), &ForecastConfig::default()).unwrap();

    // 2024-03-01 + 90 days = 2024-05-30
    assert_eq!(f.monthly_data.len(), 3);
    let monthly_total: Decimal = f.monthly_data.iter().map(|p| p.expected).sum();
    let weekly_total: Decimal = f.weekly_data.iter().map(|p| p.expected).sum();
    assert_eq!(monthly_total, f.summary.total_expected);
    assert_eq!(weekly_total, f.summary.total_expected);
    assert_eq!(
        f.monthly_data.last().unwrap().cumulative,
        f.summary.total_expected
    );
}

// ===========================================================================
// Envelope and input documents
// ===========================================================================

#[test]
fn test_forecast_from_json_document() {
    let json = r#"{
        "as_of": "2024-03-01",
        "horizon_days": 30,
        "invoices": [
            { "id": "X1", "total": "1000.00", "payment_status": "unpaid", "payment_due_date": "2024-03-11" },
            { "id": "X2", "total": 250, "payment_status": "paid", "payment_amount": 250 }
        ],
        "config": { "pessimistic_factor": "0.5" }
    }"#;
    let input: engine::ForecastInput = serde_json::from_str(json).unwrap();
    let out = forecast::forecast_cash_flow(&input).unwrap();

    assert_eq!(out.result.summary.total_expected, dec!(872.5));
    assert_eq!(out.result.summary.high_probability_amount, dec!(436.25));
    assert!(out.warnings.is_empty());
    assert_eq!(out.metadata.precision, "rust_decimal_128bit");
    assert_eq!(out.assumptions["horizon_days"], 30);
}

#[test]
fn test_missing_due_date_rejected() {
    let json = r#"{
        "as_of": "2024-03-01",
        "horizon_days": 30,
        "invoices": [ { "id": "NODUE", "total": 10, "payment_status": "unpaid" } ]
    }"#;
    let input: engine::ForecastInput = serde_json::from_str(json).unwrap();
    match forecast::forecast_cash_flow(&input) {
        Err(CashFlowError::InvalidInvoiceData { invoice_id, reason }) => {
            assert_eq!(invoice_id, "NODUE");
            assert!(reason.contains("due date"));
        }
        other => panic!("Expected InvalidInvoiceData, got {other:?}"),
    }
}

#[test]
fn test_input_is_not_mutated_and_repeatable() {
    let invoices = vec![
        Invoice::new("A", dec!(1234.56), PaymentStatus::Overdue, days_before(7)),
        Invoice::new("B", dec!(78.9), PaymentStatus::Unpaid, days_after(17)),
    ];
    let before = serde_json::to_string(&invoices).unwrap();
    let cfg = ForecastConfig::default();
    let first = forecast::forecast(&invoices, 60, as_of(), &cfg).unwrap();
    let second = forecast::forecast(&invoices, 60, as_of(), &cfg).unwrap();
    assert_eq!(first, second);
    assert_eq!(serde_json::to_string(&invoices).unwrap(), before);
}
