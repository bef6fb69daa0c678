//! Accounts receivable aging.
//!
//! Buckets every open invoice's outstanding amount by days past due:
//! current (not yet due), 1-30, 31-60, 61-90 and 90+.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::invoice::{validate_invoices, Invoice};
use crate::types::{ratio_or_zero, round_money, with_metadata, ComputationOutput, Money, Rate};
use crate::{CashFlowError, CashFlowResult};

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgingInput {
    pub invoices: Vec<Invoice>,
    pub as_of: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgingBucket {
    pub label: String,
    /// Inclusive lower bound in days past due. `None` for the current bucket.
    pub min_days: Option<i64>,
    /// Inclusive upper bound. `None` for the open-ended bucket.
    pub max_days: Option<i64>,
    pub invoice_count: u32,
    pub amount: Money,
    /// Share of total outstanding (0-1).
    pub share: Rate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgingReport {
    pub as_of: NaiveDate,
    pub buckets: Vec<AgingBucket>,
    pub total_outstanding: Money,
    pub overdue_amount: Money,
    /// Days past due weighted by outstanding amount, over overdue invoices.
    pub weighted_average_days_overdue: Decimal,
}

impl AgingReport {
    /// Display copy: money to `dp` places, shares and day averages to `dp + 2`.
    pub fn rounded(&self, dp: u32) -> Self {
        AgingReport {
            as_of: self.as_of,
            buckets: self
                .buckets
                .iter()
                .map(|b| AgingBucket {
                    amount: round_money(b.amount, dp),
                    share: round_money(b.share, dp + 2),
                    ..b.clone()
                })
                .collect(),
            total_outstanding: round_money(self.total_outstanding, dp),
            overdue_amount: round_money(self.overdue_amount, dp),
            weighted_average_days_overdue: round_money(self.weighted_average_days_overdue, dp + 2),
        }
    }
}

/// (label, min, max) for the overdue buckets.
const OVERDUE_BUCKETS: [(&str, i64, Option<i64>); 4] = [
    ("1-30", 1, Some(30)),
    ("31-60", 31, Some(60)),
    ("61-90", 61, Some(90)),
    ("90+", 91, None),
];

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn aging_report(input: &AgingInput) -> CashFlowResult<ComputationOutput<AgingReport>> {
    let start = Instant::now();
    validate_invoices(&input.invoices)?;

    let mut buckets: Vec<AgingBucket> = std::iter::once(("current", None, Some(0)))
        .chain(
            OVERDUE_BUCKETS
                .iter()
                .map(|&(label, min, max)| (label, Some(min), max)),
        )
        .map(|(label, min_days, max_days)| AgingBucket {
            label: label.to_string(),
            min_days,
            max_days,
            invoice_count: 0,
            amount: Decimal::ZERO,
            share: Decimal::ZERO,
        })
        .collect();

    let mut total_outstanding = Decimal::ZERO;
    let mut overdue_amount = Decimal::ZERO;
    let mut weighted_days = Decimal::ZERO;

    for invoice in input.invoices.iter().filter(|inv| inv.is_open()) {
        let outstanding = invoice.outstanding();
        if outstanding <= Decimal::ZERO {
            continue;
        }
        let Some(days) = invoice.days_from_due(input.as_of) else {
            continue;
        };

        let bucket = &mut buckets[bucket_index(days)];
        bucket.invoice_count += 1;
        bucket.amount += outstanding;
        total_outstanding += outstanding;

        if days > 0 {
            overdue_amount += outstanding;
            weighted_days = outstanding
                .checked_mul(Decimal::from(days))
                .and_then(|w| weighted_days.checked_add(w))
                .ok_or_else(|| {
                    CashFlowError::invoice(&invoice.id, "amount-weighted days overdue overflow")
                })?;
        }
    }

    for bucket in &mut buckets {
        bucket.share = ratio_or_zero(bucket.amount, total_outstanding);
    }

    let mut warnings: Vec<String> = Vec::new();
    let severe = &buckets[buckets.len() - 1];
    if severe.invoice_count > 0 {
        warnings.push(format!(
            "{} invoice(s) totalling {} are more than 90 days past due.",
            severe.invoice_count, severe.amount
        ));
    }

    let report = AgingReport {
        as_of: input.as_of,
        buckets,
        total_outstanding,
        overdue_amount,
        weighted_average_days_overdue: ratio_or_zero(weighted_days, overdue_amount),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "as_of": input.as_of,
        "basis": "days past payment due date",
        "partial_invoices": "remaining balance only",
    });

    Ok(with_metadata(
        "Accounts receivable aging",
        &assumptions,
        warnings,
        elapsed,
        report,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn bucket_index(days_from_due: i64) -> usize {
    match days_from_due {
        d if d <= 0 => 0,
        1..=30 => 1,
        31..=60 => 2,
        61..=90 => 3,
        _ => 4,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
