use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::invoice::{validate_invoices, Invoice, PaymentStatus};
use crate::types::{ratio_or_zero, round_money, with_metadata, ComputationOutput, Money, Rate};
use crate::CashFlowResult;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceKpiInput {
    pub invoices: Vec<Invoice>,
    pub as_of: NaiveDate,
}

/// Headline invoice figures for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceKpis {
    /// Non-cancelled invoices.
    pub invoice_count: u32,
    pub total_invoiced: Money,
    pub total_collected: Money,
    pub total_outstanding: Money,
    pub overdue_count: u32,
    pub overdue_amount: Money,
    /// collected / invoiced.
    pub collection_rate: Rate,
    pub average_invoice_value: Money,
    /// Plain average over overdue invoices.
    pub average_days_overdue: Decimal,
    /// Every status, cancelled included.
    pub status_counts: BTreeMap<PaymentStatus, u32>,
}

impl InvoiceKpis {
    /// Display copy: money to `dp` places, rates and averages of days to `dp + 2`.
    pub fn rounded(&self, dp: u32) -> Self {
        InvoiceKpis {
            total_invoiced: round_money(self.total_invoiced, dp),
            total_collected: round_money(self.total_collected, dp),
            total_outstanding: round_money(self.total_outstanding, dp),
            overdue_amount: round_money(self.overdue_amount, dp),
            collection_rate: round_money(self.collection_rate, dp + 2),
            average_invoice_value: round_money(self.average_invoice_value, dp),
            average_days_overdue: round_money(self.average_days_overdue, dp + 2),
            ..self.clone()
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn invoice_kpis(input: &InvoiceKpiInput) -> CashFlowResult<ComputationOutput<InvoiceKpis>> {
    let start = Instant::now();
    validate_invoices(&input.invoices)?;

    let mut status_counts: BTreeMap<PaymentStatus, u32> =
        PaymentStatus::ALL.iter().map(|s| (*s, 0)).collect();
    let mut invoice_count: u32 = 0;
    let mut total_invoiced = Decimal::ZERO;
    let mut total_collected = Decimal::ZERO;
    let mut total_outstanding = Decimal::ZERO;
    let mut overdue_count: u32 = 0;
    let mut overdue_amount = Decimal::ZERO;
    let mut overdue_days: i64 = 0;

    for invoice in &input.invoices {
        *status_counts.entry(invoice.payment_status).or_insert(0) += 1;
        if invoice.payment_status == PaymentStatus::Cancelled {
            continue;
        }

        invoice_count += 1;
        total_invoiced += invoice.total;
        total_collected += invoice.collected();
        total_outstanding += invoice.outstanding();

        if let Some(days) = invoice.days_from_due(input.as_of) {
            if invoice.is_open() && days > 0 {
                overdue_count += 1;
                overdue_amount += invoice.outstanding();
                overdue_days = overdue_days.saturating_add(days);
            }
        }
    }

    let kpis = InvoiceKpis {
        invoice_count,
        total_invoiced,
        total_collected,
        total_outstanding,
        overdue_count,
        overdue_amount,
        collection_rate: ratio_or_zero(total_collected, total_invoiced),
        average_invoice_value: ratio_or_zero(total_invoiced, Decimal::from(invoice_count)),
        average_days_overdue: ratio_or_zero(
            Decimal::from(overdue_days),
            Decimal::from(overdue_count),
        ),
        status_counts,
    };

    let mut warnings: Vec<String> = Vec::new();
    if kpis.total_invoiced > Decimal::ZERO
        && ratio_or_zero(kpis.overdue_amount, kpis.total_invoiced) > Decimal::new(25, 2)
    {
        warnings.push(
            "More than 25% of invoiced value is overdue. Review collection follow-up."
                .to_string(),
        );
    }

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "as_of": input.as_of,
        "cancelled": "excluded from totals, included in status counts",
        "overdue": "open and past payment due date",
    });

    Ok(with_metadata(
        "Invoice KPI summary",
        &assumptions,
        warnings,
        elapsed,
        kpis,
    ))
}
