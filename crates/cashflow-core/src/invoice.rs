//! Invoice records as supplied by the billing data source.
//!
//! The analytics modules never mutate invoices. Malformed records are
//! rejected with [`CashFlowError::InvalidInvoiceData`] rather than clamped,
//! so negative money can never leak into a forecast or a KPI.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::Money;
use crate::{CashFlowError, CashFlowResult};

/// Largest accepted invoice or offer total (one quadrillion). Keeps every
/// sum and amount × probability product well inside `Decimal` range.
pub const MAX_DOCUMENT_TOTAL: Money = dec!(1_000_000_000_000_000);

/// Payment state of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Unpaid,
    Partial,
    Paid,
    Overdue,
    Cancelled,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 5] = [
        PaymentStatus::Unpaid,
        PaymentStatus::Partial,
        PaymentStatus::Paid,
        PaymentStatus::Overdue,
        PaymentStatus::Cancelled,
    ];

    /// Paid and cancelled invoices have nothing left to collect.
    pub fn is_open(self) -> bool {
        !matches!(self, PaymentStatus::Paid | PaymentStatus::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Partial => "partial",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Overdue => "overdue",
            PaymentStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = CashFlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                CashFlowError::input(
                    "payment_status",
                    format!(
                        "'{s}' is not one of unpaid, partial, paid, overdue, cancelled"
                    ),
                )
            })
    }
}

/// A single customer invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    /// Opaque identifier, unique within a request.
    pub id: String,
    /// Amount owed in total.
    pub total: Money,
    pub payment_status: PaymentStatus,
    /// Required for open invoices.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_due_date: Option<NaiveDate>,
    /// Amount already received. Only meaningful for partial and paid invoices.
    #[serde(default)]
    pub payment_amount: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,
}

impl Invoice {
    pub fn new(
        id: impl Into<String>,
        total: Money,
        payment_status: PaymentStatus,
        payment_due_date: NaiveDate,
    ) -> Self {
        Invoice {
            id: id.into(),
            total,
            payment_status,
            payment_due_date: Some(payment_due_date),
            payment_amount: Decimal::ZERO,
            issue_date: None,
            customer: None,
        }
    }

    pub fn with_payment_amount(mut self, payment_amount: Money) -> Self {
        self.payment_amount = payment_amount;
        self
    }

    pub fn is_open(&self) -> bool {
        self.payment_status.is_open()
    }

    /// Check the caller contract: money within `[0, MAX_DOCUMENT_TOTAL]`,
    /// not overpaid, and a due date on every open invoice.
    pub fn validate(&self) -> CashFlowResult<()> {
        if self.total < Decimal::ZERO {
            return Err(CashFlowError::invoice(
                &self.id,
                format!("total cannot be negative ({})", self.total),
            ));
        }
        if self.total > MAX_DOCUMENT_TOTAL {
            return Err(CashFlowError::invoice(
                &self.id,
                format!("total {} exceeds the maximum of {}", self.total, MAX_DOCUMENT_TOTAL),
            ));
        }
        if self.payment_amount < Decimal::ZERO {
            return Err(CashFlowError::invoice(
                &self.id,
                format!("payment amount cannot be negative ({})", self.payment_amount),
            ));
        }
        if self.payment_amount > self.total {
            return Err(CashFlowError::invoice(
                &self.id,
                format!(
                    "payment amount {} exceeds invoice total {}",
                    self.payment_amount, self.total
                ),
            ));
        }
        if self.is_open() && self.payment_due_date.is_none() {
            return Err(CashFlowError::invoice(
                &self.id,
                format!("{} invoice has no payment due date", self.payment_status),
            ));
        }
        Ok(())
    }

    /// Amount still to be collected.
    pub fn outstanding(&self) -> Money {
        match self.payment_status {
            PaymentStatus::Partial => self.total - self.payment_amount,
            PaymentStatus::Unpaid | PaymentStatus::Overdue => self.total,
            PaymentStatus::Paid | PaymentStatus::Cancelled => Decimal::ZERO,
        }
    }

    /// Amount already received, as far as the status tells us.
    pub fn collected(&self) -> Money {
        match self.payment_status {
            PaymentStatus::Paid => self.total,
            PaymentStatus::Partial => self.payment_amount,
            _ => Decimal::ZERO,
        }
    }

    /// Whole days between the due date and `as_of`: positive when overdue,
    /// negative while not yet due. `None` without a due date.
    pub fn days_from_due(&self, as_of: NaiveDate) -> Option<i64> {
        self.payment_due_date
            .map(|due| (as_of - due).num_days())
    }
}

/// Validate a whole batch, returning the first failure.
pub fn validate_invoices(invoices: &[Invoice]) -> CashFlowResult<()> {
    invoices.iter().try_for_each(Invoice::validate)
}
