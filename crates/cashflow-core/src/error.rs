use thiserror::Error;

#[derive(Debug, Error)]
pub enum CashFlowError {
    #[error("Invalid horizon: {horizon_days} days — {reason}")]
    InvalidHorizon { horizon_days: i64, reason: String },

    #[error("Invalid invoice data: {invoice_id} — {reason}")]
    InvalidInvoiceData { invoice_id: String, reason: String },

    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl CashFlowError {
    pub(crate) fn invoice(invoice_id: &str, reason: impl Into<String>) -> Self {
        CashFlowError::InvalidInvoiceData {
            invoice_id: invoice_id.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn input(field: &str, reason: impl Into<String>) -> Self {
        CashFlowError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for CashFlowError {
    fn from(e: serde_json::Error) -> Self {
        CashFlowError::SerializationError(e.to_string())
    }
}
