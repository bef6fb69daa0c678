pub mod error;
pub mod invoice;
pub mod types;

#[cfg(feature = "forecast")]
pub mod forecast;

#[cfg(feature = "receivables")]
pub mod receivables;

pub use error::CashFlowError;
pub use invoice::{Invoice, PaymentStatus};
pub use types::*;

/// Standard result type for all cash-flow operations
pub type CashFlowResult<T> = Result<T, CashFlowError>;
