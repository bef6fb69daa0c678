pub mod forecast;
pub mod probability;
pub mod receivables;
