pub mod config;
pub mod engine;
pub mod probability;
pub mod rollup;

pub use config::ForecastConfig;
pub use engine::{forecast, forecast_cash_flow, CashFlowForecast, ForecastInput};
pub use probability::{probability_for_age, scenario_probabilities};
