use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Probability, Rate};
use crate::{CashFlowError, CashFlowResult};

/// Tuning parameters for the collection-probability curve and the horizon
/// guard. Every field has a default, so a partial JSON/YAML document only
/// needs to name what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Floor below which no probability ever falls.
    pub minimum_probability: Probability,
    /// Probability for an invoice due exactly on the as-of date.
    pub due_today_probability: Probability,
    /// Probability for an invoice due tomorrow.
    pub not_due_near_probability: Probability,
    /// Cap for invoices due far in the future.
    pub not_due_far_probability: Probability,
    /// Added per extra day before the due date, up to the far cap.
    pub not_due_daily_ramp: Rate,
    /// Days overdue at which the spread above the floor has halved.
    pub overdue_half_life_days: u32,
    /// Added to the probability of partially paid invoices.
    pub partial_payment_boost: Probability,
    pub optimistic_factor: Decimal,
    pub pessimistic_factor: Decimal,
    pub max_horizon_days: i64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        ForecastConfig {
            minimum_probability: dec!(0.10),
            due_today_probability: dec!(0.80),
            not_due_near_probability: dec!(0.85),
            not_due_far_probability: dec!(0.95),
            not_due_daily_ramp: dec!(0.0025),
            overdue_half_life_days: 30,
            partial_payment_boost: dec!(0.10),
            optimistic_factor: dec!(1.15),
            pessimistic_factor: dec!(0.75),
            max_horizon_days: 3650,
        }
    }
}

impl ForecastConfig {
    pub fn validate(&self) -> CashFlowResult<()> {
        for (field, value) in [
            ("minimum_probability", self.minimum_probability),
            ("due_today_probability", self.due_today_probability),
            ("not_due_near_probability", self.not_due_near_probability),
            ("not_due_far_probability", self.not_due_far_probability),
            ("not_due_daily_ramp", self.not_due_daily_ramp),
            ("partial_payment_boost", self.partial_payment_boost),
        ] {
            if value < Decimal::ZERO || value > Decimal::ONE {
                return Err(CashFlowError::input(
                    field,
                    format!("must be between 0 and 1, got {value}"),
                ));
            }
        }

        if self.minimum_probability > self.due_today_probability {
            return Err(CashFlowError::input(
                "minimum_probability",
                "floor cannot exceed the due-today probability",
            ));
        }
        if self.due_today_probability > self.not_due_near_probability {
            return Err(CashFlowError::input(
                "due_today_probability",
                "cannot exceed the not-yet-due probability",
            ));
        }
        if self.not_due_near_probability > self.not_due_far_probability {
            return Err(CashFlowError::input(
                "not_due_near_probability",
                "cannot exceed the far-future cap",
            ));
        }
        if self.optimistic_factor < Decimal::ONE {
            return Err(CashFlowError::input(
                "optimistic_factor",
                format!("must be at least 1, got {}", self.optimistic_factor),
            ));
        }
        if self.pessimistic_factor <= Decimal::ZERO || self.pessimistic_factor > Decimal::ONE {
            return Err(CashFlowError::input(
                "pessimistic_factor",
                format!("must be in (0, 1], got {}", self.pessimistic_factor),
            ));
        }
        if self.overdue_half_life_days == 0 {
            return Err(CashFlowError::input(
                "overdue_half_life_days",
                "must be positive",
            ));
        }
        if self.max_horizon_days <= 0 {
            return Err(CashFlowError::input(
                "max_horizon_days",
                "must be positive",
            ));
        }
        Ok(())
    }
}
