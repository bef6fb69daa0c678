//! Collection-probability curve.
//!
//! Maps an invoice's age relative to its due date onto the chance that the
//! outstanding amount is collected within the forecast horizon:
//! - Not yet due: starts at the near-due probability one day out and ramps
//!   up with distance until it reaches the far-future cap.
//! - Due today or overdue: hyperbolic decay toward the configured floor,
//!   `floor + (due_today - floor) * h / (h + days_overdue)`. The floor is
//!   approached but never reached for any age between two calendar dates.
//! - Partially paid invoices get an additive boost, capped at 1.
//!
//! The curve is non-increasing in `days_from_due` for a fixed status.
//! Probabilities are quantised to [`PROBABILITY_DP`] places so that
//! amount × probability products, and their sums, stay exact.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::config::ForecastConfig;
use crate::invoice::PaymentStatus;
use crate::types::Probability;

/// Decimal places kept on every probability.
pub const PROBABILITY_DP: u32 = 10;

/// The three per-invoice probabilities used by the forecast scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioProbabilities {
    pub expected: Probability,
    pub optimistic: Probability,
    pub pessimistic: Probability,
}

/// Base collection probability for an invoice `days_from_due` days past its
/// due date (negative while not yet due). Always within
/// `[config.minimum_probability, 1]`.
pub fn probability_for_age(
    days_from_due: i64,
    status: PaymentStatus,
    config: &ForecastConfig,
) -> Probability {
    let floor = config.minimum_probability;

    let raw = if days_from_due < 0 {
        let extra_days = Decimal::from(days_from_due.unsigned_abs() - 1);
        (config.not_due_near_probability + config.not_due_daily_ramp * extra_days)
            .min(config.not_due_far_probability)
    } else {
        let half_life = Decimal::from(config.overdue_half_life_days);
        let days_overdue = Decimal::from(days_from_due.unsigned_abs());
        floor + (config.due_today_probability - floor) * half_life / (half_life + days_overdue)
    };
    let base = raw.round_dp(PROBABILITY_DP);

    let boosted = if status == PaymentStatus::Partial {
        base + config.partial_payment_boost
    } else {
        base
    };

    boosted.max(floor).min(Decimal::ONE)
}

/// Expected, optimistic and pessimistic probabilities for one invoice.
/// `pessimistic <= expected <= optimistic` always holds.
pub fn scenario_probabilities(
    days_from_due: i64,
    status: PaymentStatus,
    config: &ForecastConfig,
) -> ScenarioProbabilities {
    let expected = probability_for_age(days_from_due, status, config);
    let optimistic = (expected * config.optimistic_factor)
        .round_dp(PROBABILITY_DP)
        .min(Decimal::ONE)
        .max(expected);
    let pessimistic = (expected * config.pessimistic_factor)
        .round_dp(PROBABILITY_DP)
        .max(config.minimum_probability)
        .min(expected);

    ScenarioProbabilities {
        expected,
        optimistic,
        pessimistic,
    }
}
