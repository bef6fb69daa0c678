//! Offer (quotation) pipeline KPIs.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::invoice::MAX_DOCUMENT_TOTAL;
use crate::types::{ratio_or_zero, round_money, with_metadata, ComputationOutput, Money, Rate};
use crate::{CashFlowError, CashFlowResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferStatus {
    Draft,
    Sent,
    Accepted,
    Rejected,
    Expired,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    pub id: String,
    pub total: Money,
    pub status: OfferStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<NaiveDate>,
}

impl Offer {
    /// Status as of `as_of`: a sent offer past its validity date has expired.
    pub fn effective_status(&self, as_of: NaiveDate) -> OfferStatus {
        match (self.status, self.valid_until) {
            (OfferStatus::Sent, Some(until)) if until < as_of => OfferStatus::Expired,
            (status, _) => status,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferKpiInput {
    pub offers: Vec<Offer>,
    pub as_of: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferKpis {
    pub offer_count: u32,
    pub total_offered: Money,
    pub accepted_count: u32,
    pub accepted_value: Money,
    /// Value of sent offers that are still valid.
    pub open_pipeline_value: Money,
    /// accepted / (accepted + rejected + expired).
    pub conversion_rate: Rate,
    pub average_offer_value: Money,
    pub status_counts: BTreeMap<OfferStatus, u32>,
}

impl OfferKpis {
    pub fn rounded(&self, dp: u32) -> Self {
        OfferKpis {
            total_offered: round_money(self.total_offered, dp),
            accepted_value: round_money(self.accepted_value, dp),
            open_pipeline_value: round_money(self.open_pipeline_value, dp),
            conversion_rate: round_money(self.conversion_rate, dp + 2),
            average_offer_value: round_money(self.average_offer_value, dp),
            ..self.clone()
        }
    }
}

pub fn offer_kpis(input: &OfferKpiInput) -> CashFlowResult<ComputationOutput<OfferKpis>> {
    let start = Instant::now();
    validate_offers(&input.offers)?;

    let mut status_counts: BTreeMap<OfferStatus, u32> = BTreeMap::new();
    let mut total_offered = Decimal::ZERO;
    let mut accepted_value = Decimal::ZERO;
    let mut open_pipeline_value = Decimal::ZERO;

    for offer in &input.offers {
        let status = offer.effective_status(input.as_of);
        *status_counts.entry(status).or_insert(0) += 1;
        total_offered += offer.total;
        match status {
            OfferStatus::Accepted => accepted_value += offer.total,
            OfferStatus::Sent => open_pipeline_value += offer.total,
            _ => {}
        }
    }

    let count = |status: OfferStatus| status_counts.get(&status).copied().unwrap_or(0);
    let accepted_count = count(OfferStatus::Accepted);
    let decided = accepted_count + count(OfferStatus::Rejected) + count(OfferStatus::Expired);
    let offer_count = input.offers.len() as u32;

    let kpis = OfferKpis {
        offer_count,
        total_offered,
        accepted_count,
        accepted_value,
        open_pipeline_value,
        conversion_rate: ratio_or_zero(Decimal::from(accepted_count), Decimal::from(decided)),
        average_offer_value: ratio_or_zero(total_offered, Decimal::from(offer_count)),
        status_counts,
    };

    let mut warnings: Vec<String> = Vec::new();
    let lapsed = input
        .offers
        .iter()
        .filter(|o| {
            o.status == OfferStatus::Sent
                && o.effective_status(input.as_of) == OfferStatus::Expired
        })
        .count();
    if lapsed > 0 {
        warnings.push(format!(
            "{lapsed} sent offer(s) passed their validity date and were counted as expired."
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "as_of": input.as_of,
        "conversion_basis": "decided offers (accepted, rejected, expired)",
    });

    Ok(with_metadata(
        "Offer pipeline KPIs",
        &assumptions,
        warnings,
        elapsed,
        kpis,
    ))
}

fn validate_offers(offers: &[Offer]) -> CashFlowResult<()> {
    for offer in offers {
        if offer.total < Decimal::ZERO {
            return Err(CashFlowError::InvalidInput {
                field: format!("offers[{}].total", offer.id),
                reason: "Offer total cannot be negative.".into(),
            });
        }
        if offer.total > MAX_DOCUMENT_TOTAL {
            return Err(CashFlowError::InvalidInput {
                field: format!("offers[{}].total", offer.id),
                reason: format!("Offer total exceeds the maximum of {MAX_DOCUMENT_TOTAL}."),
            });
        }
    }
    Ok(())
}
