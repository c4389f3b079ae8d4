use serde::Serialize;
use tracing::debug;

use crate::catalog::{max_premium, InsuranceData};
use crate::filters::{apply_filters, Filters};
use crate::ranking::ranker::sort_and_rank_offers;
use crate::ranking::RankedOffer;
use crate::scoring::final_score::add_final_scores;
use crate::scoring::initial::add_initial_scores;

/// Scores, filters, re-scores on the surviving price range and ranks. Every
/// consumer (terminal, export, REST) goes through this single entry point.
pub fn process_insurance_comparison(data: &InsuranceData, filters: &Filters) -> Vec<RankedOffer> {
    let scored = add_initial_scores(&data.offers, &data.categories);
    debug!(offers = scored.len(), "initial scores computed");

    let filtered = apply_filters(&scored, filters);
    debug!(kept = filtered.len(), dropped = scored.len() - filtered.len(), "filters applied");

    let finals = add_final_scores(&filtered);
    let ranked = sort_and_rank_offers(&finals);
    debug!(ranked = ranked.len(), "offers ranked");
    ranked
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonSummary {
    pub total_offers: usize,
    pub shown_offers: usize,
    pub filters_active: bool,
    pub best_price: Option<String>,
    pub best_score: Option<String>,
    pub best_value: Option<String>,
}

impl ComparisonSummary {
    pub fn new(data: &InsuranceData, filters: &Filters, ranked: &[RankedOffer]) -> Self {
        let company_where = |flag: fn(&RankedOffer) -> bool| {
            ranked
                .iter()
                .find(|offer| flag(offer))
                .map(|offer| offer.company.clone())
        };
        Self {
            total_offers: data.offers.len(),
            shown_offers: ranked.len(),
            filters_active: filters.is_active(max_premium(&data.offers)),
            best_price: company_where(|o| o.is_best_price),
            best_score: company_where(|o| o.is_best_score),
            best_value: company_where(|o| o.is_best_value),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub filters: Filters,
    pub summary: ComparisonSummary,
    pub offers: Vec<RankedOffer>,
}

impl Comparison {
    pub fn run(data: &InsuranceData, filters: Filters) -> Self {
        let offers = process_insurance_comparison(data, &filters);
        let summary = ComparisonSummary::new(data, &filters, &offers);
        Self {
            filters,
            summary,
            offers,
        }
    }
}
