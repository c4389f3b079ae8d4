use std::cmp::Ordering;

use crate::ranking::{rank_weight, BestOffers, RankedOffer};
use crate::scoring::OfferWithFinalScores;

/// Picks the superlative offers. Each scan keeps the earliest offer reaching the
/// extremum and only moves on a strict improvement, so ties go to the first one.
pub fn identify_best_offers(offers: &[OfferWithFinalScores]) -> Option<BestOffers> {
    let first = offers.first()?;
    let pick = |better: fn(&OfferWithFinalScores, &OfferWithFinalScores) -> bool| {
        offers
            .iter()
            .fold(first, |best, candidate| {
                if better(candidate, best) {
                    candidate
                } else {
                    best
                }
            })
            .id
    };

    Some(BestOffers {
        best_score_offer_id: pick(|c, b| c.final_score > b.final_score),
        best_price_offer_id: pick(|c, b| c.premium < b.premium),
        best_value_offer_id: pick(|c, b| c.best_value > b.best_value),
    })
}

/// Flags the superlatives, weights each offer 4/2/1 for value/score/price and sorts
/// by weight then final score, both descending. The sort is stable.
pub fn sort_and_rank_offers(offers: &[OfferWithFinalScores]) -> Vec<RankedOffer> {
    let Some(best) = identify_best_offers(offers) else {
        return Vec::new();
    };

    let mut ranked = offers
        .iter()
        .map(|offer| {
            let is_best_value = offer.id == best.best_value_offer_id;
            let is_best_score = offer.id == best.best_score_offer_id;
            let is_best_price = offer.id == best.best_price_offer_id;
            RankedOffer {
                scored: offer.clone(),
                is_best_value,
                is_best_score,
                is_best_price,
                rank: rank_weight(is_best_value, is_best_score, is_best_price),
            }
        })
        .collect::<Vec<_>>();

    ranked.sort_by(compare_ranked);
    ranked
}

fn compare_ranked(a: &RankedOffer, b: &RankedOffer) -> Ordering {
    b.rank
        .cmp(&a.rank)
        .then_with(|| b.final_score.partial_cmp(&a.final_score).unwrap_or(Ordering::Equal))
}
