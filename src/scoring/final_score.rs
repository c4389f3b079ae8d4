use crate::scoring::{OfferWithFinalScores, ScoredOffer, MAX_SCORE, PRICE_WEIGHT, QUALITY_WEIGHT};

/// Scores price relative to the premiums present in `offers`, so callers pass the
/// filtered set rather than the whole catalog.
pub fn add_final_scores(offers: &[ScoredOffer]) -> Vec<OfferWithFinalScores> {
    let Some((min_premium, max_premium)) = premium_bounds(offers) else {
        return Vec::new();
    };

    offers
        .iter()
        .map(|offer| {
            let price_score = price_score(offer.premium, min_premium, max_premium);
            let final_score = blend(offer.average_micro_score, price_score);
            let best_value = if offer.premium > 0.0 {
                final_score / offer.premium
            } else {
                0.0
            };
            OfferWithFinalScores {
                scored: offer.clone(),
                price_score,
                final_score,
                best_value,
            }
        })
        .collect()
}

pub fn premium_bounds(offers: &[ScoredOffer]) -> Option<(f64, f64)> {
    let first = offers.first()?.premium;
    Some(offers.iter().fold((first, first), |(min, max), o| {
        (min.min(o.premium), max.max(o.premium))
    }))
}

/// Cheapest premium maps to 5, priciest to 0. Without any spread everyone gets 5.
pub fn price_score(premium: f64, min_premium: f64, max_premium: f64) -> f64 {
    if max_premium > min_premium {
        MAX_SCORE * (1.0 - (premium - min_premium) / (max_premium - min_premium))
    } else {
        MAX_SCORE
    }
}

pub fn blend(average_micro_score: f64, price_score: f64) -> f64 {
    average_micro_score * QUALITY_WEIGHT + price_score * PRICE_WEIGHT
}
