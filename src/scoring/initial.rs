use std::collections::BTreeMap;

use crate::catalog::{all_micro_coverages, Category, Offer};
use crate::scoring::ScoredOffer;

pub fn add_initial_scores(offers: &[Offer], categories: &[Category]) -> Vec<ScoredOffer> {
    let all_ids = all_micro_coverages(categories)
        .into_iter()
        .map(|m| m.id.as_str())
        .collect::<Vec<_>>();

    offers
        .iter()
        .map(|offer| ScoredOffer {
            offer: offer.clone(),
            average_micro_score: mean_score(offer, all_ids.iter().copied()),
            macro_scores: macro_scores(offer, categories),
        })
        .collect()
}

pub fn macro_scores(offer: &Offer, categories: &[Category]) -> BTreeMap<String, f64> {
    categories
        .iter()
        .map(|category| (category.name.clone(), mean_score(offer, category.micro_ids())))
        .collect()
}

/// Unweighted mean over `ids`, counting ids the offer lacks as 0. Empty input yields 0.
pub fn mean_score<'a>(offer: &Offer, ids: impl IntoIterator<Item = &'a str>) -> f64 {
    let (total, count) = ids
        .into_iter()
        .fold((0u32, 0usize), |(total, count), id| {
            (total + u32::from(offer.score_for(id)), count + 1)
        });
    if count == 0 {
        return 0.0;
    }
    f64::from(total) / count as f64
}
