pub mod final_score;
pub mod initial;

use std::collections::BTreeMap;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::catalog::Offer;

/// Share of the final score driven by coverage quality.
pub const QUALITY_WEIGHT: f64 = 0.7;
/// Share of the final score driven by the relative premium.
pub const PRICE_WEIGHT: f64 = 0.3;
/// Top of the 0-5 scale shared by coverage and price scores.
pub const MAX_SCORE: f64 = 5.0;
/// Factor projecting a 0-5 average onto the 0-100 filter scale.
pub const PERCENT_SCALE: f64 = 20.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoredOffer {
    #[serde(flatten)]
    pub offer: Offer,
    pub average_micro_score: f64,
    pub macro_scores: BTreeMap<String, f64>,
}

impl ScoredOffer {
    /// Average score on the 0-100 scale used by score filters.
    pub fn score_percent(&self) -> f64 {
        self.average_micro_score * PERCENT_SCALE
    }

    /// Category mean, 0 for categories the offer was not scored against.
    pub fn macro_score(&self, category: &str) -> f64 {
        self.macro_scores.get(category).copied().unwrap_or(0.0)
    }
}

impl Deref for ScoredOffer {
    type Target = Offer;

    fn deref(&self) -> &Offer {
        &self.offer
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OfferWithFinalScores {
    #[serde(flatten)]
    pub scored: ScoredOffer,
    pub price_score: f64,
    pub final_score: f64,
    pub best_value: f64,
}

impl Deref for OfferWithFinalScores {
    type Target = ScoredOffer;

    fn deref(&self) -> &ScoredOffer {
        &self.scored
    }
}
