pub mod ranker;

use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::scoring::OfferWithFinalScores;

/// Rank weight contributed by the best value/price ratio.
pub const BEST_VALUE_WEIGHT: u8 = 4;
/// Rank weight contributed by the highest final score.
pub const BEST_SCORE_WEIGHT: u8 = 2;
/// Rank weight contributed by the lowest premium.
pub const BEST_PRICE_WEIGHT: u8 = 1;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BestOffers {
    pub best_score_offer_id: u32,
    pub best_price_offer_id: u32,
    pub best_value_offer_id: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RankedOffer {
    #[serde(flatten)]
    pub scored: OfferWithFinalScores,
    pub is_best_value: bool,
    pub is_best_score: bool,
    pub is_best_price: bool,
    pub rank: u8,
}

impl RankedOffer {
    pub fn badges(&self) -> Vec<&'static str> {
        let mut badges = Vec::new();
        if self.is_best_value {
            badges.push("best value");
        }
        if self.is_best_score {
            badges.push("best score");
        }
        if self.is_best_price {
            badges.push("best price");
        }
        badges
    }
}

impl Deref for RankedOffer {
    type Target = OfferWithFinalScores;

    fn deref(&self) -> &OfferWithFinalScores {
        &self.scored
    }
}

pub fn rank_weight(is_best_value: bool, is_best_score: bool, is_best_price: bool) -> u8 {
    let mut rank = 0;
    if is_best_value {
        rank += BEST_VALUE_WEIGHT;
    }
    if is_best_score {
        rank += BEST_SCORE_WEIGHT;
    }
    if is_best_price {
        rank += BEST_PRICE_WEIGHT;
    }
    rank
}
