pub mod query;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::catalog::{max_premium, Category, InsuranceData};
use crate::scoring::ScoredOffer;

/// Upper end of the score filter scale.
pub const MAX_SCORE_PERCENT: f64 = 100.0;

/// Inclusive `[min, max]` bound, carried on the wire as a two-element array.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

impl From<[f64; 2]> for ValueRange {
    fn from([min, max]: [f64; 2]) -> Self {
        Self { min, max }
    }
}

impl From<ValueRange> for [f64; 2] {
    fn from(range: ValueRange) -> Self {
        [range.min, range.max]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Filters {
    pub price_range: ValueRange,
    pub score_range: ValueRange,
    #[serde(default)]
    pub selected_companies: BTreeSet<String>,
    #[serde(default)]
    pub selected_coverages: BTreeSet<String>,
}

impl Filters {
    /// Filters that keep every offer of `data`.
    pub fn full_range(data: &InsuranceData) -> Self {
        Self::with_max_premium(max_premium(&data.offers))
    }

    pub fn with_max_premium(max_premium: f64) -> Self {
        Self {
            price_range: ValueRange::new(0.0, max_premium),
            score_range: ValueRange::new(0.0, MAX_SCORE_PERCENT),
            selected_companies: BTreeSet::new(),
            selected_coverages: BTreeSet::new(),
        }
    }

    pub fn is_active(&self, max_premium: f64) -> bool {
        !self.selected_companies.is_empty()
            || !self.selected_coverages.is_empty()
            || self.price_range.max < max_premium
            || self.score_range.min > 0.0
    }

    pub fn matches(&self, offer: &ScoredOffer) -> bool {
        if !self.price_range.contains(offer.premium) {
            return false;
        }
        if !self.score_range.contains(offer.score_percent()) {
            return false;
        }
        if !self.selected_companies.is_empty() && !self.selected_companies.contains(&offer.company)
        {
            return false;
        }
        self.selected_coverages
            .iter()
            .all(|micro_id| offer.is_covered(micro_id))
    }
}

/// Stable selection: survivors keep their input order.
pub fn apply_filters(offers: &[ScoredOffer], filters: &Filters) -> Vec<ScoredOffer> {
    offers
        .iter()
        .filter(|offer| filters.matches(offer))
        .cloned()
        .collect()
}

/// Catalog restricted to the selected coverages, dropping categories left empty.
pub fn displayed_categories(categories: &[Category], filters: &Filters) -> Vec<Category> {
    if filters.selected_coverages.is_empty() {
        return categories.to_vec();
    }
    categories
        .iter()
        .map(|category| Category {
            name: category.name.clone(),
            micro_coverages: category
                .micro_coverages
                .iter()
                .filter(|m| filters.selected_coverages.contains(&m.id))
                .cloned()
                .collect(),
        })
        .filter(|category| !category.micro_coverages.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::{apply_filters, displayed_categories, Filters, ValueRange};
    use crate::catalog::sample::sample_data;
    use crate::catalog::{Category, Offer};
    use crate::scoring::initial::add_initial_scores;
    use crate::scoring::ScoredOffer;

    fn sample_scored() -> Vec<ScoredOffer> {
        let data = sample_data().expect("sample");
        add_initial_scores(&data.offers, &data.categories)
    }

    fn base_filters() -> Filters {
        Filters::with_max_premium(2000.0)
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn default_filters_keep_everything_in_order() {
        let offers = sample_scored();
        let result = apply_filters(&offers, &base_filters());
        assert_eq!(result, offers);

        let data = sample_data().expect("sample");
        let full = Filters::full_range(&data);
        assert_eq!(apply_filters(&offers, &full).len(), 5);
    }

    #[test]
    fn filters_by_single_company() {
        let offers = sample_scored();
        let mut filters = base_filters();
        filters.selected_companies = set(&["Allianz"]);
        let result = apply_filters(&offers, &filters);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].company, "Allianz");
    }

    #[test]
    fn filters_by_multiple_companies() {
        let offers = sample_scored();
        let mut filters = base_filters();
        filters.selected_companies = set(&["Allianz", "Zurich"]);
        let result = apply_filters(&offers, &filters);
        let companies = result.iter().map(|o| o.company.as_str()).collect::<Vec<_>>();
        assert_eq!(companies, vec!["Zurich", "Allianz"]);
    }

    #[test]
    fn filters_by_minimum_score() {
        let offers = sample_scored();
        let mut filters = base_filters();
        filters.score_range = ValueRange::new(85.0, 100.0);
        let result = apply_filters(&offers, &filters);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].company, "AXA");
    }

    #[test]
    fn score_bounds_are_inclusive() {
        let offers = sample_scored();
        let axa_percent = offers
            .iter()
            .find(|o| o.company == "AXA")
            .map(ScoredOffer::score_percent)
            .expect("axa");
        assert!((axa_percent - 100.0 / 23.0 * 20.0).abs() < 1e-12);

        let mut filters = base_filters();
        filters.score_range = ValueRange::new(axa_percent, 100.0);
        let kept = apply_filters(&offers, &filters);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].company, "AXA");

        filters.score_range = ValueRange::new(0.0, axa_percent);
        assert_eq!(apply_filters(&offers, &filters).len(), 5);
    }

    #[test]
    fn price_bounds_are_inclusive() {
        let offers = sample_scored();
        let mut filters = base_filters();
        filters.price_range = ValueRange::new(834.0, 886.8);
        let companies = apply_filters(&offers, &filters)
            .iter()
            .map(|o| o.company.clone())
            .collect::<Vec<_>>();
        assert_eq!(companies, vec!["Zurich", "Helvetia", "Baloise"]);
    }

    #[test]
    fn nothing_below_800_is_an_empty_result() {
        let offers = sample_scored();
        let mut filters = base_filters();
        filters.price_range = ValueRange::new(0.0, 800.0);
        assert!(apply_filters(&offers, &filters).is_empty());
        assert!(apply_filters(&[], &filters).is_empty());
    }

    #[test]
    fn required_coverages_use_and_semantics() {
        let categories = vec![Category::new("RC", &[("a", "A"), ("b", "B")])];
        let offers = add_initial_scores(
            &[
                Offer::new(1, "Both", 100.0)
                    .with_coverage("a", true, 3, "")
                    .with_coverage("b", true, 3, ""),
                Offer::new(2, "OnlyA", 100.0).with_coverage("a", true, 3, ""),
                Offer::new(3, "BFalse", 100.0)
                    .with_coverage("a", true, 3, "")
                    .with_coverage("b", false, 3, ""),
            ],
            &categories,
        );
        let mut filters = base_filters();
        filters.selected_coverages = set(&["a", "b"]);
        let result = apply_filters(&offers, &filters);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].company, "Both");
    }

    #[test]
    fn sample_coverage_filter_excludes_uncovered_offers() {
        let offers = sample_scored();
        let mut filters = base_filters();
        filters.selected_coverages = set(&["pg_assistenza_litigi"]);
        let companies = apply_filters(&offers, &filters)
            .iter()
            .map(|o| o.company.clone())
            .collect::<Vec<_>>();
        assert_eq!(companies, vec!["Helvetia", "Baloise"]);
    }

    #[test]
    fn activity_tracks_non_default_fields() {
        let filters = Filters::with_max_premium(982.8);
        assert!(!filters.is_active(982.8));

        let mut narrowed = filters.clone();
        narrowed.price_range.max = 900.0;
        assert!(narrowed.is_active(982.8));

        let mut scored = filters.clone();
        scored.score_range.min = 10.0;
        assert!(scored.is_active(982.8));

        let mut companies = filters;
        companies.selected_companies = set(&["AXA"]);
        assert!(companies.is_active(982.8));
    }

    #[test]
    fn displayed_categories_follow_selected_coverages() {
        let data = sample_data().expect("sample");
        let mut filters = Filters::full_range(&data);
        assert_eq!(displayed_categories(&data.categories, &filters), data.categories);

        filters.selected_coverages = set(&["cp_vandalismo", "as_traino", "as_alloggio"]);
        let shown = displayed_categories(&data.categories, &filters);
        assert_eq!(shown.len(), 2);
        assert_eq!(shown[0].name, "Casco parziale");
        assert_eq!(shown[0].micro_coverages.len(), 1);
        assert_eq!(shown[1].name, "Assistenza");
        assert_eq!(shown[1].micro_coverages.len(), 2);
    }

    #[test]
    fn filters_serialize_with_array_ranges() {
        let mut filters = Filters::with_max_premium(1000.0);
        filters.selected_companies = set(&["AXA"]);
        let value = serde_json::to_value(&filters).expect("serialize");
        assert_eq!(value["priceRange"], serde_json::json!([0.0, 1000.0]));
        assert_eq!(value["scoreRange"], serde_json::json!([0.0, 100.0]));
        assert_eq!(value["selectedCompanies"], serde_json::json!(["AXA"]));

        let back: Filters = serde_json::from_value(value).expect("deserialize");
        assert_eq!(back, filters);
    }
}
