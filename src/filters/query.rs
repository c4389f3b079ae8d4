//! Filter state carried in URL query strings (`maxPrice`, `minScore`,
//! `companies`, `coverages`). Only values that differ from the unfiltered
//! defaults are written out, so a clean comparison has an empty query.

use std::collections::{BTreeMap, BTreeSet};

use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::filters::{Filters, ValueRange, MAX_SCORE_PERCENT};

const QUERY_BASE: &str = "http://localhost/";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FilterQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_score: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub companies: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverages: Option<String>,
}

#[derive(Debug, Error, PartialEq)]
pub enum FilterQueryError {
    #[error("unknown filter parameter: {0}")]
    UnknownKey(String),
    #[error("invalid filter query: {0}")]
    Malformed(String),
}

impl FilterQuery {
    pub fn parse(raw: &str) -> Result<Self, FilterQueryError> {
        Self::parse_with_extra(raw, &[]).map(|(query, _)| query)
    }

    /// Parses the filter keys plus the route-specific `extra` keys, which come back
    /// separately. Any other key is rejected. Repeated list keys are merged; a
    /// repeated single-valued key is malformed.
    pub fn parse_with_extra(
        raw: &str,
        extra: &[&str],
    ) -> Result<(Self, BTreeMap<String, String>), FilterQueryError> {
        let mut url =
            Url::parse(QUERY_BASE).map_err(|e| FilterQueryError::Malformed(e.to_string()))?;
        url.set_query(Some(raw.trim_start_matches('?')));

        let mut query = Self::default();
        let mut extras = BTreeMap::new();
        for (key, value) in url.query_pairs() {
            let value = value.into_owned();
            match key.as_ref() {
                "maxPrice" => set_once(&mut query.max_price, "maxPrice", value)?,
                "minScore" => set_once(&mut query.min_score, "minScore", value)?,
                "companies" => merge_list(&mut query.companies, value),
                "coverages" => merge_list(&mut query.coverages, value),
                "" => {}
                other if extra.contains(&other) => {
                    if extras.insert(other.to_string(), value).is_some() {
                        return Err(repeated(other));
                    }
                }
                other => return Err(FilterQueryError::UnknownKey(other.to_string())),
            }
        }
        Ok((query, extras))
    }

    /// Resolves the query against the dataset's highest premium. A missing, zero or
    /// unreadable `maxPrice` means no price cap; a missing or unreadable `minScore` means 0.
    pub fn to_filters(&self, max_premium: f64) -> Filters {
        let max_price = parse_number(self.max_price.as_deref())
            .filter(|v| *v != 0.0)
            .unwrap_or(max_premium);
        let min_score = parse_number(self.min_score.as_deref()).unwrap_or(0.0);
        Filters {
            price_range: ValueRange::new(0.0, max_price),
            score_range: ValueRange::new(min_score, MAX_SCORE_PERCENT),
            selected_companies: split_list(self.companies.as_deref()),
            selected_coverages: split_list(self.coverages.as_deref()),
        }
    }

    pub fn from_filters(filters: &Filters, max_premium: f64) -> Self {
        let join = |items: &BTreeSet<String>| {
            (!items.is_empty()).then(|| items.iter().cloned().collect::<Vec<_>>().join(","))
        };
        Self {
            max_price: (filters.price_range.max < max_premium)
                .then(|| filters.price_range.max.to_string()),
            min_score: (filters.score_range.min > 0.0)
                .then(|| filters.score_range.min.to_string()),
            companies: join(&filters.selected_companies),
            coverages: join(&filters.selected_coverages),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.max_price.is_none()
            && self.min_score.is_none()
            && self.companies.is_none()
            && self.coverages.is_none()
    }

    pub fn to_query_string(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        let Ok(mut url) = Url::parse(QUERY_BASE) else {
            return String::new();
        };
        {
            let mut pairs = url.query_pairs_mut();
            let fields = [
                ("maxPrice", &self.max_price),
                ("minScore", &self.min_score),
                ("companies", &self.companies),
                ("coverages", &self.coverages),
            ];
            for (key, value) in fields {
                if let Some(value) = value {
                    pairs.append_pair(key, value);
                }
            }
        }
        url.query().unwrap_or_default().to_string()
    }
}

fn set_once(slot: &mut Option<String>, key: &str, value: String) -> Result<(), FilterQueryError> {
    if slot.replace(value).is_some() {
        return Err(repeated(key));
    }
    Ok(())
}

fn merge_list(slot: &mut Option<String>, value: String) {
    match slot {
        Some(list) => {
            list.push(',');
            list.push_str(&value);
        }
        None => *slot = Some(value),
    }
}

fn repeated(key: &str) -> FilterQueryError {
    FilterQueryError::Malformed(format!("{key} given more than once"))
}

fn parse_number(raw: Option<&str>) -> Option<f64> {
    raw?.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn split_list(raw: Option<&str>) -> BTreeSet<String> {
    raw.map(|list| {
        list.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::{FilterQuery, FilterQueryError};
    use crate::filters::{Filters, ValueRange};

    #[test]
    fn empty_query_means_unfiltered() {
        let query = FilterQuery::parse("").expect("empty query");
        assert!(query.is_empty());
        assert_eq!(query.to_filters(982.8), Filters::with_max_premium(982.8));
    }

    #[test]
    fn parses_all_parameters() {
        let query = FilterQuery::parse("?maxPrice=950&minScore=60&companies=AXA,Zurich&coverages=cp_furto")
            .expect("query");
        let filters = query.to_filters(982.8);
        assert_eq!(filters.price_range, ValueRange::new(0.0, 950.0));
        assert_eq!(filters.score_range, ValueRange::new(60.0, 100.0));
        assert_eq!(
            filters.selected_companies.iter().cloned().collect::<Vec<_>>(),
            vec!["AXA".to_string(), "Zurich".to_string()]
        );
        assert!(filters.selected_coverages.contains("cp_furto"));
    }

    #[test]
    fn unreadable_values_fall_back_to_defaults() {
        let query = FilterQuery::parse("maxPrice=abc&minScore=&companies=,,").expect("query");
        let filters = query.to_filters(982.8);
        assert_eq!(filters.price_range.max, 982.8);
        assert_eq!(filters.score_range.min, 0.0);
        assert!(filters.selected_companies.is_empty());

        let zero = FilterQuery::parse("maxPrice=0").expect("query");
        assert_eq!(zero.to_filters(982.8).price_range.max, 982.8);
    }

    #[test]
    fn rejects_unknown_keys() {
        assert_eq!(
            FilterQuery::parse("sort=price"),
            Err(FilterQueryError::UnknownKey("sort".to_string()))
        );
    }

    #[test]
    fn repeated_list_keys_are_merged() {
        let query = FilterQuery::parse("companies=AXA&companies=Zurich&coverages=cp_furto")
            .expect("query");
        let filters = query.to_filters(982.8);
        assert_eq!(
            filters.selected_companies.iter().cloned().collect::<Vec<_>>(),
            vec!["AXA".to_string(), "Zurich".to_string()]
        );
    }

    #[test]
    fn repeated_single_value_keys_are_malformed() {
        assert!(matches!(
            FilterQuery::parse("maxPrice=900&maxPrice=950"),
            Err(FilterQueryError::Malformed(_))
        ));
        assert!(matches!(
            FilterQuery::parse_with_extra("mode=top3&mode=summary", &["mode"]),
            Err(FilterQueryError::Malformed(_))
        ));
    }

    #[test]
    fn extra_keys_are_accepted_only_when_listed() {
        let (query, extras) =
            FilterQuery::parse_with_extra("mode=summary&maxPrice=900", &["mode"]).expect("query");
        assert_eq!(query.max_price.as_deref(), Some("900"));
        assert_eq!(extras.get("mode").map(String::as_str), Some("summary"));

        assert_eq!(
            FilterQuery::parse("mode=summary"),
            Err(FilterQueryError::UnknownKey("mode".to_string()))
        );
    }

    #[test]
    fn encodes_only_non_default_values() {
        let mut filters = Filters::with_max_premium(982.8);
        assert_eq!(FilterQuery::from_filters(&filters, 982.8).to_query_string(), "");

        filters.price_range.max = 900.0;
        filters.selected_companies.insert("Allianz".to_string());
        filters.selected_companies.insert("AXA".to_string());
        let encoded = FilterQuery::from_filters(&filters, 982.8).to_query_string();
        assert_eq!(encoded, "maxPrice=900&companies=AXA%2CAllianz");

        let decoded = FilterQuery::parse(&encoded).expect("round trip");
        assert_eq!(decoded.to_filters(982.8), filters);
    }
}
