pub mod sample;
pub mod source;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Highest score a single coverage entry can carry.
pub const MAX_COVERAGE_SCORE: u8 = 5;

static UNCOVERED: CoverageEntry = CoverageEntry {
    covered: false,
    score: 0,
    details: String::new(),
};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InsuranceData {
    #[serde(rename = "opportunita", default)]
    pub opportunity: Opportunity,
    #[serde(rename = "cliente", default)]
    pub client: Client,
    #[serde(rename = "categorieCoperture", default)]
    pub categories: Vec<Category>,
    #[serde(rename = "offerte", default)]
    pub offers: Vec<Offer>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Opportunity {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "tipologia", default)]
    pub kind: String,
    #[serde(rename = "argomento", default)]
    pub subject: String,
    #[serde(rename = "gestore", default)]
    pub manager: String,
    #[serde(rename = "consulente", default)]
    pub advisor: String,
    #[serde(rename = "prodotti_assicurativi", default)]
    pub products: Vec<String>,
    #[serde(rename = "situazione_corrente", default)]
    pub current_situation: String,
    #[serde(rename = "esigenza_cliente", default)]
    pub client_need: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Client {
    #[serde(rename = "nome_completo", default)]
    pub full_name: String,
    #[serde(rename = "tipologia_cliente", default)]
    pub client_type: String,
    #[serde(rename = "email", default)]
    pub email: String,
    #[serde(rename = "telefono_principale", default)]
    pub phone: String,
    #[serde(rename = "indirizzo_citta", default)]
    pub city: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "microCoperture", default)]
    pub micro_coverages: Vec<MicroCoverage>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MicroCoverage {
    pub id: String,
    #[serde(rename = "nome")]
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CoverageEntry {
    pub covered: bool,
    pub score: u8,
    #[serde(default)]
    pub details: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Offer {
    pub id: u32,
    pub company: String,
    #[serde(rename = "premium_annuale")]
    pub premium: f64,
    #[serde(default)]
    pub coverages: BTreeMap<String, CoverageEntry>,
    #[serde(rename = "variante", default)]
    pub variant: String,
    #[serde(rename = "osservazione", default)]
    pub remark: Option<String>,
    #[serde(rename = "riassunto_offerta", default)]
    pub summary: String,
    #[serde(rename = "tipo_richiesta", default)]
    pub request_type: String,
    #[serde(rename = "policyNumber", default)]
    pub policy_number: String,
    #[serde(default)]
    pub logo: String,
    #[serde(default)]
    pub pdf_link: String,
}

impl Offer {
    pub fn new(id: u32, company: impl Into<String>, premium: f64) -> Self {
        Self {
            id,
            company: company.into(),
            premium,
            coverages: BTreeMap::new(),
            variant: String::new(),
            remark: None,
            summary: String::new(),
            request_type: String::new(),
            policy_number: String::new(),
            logo: String::new(),
            pdf_link: String::new(),
        }
    }

    pub fn with_coverage(mut self, id: &str, covered: bool, score: u8, details: &str) -> Self {
        self.coverages.insert(
            id.to_string(),
            CoverageEntry {
                covered,
                score,
                details: details.to_string(),
            },
        );
        self
    }

    /// Entry for `micro_id`; an offer without one reads as not covered with score 0.
    pub fn coverage(&self, micro_id: &str) -> &CoverageEntry {
        self.coverages.get(micro_id).unwrap_or(&UNCOVERED)
    }

    pub fn score_for(&self, micro_id: &str) -> u8 {
        self.coverage(micro_id).score
    }

    pub fn is_covered(&self, micro_id: &str) -> bool {
        self.coverage(micro_id).covered
    }
}

impl Category {
    pub fn new(name: impl Into<String>, micro: &[(&str, &str)]) -> Self {
        Self {
            name: name.into(),
            micro_coverages: micro
                .iter()
                .map(|(id, name)| MicroCoverage {
                    id: id.to_string(),
                    name: name.to_string(),
                })
                .collect(),
        }
    }

    pub fn micro_ids(&self) -> impl Iterator<Item = &str> {
        self.micro_coverages.iter().map(|m| m.id.as_str())
    }
}

/// Flattens the catalog into its micro-coverages, in catalog order.
pub fn all_micro_coverages(categories: &[Category]) -> Vec<&MicroCoverage> {
    categories
        .iter()
        .flat_map(|c| c.micro_coverages.iter())
        .collect()
}

pub fn available_companies(offers: &[Offer]) -> Vec<String> {
    offers
        .iter()
        .map(|o| o.company.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn max_premium(offers: &[Offer]) -> f64 {
    offers.iter().map(|o| o.premium).fold(0.0, f64::max)
}

#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("micro-coverage id {id} appears in both {first} and {second}")]
    DuplicateMicroCoverage {
        id: String,
        first: String,
        second: String,
    },
    #[error("offer id {0} appears more than once")]
    DuplicateOffer(u32),
    #[error("offer {offer} has invalid premium {premium}")]
    InvalidPremium { offer: u32, premium: f64 },
    #[error("offer {offer} scores {micro_id} at {score}, above the maximum of 5")]
    ScoreOutOfRange {
        offer: u32,
        micro_id: String,
        score: u8,
    },
}

impl InsuranceData {
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut owners: BTreeMap<&str, &str> = BTreeMap::new();
        for category in &self.categories {
            for micro in &category.micro_coverages {
                if let Some(first) = owners.insert(micro.id.as_str(), category.name.as_str()) {
                    return Err(CatalogError::DuplicateMicroCoverage {
                        id: micro.id.clone(),
                        first: first.to_string(),
                        second: category.name.clone(),
                    });
                }
            }
        }

        let mut seen = BTreeSet::new();
        for offer in &self.offers {
            if !seen.insert(offer.id) {
                return Err(CatalogError::DuplicateOffer(offer.id));
            }
            if !offer.premium.is_finite() || offer.premium < 0.0 {
                return Err(CatalogError::InvalidPremium {
                    offer: offer.id,
                    premium: offer.premium,
                });
            }
            if let Some((micro_id, entry)) = offer
                .coverages
                .iter()
                .find(|(_, entry)| entry.score > MAX_COVERAGE_SCORE)
            {
                return Err(CatalogError::ScoreOutOfRange {
                    offer: offer.id,
                    micro_id: micro_id.clone(),
                    score: entry.score,
                });
            }
        }
        Ok(())
    }

    /// Catalog ids an offer has no entry for, keyed by offer id.
    pub fn missing_entries(&self) -> BTreeMap<u32, Vec<String>> {
        let ids = all_micro_coverages(&self.categories);
        self.offers
            .iter()
            .filter_map(|offer| {
                let missing = ids
                    .iter()
                    .filter(|m| !offer.coverages.contains_key(&m.id))
                    .map(|m| m.id.clone())
                    .collect::<Vec<_>>();
                (!missing.is_empty()).then_some((offer.id, missing))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_coverage_reads_as_uncovered() {
        let offer = Offer::new(1, "Zurich", 900.0).with_coverage("a", true, 4, "ok");
        assert_eq!(offer.score_for("a"), 4);
        assert!(offer.is_covered("a"));
        let missing = offer.coverage("b");
        assert!(!missing.covered);
        assert_eq!(missing.score, 0);
    }

    #[test]
    fn validate_rejects_duplicate_micro_ids() {
        let data = InsuranceData {
            categories: vec![
                Category::new("RC", &[("x", "X")]),
                Category::new("Casco", &[("x", "X again")]),
            ],
            ..InsuranceData::default()
        };
        assert_eq!(
            data.validate(),
            Err(CatalogError::DuplicateMicroCoverage {
                id: "x".to_string(),
                first: "RC".to_string(),
                second: "Casco".to_string(),
            })
        );
    }

    #[test]
    fn validate_rejects_bad_offers() {
        let mut data = InsuranceData {
            offers: vec![Offer::new(1, "A", 100.0), Offer::new(1, "B", 200.0)],
            ..InsuranceData::default()
        };
        assert_eq!(data.validate(), Err(CatalogError::DuplicateOffer(1)));

        data.offers = vec![Offer::new(1, "A", f64::NAN)];
        assert!(matches!(
            data.validate(),
            Err(CatalogError::InvalidPremium { offer: 1, .. })
        ));

        data.offers = vec![Offer::new(1, "A", 100.0).with_coverage("x", true, 7, "")];
        assert!(matches!(
            data.validate(),
            Err(CatalogError::ScoreOutOfRange { score: 7, .. })
        ));
    }

    #[test]
    fn reports_missing_entries_and_companies() {
        let data = InsuranceData {
            categories: vec![Category::new("RC", &[("x", "X"), ("y", "Y")])],
            offers: vec![
                Offer::new(1, "Zurich", 100.0).with_coverage("x", true, 3, ""),
                Offer::new(2, "AXA", 300.0)
                    .with_coverage("x", true, 3, "")
                    .with_coverage("y", false, 0, ""),
                Offer::new(3, "AXA", 200.0)
                    .with_coverage("x", true, 3, "")
                    .with_coverage("y", false, 0, ""),
            ],
            ..InsuranceData::default()
        };
        let missing = data.missing_entries();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[&1], vec!["y".to_string()]);
        assert_eq!(available_companies(&data.offers), vec!["AXA", "Zurich"]);
        assert_eq!(max_premium(&data.offers), 300.0);
    }
}
