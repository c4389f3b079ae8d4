use anyhow::{Context, Result};

use crate::catalog::InsuranceData;

/// Car-insurance comparison for a single client: seven categories, five offers.
pub const SAMPLE_DATASET: &str = include_str!("../../data/insurance_data.json");

pub fn sample_data() -> Result<InsuranceData> {
    serde_json::from_str(SAMPLE_DATASET).context("embedded sample dataset is not valid JSON")
}

#[cfg(test)]
mod tests {
    use super::sample_data;
    use crate::catalog::all_micro_coverages;

    #[test]
    fn sample_parses_and_validates() {
        let data = sample_data().expect("sample dataset");
        assert_eq!(data.categories.len(), 7);
        assert_eq!(all_micro_coverages(&data.categories).len(), 23);
        assert_eq!(data.offers.len(), 5);
        assert_eq!(data.client.full_name, "Mario Rossi");
        data.validate().expect("sample dataset is valid");
        assert!(data.missing_entries().is_empty());
    }

    #[test]
    fn sample_offer_fields_map_from_source_names() {
        let data = sample_data().expect("sample dataset");
        let helvetia = data
            .offers
            .iter()
            .find(|o| o.company == "Helvetia")
            .expect("helvetia offer");
        assert_eq!(helvetia.id, 3);
        assert!((helvetia.premium - 834.0).abs() < 1e-9);
        assert_eq!(helvetia.variant, "Economy");
        assert_eq!(helvetia.policy_number, "HELV-7C4");
        assert!(!helvetia.is_covered("in_conducente"));
    }
}
