use crate::catalog::{Category, MicroCoverage};
use crate::ranking::RankedOffer;
use crate::report::{CellStyle, PrintCell, PrintMode, ScoreTier};

pub const VARIANT_LABEL: &str = "Variante";
pub const REMARK_LABEL: &str = "Osservazione Finale";
pub const NOT_INCLUDED: &str = "Non inclusa";

/// Variant row, a mean row per category (followed by its micro-coverage rows
/// unless the mode is `summary`) and the closing remark row.
pub fn body_rows(
    offers: &[RankedOffer],
    categories: &[Category],
    mode: PrintMode,
) -> Vec<Vec<PrintCell>> {
    let mut body = Vec::new();

    body.push(labelled_row(VARIANT_LABEL, CellStyle::Category, offers, |offer| {
        PrintCell::new(offer.variant.clone(), CellStyle::Category)
    }));

    for category in categories {
        body.push(labelled_row(&category.name, CellStyle::Category, offers, |offer| {
            PrintCell::new(
                format!("Media: {:.1}", offer.macro_score(&category.name)),
                CellStyle::Category,
            )
        }));

        if mode.shows_micro_rows() {
            for micro in &category.micro_coverages {
                body.push(micro_row(micro, offers));
            }
        }
    }

    body.push(labelled_row(REMARK_LABEL, CellStyle::Category, offers, |offer| {
        let remark = offer
            .remark
            .as_deref()
            .filter(|r| !r.is_empty())
            .unwrap_or("-");
        PrintCell::new(remark, CellStyle::Remark)
    }));

    body
}

fn micro_row(micro: &MicroCoverage, offers: &[RankedOffer]) -> Vec<PrintCell> {
    labelled_row(&micro.name, CellStyle::Label, offers, |offer| {
        let entry = offer.coverage(&micro.id);
        let tier = ScoreTier::for_coverage(entry);
        if entry.covered {
            PrintCell::new(
                format!("{}\n{}", entry.score, entry.details),
                CellStyle::Coverage(tier),
            )
        } else {
            PrintCell::new(NOT_INCLUDED, CellStyle::Coverage(tier))
        }
    })
}

fn labelled_row(
    label: &str,
    label_style: CellStyle,
    offers: &[RankedOffer],
    cell: impl Fn(&RankedOffer) -> PrintCell,
) -> Vec<PrintCell> {
    std::iter::once(PrintCell::new(label, label_style))
        .chain(offers.iter().map(cell))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{body_rows, NOT_INCLUDED};
    use crate::catalog::sample::sample_data;
    use crate::catalog::InsuranceData;
    use crate::filters::Filters;
    use crate::pipeline::process_insurance_comparison;
    use crate::ranking::RankedOffer;
    use crate::report::{PrintMode, ScoreTier};

    /// Zurich and AXA, in catalog order.
    fn first_two_offers(data: &InsuranceData) -> Vec<RankedOffer> {
        let ranked = process_insurance_comparison(data, &Filters::full_range(data));
        let mut offers = ranked
            .into_iter()
            .filter(|o| o.id == 1 || o.id == 2)
            .collect::<Vec<_>>();
        offers.sort_by_key(|o| o.id);
        offers
    }

    #[test]
    fn detailed_rows_cover_every_micro_coverage() {
        let data = sample_data().expect("sample");
        let offers = first_two_offers(&data);
        let categories = &data.categories[..2];

        for mode in [PrintMode::Detailed, PrintMode::Top3, PrintMode::Filtered] {
            let body = body_rows(&offers, categories, mode);
            assert_eq!(body.len(), 1 + (1 + 3) + (1 + 6) + 1);
        }

        let body = body_rows(&offers, categories, PrintMode::Top3);
        let detail = &body[2][1];
        assert!(detail.content.contains("Copertura fino a 100M CHF."));
        assert_eq!(detail.tier(), Some(ScoreTier::High));
        assert_eq!(ScoreTier::High.hex(), "#15803d");
    }

    #[test]
    fn summary_rows_skip_micro_coverages() {
        let data = sample_data().expect("sample");
        let offers = first_two_offers(&data);
        let body = body_rows(&offers, &data.categories[..2], PrintMode::Summary);
        assert_eq!(body.len(), 1 + 2 + 1);
        assert_eq!(body[0][0].content, "Variante");
        assert_eq!(body[0][1].content, "Standard");
        assert_eq!(body[1][1].content, "Media: 4.0");
        assert_eq!(body[2][1].content, "Media: 3.7");
        assert_eq!(body[3][0].content, "Osservazione Finale");
    }

    #[test]
    fn uncovered_items_print_as_not_included() {
        let data = sample_data().expect("sample");
        let zurich = first_two_offers(&data)
            .into_iter()
            .take(1)
            .collect::<Vec<_>>();
        let casco = data
            .categories
            .iter()
            .find(|c| c.name == "Casco parziale")
            .cloned()
            .expect("casco parziale");

        let body = body_rows(&zurich, &[casco], PrintMode::Detailed);
        let row = body
            .iter()
            .find(|row| row[0].content == "Atti vandalici non dolosi")
            .expect("vandalism row");
        assert_eq!(row[1].content, NOT_INCLUDED);
        assert_eq!(row[1].tier(), Some(ScoreTier::Low));
        assert_eq!(ScoreTier::Low.hex(), "#dc2626");
    }

    #[test]
    fn missing_remark_prints_a_dash() {
        let data = sample_data().expect("sample");
        let mut offers = first_two_offers(&data);
        offers[0].scored.scored.offer.remark = None;
        let body = body_rows(&offers, &[], PrintMode::Summary);
        let remark = body.last().expect("remark row");
        assert_eq!(remark[1].content, "-");
        assert!(remark[2].content.starts_with("Offerta premium"));
    }
}
