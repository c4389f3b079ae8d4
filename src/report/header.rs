use crate::ranking::RankedOffer;
use crate::report::{CellStyle, PrintCell};

pub const COVERAGE_COLUMN_LABEL: &str = "Coperture";

pub fn header_row(offers: &[RankedOffer]) -> Vec<PrintCell> {
    std::iter::once(PrintCell::new(COVERAGE_COLUMN_LABEL, CellStyle::Header))
        .chain(offers.iter().map(|offer| {
            PrintCell::new(
                format!(
                    "{}\n CHF {:.2}\n voto: {:.1}",
                    offer.company, offer.premium, offer.final_score
                ),
                CellStyle::Header,
            )
        }))
        .collect()
}
