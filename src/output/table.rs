use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

use crate::catalog::Category;
use crate::pipeline::ComparisonSummary;
use crate::ranking::RankedOffer;
use crate::report::{CellStyle, PrintTable, ScoreTier};

pub fn tier_color(tier: ScoreTier) -> Color {
    match tier {
        ScoreTier::High => Color::Green,
        ScoreTier::Medium => Color::Yellow,
        ScoreTier::Low => Color::Red,
    }
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn render_comparison_table(
    offers: &[RankedOffer],
    summary: Option<&ComparisonSummary>,
) -> String {
    let mut table = new_table();
    table.set_header(vec![
        "#",
        "Company",
        "Variant",
        "Premium (CHF)",
        "Score %",
        "Price Score",
        "Final Score",
        "Value / CHF",
        "Badges",
    ]);

    for (idx, offer) in offers.iter().enumerate() {
        let badges = offer.badges().join(", ");
        let badge_cell = if badges.is_empty() {
            Cell::new("-")
        } else {
            Cell::new(badges).fg(Color::Green)
        };
        table.add_row(Row::from(vec![
            Cell::new((idx + 1).to_string()),
            Cell::new(&offer.company),
            Cell::new(&offer.variant),
            Cell::new(format!("{:.2}", offer.premium)),
            Cell::new(format!("{:.1}", offer.score_percent()))
                .fg(tier_color(ScoreTier::from_score(offer.average_micro_score))),
            Cell::new(format!("{:.2}", offer.price_score)),
            Cell::new(format!("{:.3}", offer.final_score)),
            Cell::new(format!("{:.6}", offer.best_value)),
            badge_cell,
        ]));
    }

    let mut rendered = table.to_string();
    if let Some(summary) = summary {
        rendered.push_str(&format!(
            "\nShowing {} of {} offers{}",
            summary.shown_offers,
            summary.total_offers,
            if summary.filters_active {
                " (filters active)"
            } else {
                ""
            }
        ));
        if offers.is_empty() {
            rendered.push_str("\nNo offer matches the current filters.");
        }
    }
    rendered
}

pub fn render_catalog_table(categories: &[Category]) -> String {
    let mut table = new_table();
    table.set_header(vec!["Category", "Micro-coverage", "Name"]);
    for category in categories {
        for micro in &category.micro_coverages {
            table.add_row(vec![
                category.name.clone(),
                micro.id.clone(),
                micro.name.clone(),
            ]);
        }
    }
    table.to_string()
}

/// Print rows as a terminal grid. Coverage cells take their tier color when `colored`.
pub fn render_print_table(print: &PrintTable, colored: bool) -> String {
    let mut table = new_table();
    table.set_header(
        print
            .head
            .iter()
            .map(|cell| Cell::new(&cell.content))
            .collect::<Vec<_>>(),
    );
    for row in &print.body {
        table.add_row(Row::from(
            row.iter()
                .map(|cell| match (cell.style, colored) {
                    (CellStyle::Coverage(tier), true) => {
                        Cell::new(&cell.content).fg(tier_color(tier))
                    }
                    _ => Cell::new(&cell.content),
                })
                .collect::<Vec<_>>(),
        ));
    }
    table.to_string()
}
