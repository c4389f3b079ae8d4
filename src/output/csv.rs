use anyhow::Result;

use crate::catalog::Category;
use crate::ranking::RankedOffer;
use crate::report::PrintTable;

pub fn ranked_to_csv(offers: &[RankedOffer]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "position",
        "id",
        "company",
        "variant",
        "premium",
        "average_micro_score",
        "score_percent",
        "price_score",
        "final_score",
        "best_value",
        "is_best_price",
        "is_best_score",
        "is_best_value",
        "rank",
    ])?;
    for (idx, offer) in offers.iter().enumerate() {
        writer.write_record([
            (idx + 1).to_string(),
            offer.id.to_string(),
            offer.company.clone(),
            offer.variant.clone(),
            format!("{:.2}", offer.premium),
            format!("{:.4}", offer.average_micro_score),
            format!("{:.2}", offer.score_percent()),
            format!("{:.4}", offer.price_score),
            format!("{:.4}", offer.final_score),
            format!("{:.6}", offer.best_value),
            offer.is_best_price.to_string(),
            offer.is_best_score.to_string(),
            offer.is_best_value.to_string(),
            offer.rank.to_string(),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

/// Header cells become the first record, then one record per body row.
pub fn print_table_to_csv(table: &PrintTable) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(table.head.iter().map(|cell| cell.content.as_str()))?;
    for row in &table.body {
        writer.write_record(row.iter().map(|cell| cell.content.as_str()))?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn catalog_to_csv(categories: &[Category]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["category", "micro_id", "name"])?;
    for category in categories {
        for micro in &category.micro_coverages {
            writer.write_record([&category.name, &micro.id, &micro.name])?;
        }
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}
