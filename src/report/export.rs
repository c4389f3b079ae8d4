use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::output::csv::print_table_to_csv;
use crate::output::table::render_print_table;
use crate::report::{PrintMode, PrintTable};

const REPORT_PREFIX: &str = "Report_Assicurazioni";
const FOOTER_OWNER: &str = "© L+G SA";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Table,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Table => "txt",
        }
    }
}

pub fn report_file_name(mode: PrintMode, date: NaiveDate, extension: &str) -> String {
    format!("{REPORT_PREFIX}_{mode}_{}.{extension}", date.format("%Y-%m-%d"))
}

pub fn report_footer(date: NaiveDate) -> String {
    format!("{FOOTER_OWNER} - {}", date.format("%d/%m/%Y"))
}

pub fn render_report(table: &PrintTable, format: ExportFormat, date: NaiveDate) -> Result<String> {
    match format {
        ExportFormat::Csv => print_table_to_csv(table),
        ExportFormat::Table => Ok(format!(
            "{}\n{}\n",
            render_print_table(table, false),
            report_footer(date)
        )),
    }
}

/// Writes the report into `dir` (created when missing) and returns the file path.
pub fn export_report(
    dir: &Path,
    table: &PrintTable,
    format: ExportFormat,
    date: NaiveDate,
) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed creating report directory: {}", dir.display()))?;
    let path = dir.join(report_file_name(table.mode, date, format.extension()));
    let rendered = render_report(table, format, date)?;
    fs::write(&path, rendered)
        .with_context(|| format!("failed writing report: {}", path.display()))?;
    info!(
        mode = %table.mode,
        offers = table.offer_count(),
        rows = table.body.len(),
        path = %path.display(),
        "report exported"
    );
    Ok(path)
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
