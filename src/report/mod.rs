pub mod body;
pub mod export;
pub mod header;

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{Category, CoverageEntry};
use crate::filters::{displayed_categories, Filters};
use crate::ranking::RankedOffer;

/// Offers kept by the `top3` layout.
pub const TOP_OFFERS: usize = 3;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PrintMode {
    #[default]
    Top3,
    Summary,
    Detailed,
    Filtered,
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown print mode: {0} (expected top3, summary, detailed or filtered)")]
pub struct PrintModeParseError(pub String);

impl PrintMode {
    pub const ALL: [PrintMode; 4] = [
        PrintMode::Top3,
        PrintMode::Summary,
        PrintMode::Detailed,
        PrintMode::Filtered,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top3 => "top3",
            Self::Summary => "summary",
            Self::Detailed => "detailed",
            Self::Filtered => "filtered",
        }
    }

    pub fn orientation(self) -> Orientation {
        match self {
            Self::Top3 | Self::Filtered => Orientation::Portrait,
            Self::Summary | Self::Detailed => Orientation::Landscape,
        }
    }

    /// Whether each micro-coverage gets its own row under the category mean.
    pub fn shows_micro_rows(self) -> bool {
        !matches!(self, Self::Summary)
    }

    pub fn select_offers(self, offers: &[RankedOffer]) -> &[RankedOffer] {
        match self {
            Self::Top3 => &offers[..offers.len().min(TOP_OFFERS)],
            _ => offers,
        }
    }

    /// Catalog printed for this mode: `filtered` narrows it to the selected coverages.
    pub fn categories(self, categories: &[Category], filters: &Filters) -> Vec<Category> {
        match self {
            Self::Filtered => displayed_categories(categories, filters),
            _ => categories.to_vec(),
        }
    }
}

impl FromStr for PrintMode {
    type Err = PrintModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top3" => Ok(Self::Top3),
            "summary" => Ok(Self::Summary),
            "detailed" => Ok(Self::Detailed),
            "filtered" => Ok(Self::Filtered),
            _ => Err(PrintModeParseError(s.to_string())),
        }
    }
}

impl Display for PrintMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScoreTier {
    High,
    Medium,
    Low,
}

impl ScoreTier {
    pub fn from_score(score: f64) -> Self {
        if score >= 4.0 {
            Self::High
        } else if score >= 2.5 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Uncovered entries always print in the low tier, whatever score they carry.
    pub fn for_coverage(entry: &CoverageEntry) -> Self {
        if entry.covered {
            Self::from_score(f64::from(entry.score))
        } else {
            Self::Low
        }
    }

    pub fn hex(self) -> &'static str {
        match self {
            Self::High => "#15803d",
            Self::Medium => "#ca8a04",
            Self::Low => "#dc2626",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CellStyle {
    Header,
    Label,
    Category,
    Coverage(ScoreTier),
    Remark,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrintCell {
    pub content: String,
    pub style: CellStyle,
}

impl PrintCell {
    pub fn new(content: impl Into<String>, style: CellStyle) -> Self {
        Self {
            content: content.into(),
            style,
        }
    }

    pub fn tier(&self) -> Option<ScoreTier> {
        match self.style {
            CellStyle::Coverage(tier) => Some(tier),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrintTable {
    pub mode: PrintMode,
    pub orientation: Orientation,
    pub head: Vec<PrintCell>,
    pub body: Vec<Vec<PrintCell>>,
}

impl PrintTable {
    pub fn offer_count(&self) -> usize {
        self.head.len().saturating_sub(1)
    }

    /// First row whose label cell reads `label`.
    pub fn row(&self, label: &str) -> Option<&[PrintCell]> {
        self.body
            .iter()
            .find(|row| row.first().is_some_and(|cell| cell.content == label))
            .map(Vec::as_slice)
    }
}

/// Projects already ranked offers into printable rows. `top3` keeps the first three
/// offers; the categories are printed as given.
pub fn build_print_table(
    mode: PrintMode,
    offers: &[RankedOffer],
    categories: &[Category],
) -> PrintTable {
    let offers = mode.select_offers(offers);
    PrintTable {
        mode,
        orientation: mode.orientation(),
        head: header::header_row(offers),
        body: body::body_rows(offers, categories, mode),
    }
}
