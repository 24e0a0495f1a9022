pub mod loader;

use serde::Deserialize;
use thiserror::Error;

/// Canonical order of the five personality trait columns. Every per-trait
/// aggregate (correlations, group means, Kruskal-Wallis results) follows
/// this order.
pub const TRAIT_COLUMNS: [&str; 5] = [
    "confidence",
    "risk_tolerance",
    "composure",
    "impulsivity",
    "impact_desire",
];

/// One asset holding as exported by the ingestion step.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub asset_currency: String,
    pub asset_allocation: String,
    pub asset_value: f64,
}

/// One personality survey row. Trait scores are optional so an empty CSV
/// field becomes a null rather than a parse failure; downstream statistics
/// decide how nulls are dropped.
#[derive(Debug, Clone, Deserialize)]
pub struct PersonalityRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub confidence: Option<f64>,
    pub risk_tolerance: Option<f64>,
    pub composure: Option<f64>,
    pub impulsivity: Option<f64>,
    pub impact_desire: Option<f64>,
}

impl PersonalityRecord {
    /// Trait scores in `TRAIT_COLUMNS` order.
    pub fn trait_values(&self) -> [Option<f64>; 5] {
        [
            self.confidence,
            self.risk_tolerance,
            self.composure,
            self.impulsivity,
            self.impact_desire,
        ]
    }
}

#[derive(Debug, Error)]
pub enum DataError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Missing required column: {0}")]
    MissingColumn(String),
}

pub type Result<T> = std::result::Result<T, DataError>;
