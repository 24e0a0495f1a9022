use crate::data::{AssetRecord, PersonalityRecord};
use std::collections::HashMap;
use tracing::warn;

/// One row of the inner join between the asset and personality tables:
/// the asset fields plus the matched entity's trait scores.
#[derive(Debug, Clone)]
pub struct JoinedRow {
    pub id: String,
    pub asset_currency: String,
    pub asset_allocation: String,
    pub asset_value: f64,
    pub traits: [Option<f64>; 5],
}

/// Inner join on the entity identifier. Asset rows without a personality
/// match (and personality rows without assets) are dropped; the dropped
/// asset-row count is logged since the join itself stays silent about it.
pub fn join(assets: &[AssetRecord], personality: &[PersonalityRecord]) -> Vec<JoinedRow> {
    let by_id: HashMap<&str, &PersonalityRecord> =
        personality.iter().map(|p| (p.id.as_str(), p)).collect();

    let mut rows = Vec::with_capacity(assets.len());
    let mut dropped = 0usize;
    for asset in assets {
        match by_id.get(asset.id.as_str()) {
            Some(person) => rows.push(JoinedRow {
                id: asset.id.clone(),
                asset_currency: asset.asset_currency.clone(),
                asset_allocation: asset.asset_allocation.clone(),
                asset_value: asset.asset_value,
                traits: person.trait_values(),
            }),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        warn!(
            dropped,
            "asset rows dropped by inner join (no personality record)"
        );
    }
    rows
}

/// Keep only rows in the given currency. Case-sensitive exact match, and a
/// projection rather than a mutation: filtering the result again is a no-op.
pub fn filter_currency(rows: &[JoinedRow], currency: &str) -> Vec<JoinedRow> {
    rows.iter()
        .filter(|row| row.asset_currency == currency)
        .cloned()
        .collect()
}

/// The immutable table every report section reads from: the GBP subset of
/// the join, plus the personality table indexed by id for the independent
/// lookups (top-holder risk score, entity-total trait columns).
#[derive(Debug)]
pub struct AnalysisFrame {
    pub gbp: Vec<JoinedRow>,
    personality_by_id: HashMap<String, PersonalityRecord>,
}

impl AnalysisFrame {
    pub fn build(assets: &[AssetRecord], personality: &[PersonalityRecord]) -> Self {
        let joined = join(assets, personality);
        let gbp = filter_currency(&joined, "GBP");
        let personality_by_id = personality
            .iter()
            .map(|p| (p.id.clone(), p.clone()))
            .collect();
        Self {
            gbp,
            personality_by_id,
        }
    }

    /// Assemble a frame from an already-joined row set. The personality side
    /// is indexed as-is, so lookups can legitimately miss; callers of the
    /// per-entity queries must treat that case explicitly.
    pub fn from_parts(gbp: Vec<JoinedRow>, personality: &[PersonalityRecord]) -> Self {
        let personality_by_id = personality
            .iter()
            .map(|p| (p.id.clone(), p.clone()))
            .collect();
        Self {
            gbp,
            personality_by_id,
        }
    }

    pub fn personality(&self, id: &str) -> Option<&PersonalityRecord> {
        self.personality_by_id.get(id)
    }
}
