//! Per-entity and per-category aggregates over the GBP subset.
//!
//! Missing-value policy: correlations use pairwise deletion (an entity is
//! skipped only for the trait it lacks); group means skip nulls per trait
//! without excluding the row from other traits.

use super::pipeline::{AnalysisFrame, JoinedRow};
use ndarray::{Array1, Array2};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("No GBP rows to aggregate")]
    NoRows,
    #[error("No personality record for entity: {0}")]
    MissingPersonality(String),
}

pub type Result<T> = std::result::Result<T, AggregateError>;

/// One entity's summed GBP holdings, with its trait scores left-joined back
/// from the personality table (all-null when the entity has no record).
#[derive(Debug, Clone)]
pub struct EntityTotal {
    pub id: String,
    pub total: f64,
    pub traits: [Option<f64>; 5],
}

#[derive(Debug)]
pub struct TopHolder {
    pub id: String,
    pub total: f64,
    pub risk_tolerance: f64,
}

/// Per-category trait means over the GBP subset: one row per allocation
/// category in first-occurrence order, one column per trait. A cell with no
/// non-null observations is NaN.
#[derive(Debug)]
pub struct GroupMeans {
    pub categories: Vec<String>,
    pub means: Array2<f64>,
}

/// Sum asset values per entity, preserving each entity's first-occurrence
/// order in the input. That order is what makes the top-holder tie-break
/// deterministic.
fn totals_in_order(rows: &[JoinedRow]) -> Vec<(String, f64)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<(String, f64)> = Vec::new();

    for row in rows {
        match index.get(row.id.as_str()) {
            Some(&i) => totals[i].1 += row.asset_value,
            None => {
                index.insert(row.id.as_str(), totals.len());
                totals.push((row.id.clone(), row.asset_value));
            }
        }
    }
    totals
}

/// Group the GBP subset by entity, sum values, and left-join the trait
/// columns back from the personality table.
pub fn entity_totals(frame: &AnalysisFrame) -> Vec<EntityTotal> {
    totals_in_order(&frame.gbp)
        .into_iter()
        .map(|(id, total)| {
            let traits = frame
                .personality(&id)
                .map(|p| p.trait_values())
                .unwrap_or([None; 5]);
            EntityTotal { id, total, traits }
        })
        .collect()
}

/// The entity with the largest summed GBP holdings, and its risk-tolerance
/// score looked up independently from the personality table. When totals
/// tie, the entity whose first GBP row appears earliest in the input wins.
/// A null score surfaces as NaN; a missing record is a hard error even
/// though the join should make it impossible.
pub fn top_holder(frame: &AnalysisFrame) -> Result<TopHolder> {
    let totals = totals_in_order(&frame.gbp);
    let (id, total) = totals
        .iter()
        .fold(None::<&(String, f64)>, |best, candidate| match best {
            Some(b) if candidate.1 <= b.1 => best,
            _ => Some(candidate),
        })
        .ok_or(AggregateError::NoRows)?;

    let person = frame
        .personality(id)
        .ok_or_else(|| AggregateError::MissingPersonality(id.clone()))?;

    Ok(TopHolder {
        id: id.clone(),
        total: *total,
        risk_tolerance: person.risk_tolerance.unwrap_or(f64::NAN),
    })
}

/// Pearson correlation between summed GBP value and each trait, pairwise
/// over entities with both values present. NaN when fewer than two pairs
/// exist or either side has zero variance.
pub fn trait_correlations(totals: &[EntityTotal]) -> Array1<f64> {
    let mut correlations = Array1::zeros(5);
    for t in 0..5 {
        let pairs: Vec<(f64, f64)> = totals
            .iter()
            .filter_map(|e| e.traits[t].map(|score| (e.total, score)))
            .collect();
        correlations[t] = pearson(&pairs);
    }
    correlations
}

fn pearson(pairs: &[(f64, f64)]) -> f64 {
    let n = pairs.len();
    if n < 2 {
        return f64::NAN;
    }

    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n as f64;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in pairs {
        cov += (x - mean_x) * (y - mean_y);
        var_x += (x - mean_x).powi(2);
        var_y += (y - mean_y).powi(2);
    }

    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    cov / (var_x.sqrt() * var_y.sqrt())
}

/// Mean trait scores per allocation category. Nulls are skipped per trait,
/// so a row missing one trait still counts toward the others.
pub fn group_means(rows: &[JoinedRow]) -> GroupMeans {
    let mut categories: Vec<String> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for row in rows {
        if !index.contains_key(row.asset_allocation.as_str()) {
            index.insert(row.asset_allocation.as_str(), categories.len());
            categories.push(row.asset_allocation.clone());
        }
    }

    let mut sums = Array2::<f64>::zeros((categories.len(), 5));
    let mut counts = Array2::<f64>::zeros((categories.len(), 5));
    for row in rows {
        let c = index[row.asset_allocation.as_str()];
        for t in 0..5 {
            if let Some(score) = row.traits[t] {
                sums[[c, t]] += score;
                counts[[c, t]] += 1.0;
            }
        }
    }

    let mut means = Array2::<f64>::zeros((categories.len(), 5));
    for c in 0..categories.len() {
        for t in 0..5 {
            means[[c, t]] = if counts[[c, t]] > 0.0 {
                sums[[c, t]] / counts[[c, t]]
            } else {
                f64::NAN
            };
        }
    }

    GroupMeans { categories, means }
}

/// Row counts per allocation category, sorted descending by count (ties keep
/// first-occurrence order, the stable-sort equivalent of value_counts).
pub fn allocation_counts(rows: &[JoinedRow]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for row in rows {
        match index.get(row.asset_allocation.as_str()) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(row.asset_allocation.as_str(), counts.len());
                counts.push((row.asset_allocation.clone(), 1));
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Asset values grouped by allocation category in first-occurrence order,
/// as consumed by the box plot.
pub fn values_by_allocation(rows: &[JoinedRow]) -> Vec<(String, Vec<f64>)> {
    let mut groups: Vec<(String, Vec<f64>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for row in rows {
        match index.get(row.asset_allocation.as_str()) {
            Some(&i) => groups[i].1.push(row.asset_value),
            None => {
                index.insert(row.asset_allocation.as_str(), groups.len());
                groups.push((row.asset_allocation.clone(), vec![row.asset_value]));
            }
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_pearson_perfect_positive() {
        let pairs = vec![(1.0, 2.0), (2.0, 4.0), (3.0, 6.0)];
        assert_relative_eq!(pearson(&pairs), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_pearson_degenerate() {
        assert!(pearson(&[(1.0, 2.0)]).is_nan());
        assert!(pearson(&[(1.0, 5.0), (2.0, 5.0), (3.0, 5.0)]).is_nan());
    }
}
