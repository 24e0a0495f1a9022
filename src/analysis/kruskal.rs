//! Kruskal-Wallis H-tests comparing trait distributions across allocation
//! categories, run independently per trait so one degenerate trait cannot
//! take the others down with it.

use super::pipeline::JoinedRow;
use crate::data::TRAIT_COLUMNS;
use statrs::distribution::{ChiSquared, ContinuousCDF};
use statrs::StatsError;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KruskalError {
    #[error("Need at least two non-empty groups, got {0}")]
    InsufficientGroups(usize),
    #[error("All values are identical; H is undefined")]
    AllValuesIdentical,
    #[error("Distribution error: {0}")]
    Distribution(#[from] StatsError),
}

pub type Result<T> = std::result::Result<T, KruskalError>;

#[derive(Debug)]
pub struct KruskalResult {
    pub h_statistic: f64,
    pub p_value: f64,
}

/// H-test over the given sample groups, with the standard tie correction
/// and a chi-squared p-value on (groups - 1) degrees of freedom.
pub fn kruskal_test(groups: &[Vec<f64>]) -> Result<KruskalResult> {
    let non_empty: Vec<&Vec<f64>> = groups.iter().filter(|g| !g.is_empty()).collect();
    if non_empty.len() < 2 {
        return Err(KruskalError::InsufficientGroups(non_empty.len()));
    }

    let mut pooled: Vec<(f64, usize)> = Vec::new();
    for (group_idx, group) in non_empty.iter().enumerate() {
        for &value in group.iter() {
            pooled.push((value, group_idx));
        }
    }
    let n = pooled.len() as f64;
    pooled.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    // Mid-ranks for ties, plus the tie-correction term
    let mut rank_sums = vec![0.0; non_empty.len()];
    let mut tie_term = 0.0;
    let mut i = 0;
    while i < pooled.len() {
        let mut j = i;
        while j < pooled.len() && pooled[j].0 == pooled[i].0 {
            j += 1;
        }
        let tied = (j - i) as f64;
        let mid_rank = (i + j + 1) as f64 / 2.0;
        for entry in &pooled[i..j] {
            rank_sums[entry.1] += mid_rank;
        }
        tie_term += tied.powi(3) - tied;
        i = j;
    }

    let correction = 1.0 - tie_term / (n.powi(3) - n);
    if correction == 0.0 {
        return Err(KruskalError::AllValuesIdentical);
    }

    let mut h = 0.0;
    for (group_idx, group) in non_empty.iter().enumerate() {
        h += rank_sums[group_idx].powi(2) / group.len() as f64;
    }
    h = (12.0 / (n * (n + 1.0))) * h - 3.0 * (n + 1.0);
    h /= correction;

    let df = (non_empty.len() - 1) as f64;
    let chi2 = ChiSquared::new(df)?;
    let p_value = 1.0 - chi2.cdf(h);

    Ok(KruskalResult {
        h_statistic: h,
        p_value,
    })
}

/// Run the H-test for every trait: values are partitioned by allocation
/// category with nulls dropped within that trait only. Each trait reports
/// its own result or its own failure.
pub fn by_allocation(rows: &[JoinedRow]) -> Vec<(String, Result<KruskalResult>)> {
    let mut categories: Vec<&str> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for row in rows {
        if !index.contains_key(row.asset_allocation.as_str()) {
            index.insert(row.asset_allocation.as_str(), categories.len());
            categories.push(row.asset_allocation.as_str());
        }
    }

    TRAIT_COLUMNS
        .iter()
        .enumerate()
        .map(|(t, name)| {
            let mut groups: Vec<Vec<f64>> = vec![Vec::new(); categories.len()];
            for row in rows {
                if let Some(value) = row.traits[t] {
                    groups[index[row.asset_allocation.as_str()]].push(value);
                }
            }
            (name.to_string(), kruskal_test(&groups))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_known_h_without_ties() {
        // Two groups, ranks 1..6: group A holds {1,2,3}, group B {4,5,6}.
        // H = 12/(6*7) * (6^2/3 + 15^2/3) - 3*7 = 3.857142...
        let groups = vec![vec![1.0, 2.0, 3.0], vec![10.0, 11.0, 12.0]];
        let result = kruskal_test(&groups).unwrap();
        assert_relative_eq!(result.h_statistic, 27.0 / 7.0, epsilon = 1e-12);
    }

    #[test]
    fn test_single_group_rejected() {
        let groups = vec![vec![1.0, 2.0], vec![]];
        assert!(matches!(
            kruskal_test(&groups),
            Err(KruskalError::InsufficientGroups(1))
        ));
    }

    #[test]
    fn test_identical_values_rejected() {
        let groups = vec![vec![5.0, 5.0], vec![5.0, 5.0]];
        assert!(matches!(
            kruskal_test(&groups),
            Err(KruskalError::AllValuesIdentical)
        ));
    }
}
