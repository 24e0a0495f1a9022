//! Ordinary least squares of total GBP holdings on the five trait scores.
//!
//! Complete-case (listwise) fit: an entity missing any of the six involved
//! columns is excluded entirely, and the excluded count is reported.

use super::aggregate::EntityTotal;
use crate::data::TRAIT_COLUMNS;
use nalgebra::{DMatrix, DVector};
use statrs::distribution::{ContinuousCDF, FisherSnedecor, StudentsT};
use statrs::StatsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegressionError {
    #[error("Need more than {parameters} complete rows to fit, got {observations}")]
    InsufficientObservations {
        observations: usize,
        parameters: usize,
    },
    #[error("Design matrix is singular; coefficients are not identifiable")]
    SingularDesign,
    #[error("Distribution error: {0}")]
    Distribution(#[from] StatsError),
}

pub type Result<T> = std::result::Result<T, RegressionError>;

/// The full fit summary: one entry per term (intercept first, then the five
/// traits in canonical order) plus model-level statistics.
#[derive(Debug)]
pub struct OlsSummary {
    pub terms: Vec<String>,
    pub coefficients: Vec<f64>,
    pub std_errors: Vec<f64>,
    pub t_values: Vec<f64>,
    pub p_values: Vec<f64>,
    pub r_squared: f64,
    pub adj_r_squared: f64,
    pub f_statistic: f64,
    pub f_pvalue: f64,
    pub observations: usize,
    pub excluded: usize,
}

/// Fit total ~ confidence + risk_tolerance + composure + impulsivity +
/// impact_desire with an intercept, via the normal equations. (X'X)^-1 is
/// computed once and reused for the coefficient standard errors.
pub fn fit(totals: &[EntityTotal]) -> Result<OlsSummary> {
    // Complete cases only
    let complete: Vec<(&EntityTotal, [f64; 5])> = totals
        .iter()
        .filter_map(|e| {
            let mut scores = [0.0; 5];
            for (slot, value) in scores.iter_mut().zip(e.traits.iter()) {
                *slot = (*value)?;
            }
            Some((e, scores))
        })
        .collect();

    let n = complete.len();
    let k = TRAIT_COLUMNS.len() + 1; // intercept + traits
    if n <= k {
        return Err(RegressionError::InsufficientObservations {
            observations: n,
            parameters: k,
        });
    }

    let x = DMatrix::from_fn(n, k, |i, j| {
        if j == 0 {
            1.0
        } else {
            complete[i].1[j - 1]
        }
    });
    let y = DVector::from_fn(n, |i, _| complete[i].0.total);

    let xtx = x.transpose() * &x;
    let xty = x.transpose() * &y;
    let xtx_inv = xtx.try_inverse().ok_or(RegressionError::SingularDesign)?;
    let beta = &xtx_inv * xty;

    let residuals = &y - &x * &beta;
    let sse: f64 = residuals.iter().map(|r| r * r).sum();
    let mean_y = y.iter().sum::<f64>() / n as f64;
    let sst: f64 = y.iter().map(|v| (v - mean_y).powi(2)).sum();

    let df_resid = (n - k) as f64;
    let df_model = (k - 1) as f64;
    let sigma2 = sse / df_resid;

    let t_dist = StudentsT::new(0.0, 1.0, df_resid)?;
    let mut coefficients = Vec::with_capacity(k);
    let mut std_errors = Vec::with_capacity(k);
    let mut t_values = Vec::with_capacity(k);
    let mut p_values = Vec::with_capacity(k);
    for j in 0..k {
        let b = beta[j];
        let se = (sigma2 * xtx_inv[(j, j)]).sqrt();
        let t = b / se;
        coefficients.push(b);
        std_errors.push(se);
        t_values.push(t);
        p_values.push(2.0 * (1.0 - t_dist.cdf(t.abs())));
    }

    let (r_squared, adj_r_squared, f_statistic, f_pvalue) = if sst > 0.0 {
        let r2 = 1.0 - sse / sst;
        let adj = 1.0 - (1.0 - r2) * (n as f64 - 1.0) / df_resid;
        let f = (r2 / df_model) / ((1.0 - r2) / df_resid);
        let f_dist = FisherSnedecor::new(df_model, df_resid)?;
        (r2, adj, f, 1.0 - f_dist.cdf(f))
    } else {
        // Constant response: the model explains nothing by definition
        (f64::NAN, f64::NAN, f64::NAN, f64::NAN)
    };

    let mut terms = vec!["Intercept".to_string()];
    terms.extend(TRAIT_COLUMNS.iter().map(|t| t.to_string()));

    Ok(OlsSummary {
        terms,
        coefficients,
        std_errors,
        t_values,
        p_values,
        r_squared,
        adj_r_squared,
        f_statistic,
        f_pvalue,
        observations: n,
        excluded: totals.len() - n,
    })
}
