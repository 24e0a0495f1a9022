//! Console tables and the regression report file. Everything here is
//! read-only over the aggregate structures; nothing feeds back into the
//! numeric pipeline.

use crate::analysis::aggregate::{GroupMeans, TopHolder};
use crate::analysis::kruskal::{KruskalResult, Result as KruskalOutcome};
use crate::analysis::regression::OlsSummary;
use crate::data::TRAIT_COLUMNS;
use ndarray::Array1;
use std::fs;
use std::path::Path;

/// "risk_tolerance" -> "Risk Tolerance", as used for chart and table labels.
pub fn pretty_trait(name: &str) -> String {
    name.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn print_top_holder(top: &TopHolder) {
    println!("ID: {}", top.id);
    println!("Total GBP Assets: {}", top.total);
    println!("Risk Tolerance Score: {}", top.risk_tolerance);
}

pub fn print_correlations(correlations: &Array1<f64>) {
    println!("\n{:<20} {:>12}", "Trait", "Correlation");
    println!("{:-<33}", "");
    for (t, name) in TRAIT_COLUMNS.iter().enumerate() {
        println!("{:<20} {:>12.4}", pretty_trait(name), correlations[t]);
    }
}

/// Group means, rounded to 3 decimal places for display.
pub fn print_group_means(means: &GroupMeans) {
    print!("{:<12}", "");
    for name in TRAIT_COLUMNS {
        print!(" {:>14}", pretty_trait(name));
    }
    println!();
    for (c, category) in means.categories.iter().enumerate() {
        print!("{:<12}", category);
        for t in 0..TRAIT_COLUMNS.len() {
            print!(" {:>14.3}", means.means[[c, t]]);
        }
        println!();
    }
}

/// Kruskal-Wallis results, rounded to 4 decimal places; failed traits keep
/// their own error line so partial results stay attributable.
pub fn print_kruskal(results: &[(String, KruskalOutcome<KruskalResult>)]) {
    println!("{:<20} {:>14} {:>12}", "Trait", "H-statistic", "p-value");
    println!("{:-<48}", "");
    for (name, outcome) in results {
        match outcome {
            Ok(result) => println!(
                "{:<20} {:>14.4} {:>12.4}",
                pretty_trait(name),
                result.h_statistic,
                result.p_value
            ),
            Err(err) => println!("{:<20} test failed: {}", pretty_trait(name), err),
        }
    }
}

/// Render the full OLS summary as a fixed-width text block.
pub fn regression_summary(fit: &OlsSummary) -> String {
    let mut out = String::new();
    out.push_str("OLS Regression: total_assets_gbp ~ ");
    out.push_str(&TRAIT_COLUMNS.join(" + "));
    out.push_str("\n\n");
    out.push_str(&format!(
        "Observations: {} (excluded for missing values: {})\n",
        fit.observations, fit.excluded
    ));
    out.push_str(&format!(
        "R-squared: {:.4}    Adj. R-squared: {:.4}\n",
        fit.r_squared, fit.adj_r_squared
    ));
    out.push_str(&format!(
        "F-statistic: {:.4}    Prob (F): {:.4}\n\n",
        fit.f_statistic, fit.f_pvalue
    ));
    out.push_str(&format!(
        "{:<16} {:>12} {:>12} {:>10} {:>10}\n",
        "Term", "Coefficient", "Std. Error", "t", "P>|t|"
    ));
    out.push_str(&format!("{:-<64}\n", ""));
    for j in 0..fit.terms.len() {
        out.push_str(&format!(
            "{:<16} {:>12.4} {:>12.4} {:>10.3} {:>10.4}\n",
            fit.terms[j], fit.coefficients[j], fit.std_errors[j], fit.t_values[j], fit.p_values[j]
        ));
    }
    out
}

/// Write the regression summary to the report path, overwriting any
/// previous run's report. Failures come back as plain I/O errors so the
/// caller can log them and carry on with the rest of the report.
pub fn write_regression_report(fit: &OlsSummary, path: impl AsRef<Path>) -> std::io::Result<()> {
    fs::write(path, regression_summary(fit))
}
