use approx::assert_abs_diff_eq;
use asset_insights::analysis::aggregate::{self, EntityTotal};
use asset_insights::analysis::kruskal::{self, KruskalError};
use asset_insights::analysis::pipeline::JoinedRow;
use asset_insights::analysis::regression::{self, RegressionError};
use asset_insights::data::TRAIT_COLUMNS;

fn entity(id: &str, total: f64, traits: [Option<f64>; 5]) -> EntityTotal {
    EntityTotal {
        id: id.to_string(),
        total,
        traits,
    }
}

fn gbp_row(id: &str, allocation: &str, value: f64, traits: [Option<f64>; 5]) -> JoinedRow {
    JoinedRow {
        id: id.to_string(),
        asset_currency: "GBP".to_string(),
        asset_allocation: allocation.to_string(),
        asset_value: value,
        traits,
    }
}

#[test]
fn test_correlation_undefined_with_single_entity() {
    let totals = vec![entity("only", 100.0, [Some(0.5); 5])];
    let correlations = aggregate::trait_correlations(&totals);

    assert_eq!(correlations.len(), TRAIT_COLUMNS.len());
    assert!(correlations.iter().all(|r| r.is_nan()));
}

#[test]
fn test_correlation_known_value() {
    // Totals equal the confidence score scaled by 10: perfect correlation
    // on trait 0, undefined on the constant trait 2.
    let totals = vec![
        entity("a", 10.0, [Some(1.0), Some(0.9), Some(0.5), None, Some(0.1)]),
        entity("b", 20.0, [Some(2.0), Some(0.1), Some(0.5), None, Some(0.9)]),
        entity("c", 30.0, [Some(3.0), Some(0.5), Some(0.5), None, Some(0.4)]),
    ];
    let correlations = aggregate::trait_correlations(&totals);

    assert_abs_diff_eq!(correlations[0], 1.0, epsilon = 1e-12);
    assert!(correlations[2].is_nan()); // zero variance
    assert!(correlations[3].is_nan()); // no pairs at all
}

#[test]
fn test_correlation_pairwise_deletion() {
    // Entity "b" misses trait 0 only; the trait-0 correlation uses the
    // remaining pairs while trait 1 still sees all three entities.
    let totals = vec![
        entity("a", 10.0, [Some(1.0), Some(1.0), None, None, None]),
        entity("b", 20.0, [None, Some(2.0), None, None, None]),
        entity("c", 30.0, [Some(3.0), Some(3.0), None, None, None]),
    ];
    let correlations = aggregate::trait_correlations(&totals);

    assert_abs_diff_eq!(correlations[0], 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(correlations[1], 1.0, epsilon = 1e-12);
}

#[test]
fn test_group_means_scenario() {
    let rows = vec![
        gbp_row("a", "equity", 10.0, [Some(0.2), None, None, None, None]),
        gbp_row("b", "equity", 20.0, [Some(0.8), Some(0.4), None, None, None]),
        gbp_row("c", "bond", 30.0, [Some(0.6), None, None, None, None]),
    ];
    let means = aggregate::group_means(&rows);

    assert_eq!(means.categories, vec!["equity".to_string(), "bond".to_string()]);
    // equity confidence: mean(0.2, 0.8) = 0.5
    assert_abs_diff_eq!(means.means[[0, 0]], 0.5, epsilon = 1e-12);
    // equity risk_tolerance: only one non-null observation
    assert_abs_diff_eq!(means.means[[0, 1]], 0.4, epsilon = 1e-12);
    // bond composure: no observations at all
    assert!(means.means[[1, 2]].is_nan());
}

#[test]
fn test_kruskal_single_category_fails_for_every_trait() {
    let rows = vec![
        gbp_row("a", "equity", 10.0, [Some(0.1); 5]),
        gbp_row("b", "equity", 20.0, [Some(0.9); 5]),
    ];
    let results = kruskal::by_allocation(&rows);

    assert_eq!(results.len(), TRAIT_COLUMNS.len());
    for (_, outcome) in results {
        assert!(matches!(outcome, Err(KruskalError::InsufficientGroups(1))));
    }
}

#[test]
fn test_kruskal_two_categories_produces_results() {
    let rows = vec![
        gbp_row("a", "equity", 10.0, [Some(0.1); 5]),
        gbp_row("b", "equity", 20.0, [Some(0.2); 5]),
        gbp_row("c", "bond", 30.0, [Some(0.8); 5]),
        gbp_row("d", "bond", 40.0, [Some(0.9); 5]),
    ];
    let results = kruskal::by_allocation(&rows);

    for (name, outcome) in results {
        let result = outcome.unwrap_or_else(|e| panic!("{} failed: {}", name, e));
        assert!(result.h_statistic > 0.0);
        assert!(result.p_value > 0.0 && result.p_value < 1.0);
    }
}

fn regression_fixture() -> Vec<EntityTotal> {
    let traits: [[f64; 5]; 10] = [
        [0.1, 0.5, 0.9, 0.2, 0.3],
        [0.4, 0.1, 0.2, 0.8, 0.6],
        [0.7, 0.9, 0.5, 0.5, 0.1],
        [0.2, 0.3, 0.8, 0.9, 0.9],
        [0.9, 0.7, 0.1, 0.3, 0.5],
        [0.5, 0.2, 0.6, 0.1, 0.8],
        [0.3, 0.8, 0.4, 0.7, 0.2],
        [0.8, 0.4, 0.7, 0.6, 0.4],
        [0.6, 0.6, 0.3, 0.4, 0.7],
        [0.25, 0.75, 0.55, 0.15, 0.95],
    ];

    traits
        .iter()
        .enumerate()
        .map(|(i, t)| {
            // total = 3 + 2*confidence - risk + 0.5*composure + 1.5*impact
            let total = 3.0 + 2.0 * t[0] - t[1] + 0.5 * t[2] + 1.5 * t[4];
            entity(
                &format!("e{}", i),
                total,
                [Some(t[0]), Some(t[1]), Some(t[2]), Some(t[3]), Some(t[4])],
            )
        })
        .collect()
}

#[test]
fn test_regression_recovers_noiseless_coefficients() {
    let fit = regression::fit(&regression_fixture()).expect("fit");

    assert_eq!(fit.observations, 10);
    assert_eq!(fit.excluded, 0);
    assert_abs_diff_eq!(fit.coefficients[0], 3.0, epsilon = 1e-8); // intercept
    assert_abs_diff_eq!(fit.coefficients[1], 2.0, epsilon = 1e-8);
    assert_abs_diff_eq!(fit.coefficients[2], -1.0, epsilon = 1e-8);
    assert_abs_diff_eq!(fit.coefficients[3], 0.5, epsilon = 1e-8);
    assert_abs_diff_eq!(fit.coefficients[4], 0.0, epsilon = 1e-8);
    assert_abs_diff_eq!(fit.coefficients[5], 1.5, epsilon = 1e-8);
    assert_abs_diff_eq!(fit.r_squared, 1.0, epsilon = 1e-8);
}

#[test]
fn test_regression_listwise_deletion() {
    let mut totals = regression_fixture();
    totals[3].traits[2] = None;
    totals[7].traits[4] = None;

    let fit = regression::fit(&totals).expect("fit");

    assert_eq!(fit.observations, 8);
    assert_eq!(fit.excluded, 2);
}

#[test]
fn test_regression_rejects_collinear_design() {
    // Composure duplicates confidence exactly, so the design matrix loses
    // rank and the coefficients are not identifiable.
    let totals: Vec<EntityTotal> = regression_fixture()
        .into_iter()
        .map(|mut e| {
            e.traits[2] = e.traits[0];
            e
        })
        .collect();

    assert!(matches!(
        regression::fit(&totals),
        Err(RegressionError::SingularDesign)
    ));
}

#[test]
fn test_regression_insufficient_observations() {
    let totals: Vec<EntityTotal> = regression_fixture().into_iter().take(6).collect();
    assert!(matches!(
        regression::fit(&totals),
        Err(RegressionError::InsufficientObservations {
            observations: 6,
            parameters: 6,
        })
    ));
}
