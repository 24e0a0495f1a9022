use asset_insights::analysis::{aggregate, kruskal, pipeline::AnalysisFrame, regression};
use asset_insights::config::{self, Config};
use asset_insights::data::loader::DataLoader;
use asset_insights::{plot, report};
use std::env;
use std::fs;
use tracing::error;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(config::log_filter(env::var("RUST_LOG").ok().as_deref()))
        .init();

    let config_path = env::args()
        .nth(1)
        .unwrap_or_else(|| "config/analysis.yaml".to_string());
    let config = Config::load(&config_path)?;

    println!("Loading assets from: {}", config.assets_csv.display());
    let assets = DataLoader::load_assets(&config.assets_csv)?;
    println!(
        "Loading personality records from: {}",
        config.personality_csv.display()
    );
    let personality = DataLoader::load_personality(&config.personality_csv)?;

    let frame = AnalysisFrame::build(&assets, &personality);
    println!(
        "\n{} GBP rows across {} asset rows and {} personality records",
        frame.gbp.len(),
        assets.len(),
        personality.len()
    );

    fs::create_dir_all(&config.charts_dir)?;

    // --- Largest GBP asset holder ---
    println!("\n=== Largest GBP Asset Holder ===");
    match aggregate::top_holder(&frame) {
        Ok(top) => report::print_top_holder(&top),
        Err(err) => error!("top-holder query failed: {}", err),
    }

    // --- Distribution charts ---
    let counts = aggregate::allocation_counts(&frame.gbp);
    if let Err(err) =
        plot::allocation_count_chart(&counts, &config.charts_dir.join("asset_type_counts.png"))
    {
        error!("count chart failed: {}", err);
    }

    let value_groups = aggregate::values_by_allocation(&frame.gbp);
    if let Err(err) =
        plot::value_box_plot(&value_groups, &config.charts_dir.join("asset_value_boxplot.png"))
    {
        error!("box plot failed: {}", err);
    }

    let values: Vec<f64> = frame.gbp.iter().map(|row| row.asset_value).collect();
    if let Err(err) =
        plot::value_histogram(&values, &config.charts_dir.join("asset_value_histogram.png"))
    {
        error!("histogram failed: {}", err);
    }

    // --- Correlation with personality traits ---
    println!("\n=== Correlation: Total GBP Assets vs Traits ===");
    let totals = aggregate::entity_totals(&frame);
    let correlations = aggregate::trait_correlations(&totals);
    report::print_correlations(&correlations);
    if let Err(err) =
        plot::correlation_bars(&correlations, &config.charts_dir.join("trait_correlations.png"))
    {
        error!("correlation chart failed: {}", err);
    }

    // --- Linear regression ---
    println!("\n=== OLS Regression ===");
    match regression::fit(&totals) {
        Ok(fit) => {
            print!("{}", report::regression_summary(&fit));
            match report::write_regression_report(&fit, &config.regression_report) {
                Ok(()) => println!(
                    "\nRegression summary written to {}",
                    config.regression_report.display()
                ),
                Err(err) => error!("failed to write regression report: {}", err),
            }
        }
        Err(err) => error!("regression failed: {}", err),
    }

    // --- Mean trait scores by asset type ---
    println!("\n=== Mean Trait Scores by Asset Type ===");
    let means = aggregate::group_means(&frame.gbp);
    report::print_group_means(&means);

    // --- Kruskal-Wallis tests ---
    println!("\n=== Kruskal-Wallis Tests by Asset Type ===");
    let kruskal_results = kruskal::by_allocation(&frame.gbp);
    report::print_kruskal(&kruskal_results);

    // --- Heatmap ---
    if let Err(err) =
        plot::group_means_heatmap(&means, &config.charts_dir.join("trait_means_heatmap.png"))
    {
        error!("heatmap failed: {}", err);
    }

    Ok(())
}
