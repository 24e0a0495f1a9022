//! Chart rendering. Each function is a pure view over a prepared table,
//! writing one PNG artifact; nothing here feeds back into the pipeline.

use crate::analysis::aggregate::GroupMeans;
use crate::data::TRAIT_COLUMNS;
use crate::report::pretty_trait;
use ndarray::Array1;
use plotters::prelude::*;
use std::path::Path;
use tracing::warn;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Bar chart of row counts per allocation category, largest first.
pub fn allocation_count_chart(counts: &[(String, usize)], path: &Path) -> Result<()> {
    let max = match counts.iter().map(|(_, c)| *c).max() {
        Some(max) => max as i32,
        None => {
            warn!("no GBP rows; skipping count chart");
            return Ok(());
        }
    };

    let root = BitMapBackend::new(path, (800, 500)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("GBP Asset Type Distribution", ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(45)
        .y_label_area_size(50)
        .build_cartesian_2d((0..counts.len() as i32).into_segmented(), 0..max + 1)?;

    chart
        .configure_mesh()
        .x_desc("Asset Type")
        .y_desc("Count")
        .x_label_formatter(&|x| match x {
            SegmentValue::CenterOf(i) => counts
                .get(*i as usize)
                .map(|(name, _)| name.clone())
                .unwrap_or_default(),
            _ => String::new(),
        })
        .draw()?;

    chart.draw_series(
        Histogram::vertical(&chart)
            .style(BLUE.filled())
            .margin(15)
            .data(
                counts
                    .iter()
                    .enumerate()
                    .map(|(i, (_, c))| (i as i32, *c as i32)),
            ),
    )?;
    root.present()?;
    Ok(())
}

/// Quartile box plot of asset values per allocation category.
pub fn value_box_plot(groups: &[(String, Vec<f64>)], path: &Path) -> Result<()> {
    let values: Vec<f64> = groups.iter().flat_map(|(_, v)| v.iter().copied()).collect();
    let (Some(min), Some(max)) = (
        values.iter().copied().reduce(f64::min),
        values.iter().copied().reduce(f64::max),
    ) else {
        warn!("no GBP rows; skipping box plot");
        return Ok(());
    };
    let pad = (max - min).max(1.0) * 0.1;

    let root = BitMapBackend::new(path, (800, 500)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("GBP Asset Value Distribution", ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(
            (0..groups.len() as i32).into_segmented(),
            (min - pad) as f32..(max + pad) as f32,
        )?;

    chart
        .configure_mesh()
        .x_desc("Asset Type")
        .y_desc("Asset Value")
        .x_label_formatter(&|x| match x {
            SegmentValue::CenterOf(i) => groups
                .get(*i as usize)
                .map(|(name, _)| name.clone())
                .unwrap_or_default(),
            _ => String::new(),
        })
        .draw()?;

    chart.draw_series(groups.iter().enumerate().map(|(i, (_, group))| {
        Boxplot::new_vertical(
            SegmentValue::CenterOf(i as i32),
            &Quartiles::new(group),
        )
    }))?;
    root.present()?;
    Ok(())
}

/// Histogram of GBP asset values over 15 equal-width bins.
pub fn value_histogram(values: &[f64], path: &Path) -> Result<()> {
    const BINS: usize = 15;
    let (Some(min), Some(max)) = (
        values.iter().copied().reduce(f64::min),
        values.iter().copied().reduce(f64::max),
    ) else {
        warn!("no GBP rows; skipping histogram");
        return Ok(());
    };
    if min == max {
        warn!("all asset values identical; skipping histogram");
        return Ok(());
    }

    let width = (max - min) / BINS as f64;
    let mut counts = [0i32; BINS];
    for &value in values {
        let bin = (((value - min) / width) as usize).min(BINS - 1);
        counts[bin] += 1;
    }
    let tallest = counts.iter().copied().max().unwrap_or(0);

    let root = BitMapBackend::new(path, (800, 500)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("GBP Asset Value Histogram", ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(45)
        .y_label_area_size(50)
        .build_cartesian_2d(min..max, 0..tallest + 1)?;

    chart
        .configure_mesh()
        .x_desc("Asset Value (GBP)")
        .y_desc("Count")
        .draw()?;

    chart.draw_series(counts.iter().enumerate().map(|(bin, &count)| {
        let lo = min + bin as f64 * width;
        Rectangle::new([(lo, 0), (lo + width, count)], BLUE.filled())
    }))?;
    root.present()?;
    Ok(())
}

/// One bar per trait showing its correlation with total GBP holdings, with
/// a zero reference line. NaN correlations are drawn as absent bars.
pub fn correlation_bars(correlations: &Array1<f64>, path: &Path) -> Result<()> {
    let finite: Vec<f64> = correlations.iter().copied().filter(|v| v.is_finite()).collect();
    let lo = finite.iter().copied().reduce(f64::min).unwrap_or(0.0).min(0.0) - 0.05;
    let hi = finite.iter().copied().reduce(f64::max).unwrap_or(0.0).max(0.0) + 0.05;

    let root = BitMapBackend::new(path, (900, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Correlation: GBP Asset Value vs Personality Traits",
            ("sans-serif", 28),
        )
        .margin(10)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d((0..TRAIT_COLUMNS.len() as i32).into_segmented(), lo..hi)?;

    chart
        .configure_mesh()
        .x_desc("Personality Trait")
        .y_desc("Correlation Coefficient")
        .x_label_formatter(&|x| match x {
            SegmentValue::CenterOf(i) => TRAIT_COLUMNS
                .get(*i as usize)
                .map(|name| pretty_trait(name))
                .unwrap_or_default(),
            _ => String::new(),
        })
        .draw()?;

    chart.draw_series(
        correlations
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_finite())
            .map(|(i, &v)| {
                let mut bar = Rectangle::new(
                    [
                        (SegmentValue::Exact(i as i32), 0.0),
                        (SegmentValue::Exact(i as i32 + 1), v),
                    ],
                    BLUE.filled(),
                );
                bar.set_margin(0, 0, 12, 12);
                bar
            }),
    )?;

    // Zero reference line
    chart.draw_series(LineSeries::new(
        vec![
            (SegmentValue::Exact(0), 0.0),
            (SegmentValue::Exact(TRAIT_COLUMNS.len() as i32), 0.0),
        ],
        BLACK.stroke_width(1),
    ))?;
    root.present()?;
    Ok(())
}

/// Blue-through-red diverging scale centered on the survey midpoint.
fn cell_color(value: f64, lo: f64, hi: f64, center: f64) -> RGBColor {
    let blend = |from: (u8, u8, u8), to: (u8, u8, u8), frac: f64| {
        let f = frac.clamp(0.0, 1.0);
        RGBColor(
            (from.0 as f64 + (to.0 as f64 - from.0 as f64) * f) as u8,
            (from.1 as f64 + (to.1 as f64 - from.1 as f64) * f) as u8,
            (from.2 as f64 + (to.2 as f64 - from.2 as f64) * f) as u8,
        )
    };
    let cool = (59, 76, 192);
    let warm = (180, 4, 38);
    let white = (255, 255, 255);
    if value <= center {
        let span = (center - lo).max(f64::MIN_POSITIVE);
        blend(cool, white, (value - lo) / span)
    } else {
        let span = (hi - center).max(f64::MIN_POSITIVE);
        blend(white, warm, (value - center) / span)
    }
}

/// Heatmap of mean trait scores per allocation category, annotated with the
/// 3-decimal cell values.
pub fn group_means_heatmap(means: &GroupMeans, path: &Path) -> Result<()> {
    let n_cats = means.categories.len();
    if n_cats == 0 {
        warn!("no allocation categories; skipping heatmap");
        return Ok(());
    }
    let n_traits = TRAIT_COLUMNS.len();

    let finite: Vec<f64> = means.means.iter().copied().filter(|v| v.is_finite()).collect();
    let lo = finite.iter().copied().reduce(f64::min).unwrap_or(0.0);
    let hi = finite.iter().copied().reduce(f64::max).unwrap_or(1.0);

    let root = BitMapBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Personality Trait x Asset Allocation Heatmap",
            ("sans-serif", 28),
        )
        .margin(10)
        .x_label_area_size(45)
        .y_label_area_size(90)
        .build_cartesian_2d(
            (0..n_traits as i32).into_segmented(),
            (0..n_cats as i32).into_segmented(),
        )?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_desc("Personality Trait")
        .y_desc("Asset Type")
        .x_label_formatter(&|x| match x {
            SegmentValue::CenterOf(i) => TRAIT_COLUMNS
                .get(*i as usize)
                .map(|name| pretty_trait(name))
                .unwrap_or_default(),
            _ => String::new(),
        })
        .y_label_formatter(&|y| match y {
            SegmentValue::CenterOf(i) => means
                .categories
                .get(*i as usize)
                .cloned()
                .unwrap_or_default(),
            _ => String::new(),
        })
        .draw()?;

    for c in 0..n_cats {
        for t in 0..n_traits {
            let value = means.means[[c, t]];
            let color = if value.is_finite() {
                cell_color(value, lo, hi, 0.5)
            } else {
                RGBColor(220, 220, 220)
            };
            chart.draw_series(std::iter::once(Rectangle::new(
                [
                    (SegmentValue::Exact(t as i32), SegmentValue::Exact(c as i32)),
                    (
                        SegmentValue::Exact(t as i32 + 1),
                        SegmentValue::Exact(c as i32 + 1),
                    ),
                ],
                color.filled(),
            )))?;
            if value.is_finite() {
                chart.draw_series(std::iter::once(Text::new(
                    format!("{:.3}", value),
                    (
                        SegmentValue::CenterOf(t as i32),
                        SegmentValue::CenterOf(c as i32),
                    ),
                    ("sans-serif", 16).into_font().color(&BLACK),
                )))?;
            }
        }
    }
    root.present()?;
    Ok(())
}
