//! Churn probability charts rendered to SVG with Plotters

use crate::types::assessment::{ModelScore, RiskThresholds};
use anyhow::Context;
use plotters::prelude::*;
use std::f64::consts::PI;
use std::path::Path;
use tracing::info;

const LOW_RISK_COLOR: RGBColor = RGBColor(76, 175, 80);
const MODERATE_RISK_COLOR: RGBColor = RGBColor(255, 193, 7);
const HIGH_RISK_COLOR: RGBColor = RGBColor(244, 67, 54);

/// Gauge ring radii in chart units
const OUTER_RADIUS: f64 = 1.0;
const INNER_RADIUS: f64 = 0.65;
/// Points per band edge
const ARC_STEPS: usize = 48;

/// Band color for a probability
pub fn risk_color(probability: f64, thresholds: &RiskThresholds) -> RGBColor {
    if probability < thresholds.low {
        LOW_RISK_COLOR
    } else if probability < thresholds.high {
        MODERATE_RISK_COLOR
    } else {
        HIGH_RISK_COLOR
    }
}

/// Point on a half-circle gauge: 0.0 is far left, 1.0 is far right.
fn gauge_point(fraction: f64, radius: f64) -> (f64, f64) {
    let angle = PI * (1.0 - fraction.clamp(0.0, 1.0));
    (radius * angle.cos(), radius * angle.sin())
}

/// Closed ring-segment outline between two probabilities.
fn band_polygon(from: f64, to: f64) -> Vec<(f64, f64)> {
    let mut points = Vec::with_capacity(2 * (ARC_STEPS + 1));
    for step in 0..=ARC_STEPS {
        let t = from + (to - from) * step as f64 / ARC_STEPS as f64;
        points.push(gauge_point(t, OUTER_RADIUS));
    }
    for step in (0..=ARC_STEPS).rev() {
        let t = from + (to - from) * step as f64 / ARC_STEPS as f64;
        points.push(gauge_point(t, INNER_RADIUS));
    }
    points
}

fn ensure_parent(path: &Path) -> crate::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create chart directory {}", parent.display()))?;
        }
    }
    Ok(())
}

/// Half-ring gauge with low / moderate / high bands and a needle at `probability`.
pub fn create_gauge_chart(
    probability: f64,
    thresholds: &RiskThresholds,
    output_path: &Path,
) -> crate::Result<()> {
    ensure_parent(output_path)?;

    let root = SVGBackend::new(output_path, (500, 340)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Churn Probability", ("sans-serif", 26))
        .margin(10)
        .build_cartesian_2d(-1.2f64..1.2f64, -0.3f64..1.1f64)?;

    let bands = [
        (0.0, thresholds.low, LOW_RISK_COLOR),
        (thresholds.low, thresholds.high, MODERATE_RISK_COLOR),
        (thresholds.high, 1.0, HIGH_RISK_COLOR),
    ];
    for (from, to, color) in bands {
        chart.draw_series(std::iter::once(Polygon::new(
            band_polygon(from, to),
            color.mix(0.85).filled(),
        )))?;
    }

    let tip = gauge_point(probability, OUTER_RADIUS + 0.05);
    chart.draw_series(std::iter::once(PathElement::new(
        vec![(0.0, 0.0), tip],
        BLACK.stroke_width(3),
    )))?;
    chart.draw_series(std::iter::once(Circle::new((0.0, 0.0), 6, BLACK.filled())))?;

    let color = risk_color(probability, thresholds);
    chart.draw_series(std::iter::once(Text::new(
        format!("{:.2}%", probability * 100.0),
        (-0.28, -0.1),
        ("sans-serif", 32).into_font().color(&color),
    )))?;

    root.present()?;
    info!(path = %output_path.display(), "Gauge chart written");

    Ok(())
}

/// One horizontal bar per model, labelled with its probability.
pub fn create_model_probability_chart(
    scores: &[ModelScore],
    output_path: &Path,
) -> crate::Result<()> {
    anyhow::ensure!(!scores.is_empty(), "No model scores to chart");
    ensure_parent(output_path)?;

    let rows = scores.len() as f64;
    let root = SVGBackend::new(output_path, (600, 120 + 60 * scores.len() as u32)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Churn Probability by Model", ("sans-serif", 24))
        .margin(15)
        .x_label_area_size(35)
        .build_cartesian_2d(0f64..1f64, 0f64..rows)?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .disable_y_axis()
        .x_desc("Probability")
        .x_label_formatter(&|x| format!("{:.0}%", x * 100.0))
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    // First model at the top
    for (i, score) in scores.iter().enumerate() {
        let row = rows - 1.0 - i as f64;
        chart.draw_series(std::iter::once(Rectangle::new(
            [(0.0, row + 0.2), (score.probability.clamp(0.0, 1.0), row + 0.8)],
            BLUE.mix(0.6).filled(),
        )))?;
        chart.draw_series(std::iter::once(Text::new(
            format!("{} ({:.2}%)", score.model, score.probability * 100.0),
            (0.02, row + 0.62),
            ("sans-serif", 16),
        )))?;
    }

    root.present()?;
    info!(path = %output_path.display(), models = scores.len(), "Model probability chart written");

    Ok(())
}
