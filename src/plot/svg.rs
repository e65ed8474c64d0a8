use std::fmt;

use plotters::prelude::*;

use crate::plot::PlotSpec;

pub const DEFAULT_WIDTH: u32 = 1000;

#[derive(Debug)]
pub struct RenderError(String);

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to render plot: {}", self.0)
    }
}

impl std::error::Error for RenderError {}

fn render_err(err: impl fmt::Display) -> RenderError {
    RenderError(err.to_string())
}

/// Axis bounds padded by 5% so edge points are not clipped. Falls back to a unit box.
fn axis_bounds(spec: &PlotSpec) -> ((f64, f64), (f64, f64)) {
    let x_max = spec.points.len().saturating_sub(1).max(1) as f64;
    let known: Vec<f64> = spec.points.iter().filter_map(|p| p.y).collect();
    let (lo, hi) = match known.first() {
        Some(&first) => known
            .iter()
            .fold((first, first), |(lo, hi), &y| (lo.min(y), hi.max(y))),
        None => (0.0, 1.0),
    };
    let pad = ((hi - lo) * 0.05).max(0.05);
    ((-0.5, x_max + 0.5), (lo - pad, hi + pad))
}

/// Draw the scatter plot into an SVG document.
pub fn render_svg(spec: &PlotSpec, width: u32, height: u32) -> Result<String, RenderError> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let ((x_lo, x_hi), (y_lo, y_hi)) = axis_bounds(spec);
        let mut chart = ChartBuilder::on(&root)
            .caption(spec.title, ("sans-serif", 24))
            .margin(20)
            .set_label_area_size(LabelAreaPosition::Left, 60)
            .set_label_area_size(LabelAreaPosition::Bottom, 45)
            .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .x_desc(spec.x_label)
            .y_desc(spec.y_label)
            .x_label_formatter(&|v| format!("{v:.0}"))
            .draw()
            .map_err(render_err)?;

        chart
            .draw_series(spec.points.iter().filter_map(|point| {
                point
                    .y
                    .map(|y| Circle::new((point.x as f64, y), 4, RGBColor(99, 110, 250).filled()))
            }))
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
    }
    Ok(svg)
}
