//! Scatter-plot description of a dataset, independent of any drawing library.
//! The browser page hands this to Plotly; `svg` draws it with plotters.

pub mod svg;

use serde::Serialize;

use crate::data::Dataset;

pub const PLOT_TITLE: &str = "Material Capacity";
pub const X_AXIS_LABEL: &str = "Material Index (sorted by capacity)";
pub const Y_AXIS_LABEL: &str = "Capacity (mmol/g)";
pub const PLOT_HEIGHT: u32 = 600;
pub const HOVER_TEMPLATE: &str = "<b>%{customdata[0]}</b><br>Capacity: %{y}<extra></extra>";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotPoint {
    /// Position in the sorted dataset.
    pub x: usize,
    /// `None` for a record without a capacity value.
    pub y: Option<f64>,
    /// Carried as point metadata (`customdata`), never as an axis.
    pub material: String,
}

impl PlotPoint {
    /// Hover label with the template resolved for this point.
    pub fn hover_text(&self) -> String {
        let capacity = self
            .y
            .map(|y| y.to_string())
            .unwrap_or_else(|| "n/a".to_string());
        format!("<b>{}</b><br>Capacity: {capacity}", self.material)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotSpec {
    pub title: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub height: u32,
    pub hover_template: &'static str,
    pub points: Vec<PlotPoint>,
}

impl PlotSpec {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// One point per record, in dataset order. An empty dataset gives an empty plot.
pub fn build_plot(dataset: &Dataset) -> PlotSpec {
    let points = dataset
        .records()
        .iter()
        .enumerate()
        .map(|(x, record)| PlotPoint {
            x,
            y: record.capacity(),
            material: record.material(),
        })
        .collect();

    PlotSpec {
        title: PLOT_TITLE,
        x_label: X_AXIS_LABEL,
        y_label: Y_AXIS_LABEL,
        height: PLOT_HEIGHT,
        hover_template: HOVER_TEMPLATE,
        points,
    }
}
