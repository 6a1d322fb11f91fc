pub mod boxplot;
pub mod heatmap;
pub mod sparkline;
pub mod violin;

pub use boxplot::{box_plot, BoxPlot};
pub use heatmap::{build_heatmap, HeatCell, Heatmap, HeatmapOptions};
pub use sparkline::Sparkline;
pub use violin::{violin_plot, DensityPoint, ViolinOptions, ViolinPlot};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartDatum {
    Heatmap(Heatmap),
    Sparkline(Sparkline),
    BoxPlot(BoxPlot),
    ViolinPlot(ViolinPlot),
}

impl ChartDatum {
    pub fn name(&self) -> &'static str {
        match self {
            ChartDatum::Heatmap(_) => "heatmap",
            ChartDatum::Sparkline(_) => "sparkline",
            ChartDatum::BoxPlot(_) => "box_plot",
            ChartDatum::ViolinPlot(_) => "violin_plot",
        }
    }
}
