use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

pub const DEFAULT_BANDWIDTH: f64 = 1.0;
pub const DEFAULT_SAMPLES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViolinOptions {
    pub bandwidth: f64,
    pub samples: usize,
}

impl Default for ViolinOptions {
    fn default() -> Self {
        Self {
            bandwidth: DEFAULT_BANDWIDTH,
            samples: DEFAULT_SAMPLES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DensityPoint {
    pub x: f64,
    pub density: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViolinPlot {
    pub bandwidth: f64,
    pub min: f64,
    pub max: f64,
    pub density: Vec<DensityPoint>,
}

impl ViolinPlot {
    pub fn peak(&self) -> f64 {
        self.density.iter().map(|p| p.density).fold(0.0, f64::max)
    }
}

/// Gaussian kernel density estimate sampled evenly over the range of
/// `values`. A single repeated value is widened by three bandwidths each side.
pub fn violin_plot(values: &[f64], options: &ViolinOptions) -> Option<ViolinPlot> {
    let data: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if data.is_empty() {
        return None;
    }

    let bandwidth = if options.bandwidth.is_finite() && options.bandwidth > 0.0 {
        options.bandwidth
    } else {
        DEFAULT_BANDWIDTH
    };
    let samples = options.samples.max(2);

    let mut min = data.iter().copied().fold(f64::INFINITY, f64::min);
    let mut max = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max - min <= 0.0 {
        min -= 3.0 * bandwidth;
        max += 3.0 * bandwidth;
    }

    let step = (max - min) / (samples - 1) as f64;
    let density = (0..samples)
        .map(|i| {
            let x = min + step * i as f64;
            DensityPoint {
                x,
                density: kde(&data, x, bandwidth),
            }
        })
        .collect();

    Some(ViolinPlot {
        bandwidth,
        min,
        max,
        density,
    })
}

fn kde(data: &[f64], x: f64, bandwidth: f64) -> f64 {
    let norm = 1.0 / (data.len() as f64 * bandwidth * (2.0 * PI).sqrt());
    let sum: f64 = data
        .iter()
        .map(|xi| {
            let u = (x - xi) / bandwidth;
            (-0.5 * u * u).exp()
        })
        .sum();
    norm * sum
}
