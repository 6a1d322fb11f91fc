use serde::{Deserialize, Serialize};

pub const GLYPHS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sparkline {
    pub values: Vec<f64>,
    pub levels: Vec<u8>,
}

impl Sparkline {
    pub fn from_values(values: Vec<f64>) -> Self {
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let levels = values.iter().map(|&v| level(v, min, max)).collect();
        Self { values, levels }
    }

    pub fn glyphs(&self) -> String {
        self.levels
            .iter()
            .map(|&l| GLYPHS[(l as usize).min(GLYPHS.len() - 1)])
            .collect()
    }
}

/// Linear position of `value` between `min` and `max`. A flat series sits
/// on the middle glyph.
pub fn level(value: f64, min: f64, max: f64) -> u8 {
    let top = (GLYPHS.len() - 1) as f64;
    let span = max - min;
    if !span.is_finite() || span <= 0.0 {
        return (GLYPHS.len() as u8 - 1) / 2;
    }
    ((value - min) / span * top).round().clamp(0.0, top) as u8
}
