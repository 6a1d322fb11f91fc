use crate::aggregate::churn::DEFAULT_TOP;
use crate::encode::{HeatmapOptions, ViolinOptions};
use crate::error::{GitCountError, Result};
use console::Style;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone)]
pub struct Palette {
    pub title: Style,
    pub date: Style,
    pub number: Style,
    pub bar: Style,
    pub alert: Style,
    pub added: Style,
    pub removed: Style,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            date: Style::new().green(),
            number: Style::new().yellow(),
            bar: Style::new().blue(),
            alert: Style::new().red(),
            added: Style::new().green(),
            removed: Style::new().red(),
        }
    }
}

impl Palette {
    pub fn plain() -> Self {
        Self {
            title: Style::new(),
            date: Style::new(),
            number: Style::new(),
            bar: Style::new(),
            alert: Style::new(),
            added: Style::new(),
            removed: Style::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayOptions {
    pub emoji: bool,
    pub color: bool,
    pub bar_char: char,
    pub max_width: Option<usize>,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            emoji: false,
            color: true,
            bar_char: '█',
            max_width: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    pub heatmap: HeatmapOptions,
    pub violin: ViolinOptions,
    pub churn_top: usize,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            heatmap: HeatmapOptions::default(),
            violin: ViolinOptions::default(),
            churn_top: DEFAULT_TOP,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub palette: Palette,
    pub display: DisplayOptions,
    pub charts: ChartOptions,
}

#[derive(Debug, Default, Deserialize)]
struct ColorsSection {
    title: Option<String>,
    date: Option<String>,
    number: Option<String>,
    bar: Option<String>,
    alert: Option<String>,
    added: Option<String>,
    removed: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DisplaySection {
    emoji: Option<bool>,
    color: Option<bool>,
    bar_char: Option<char>,
    max_width: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartsSection {
    heatmap_levels: Option<u8>,
    heatmap_thresholds: Option<Vec<u32>>,
    violin_bandwidth: Option<f64>,
    violin_samples: Option<usize>,
    churn_top: Option<usize>,
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("git-count").join(CONFIG_FILE))
    }

    /// Loads from `path`, or the default location when `None`. Never fails.
    pub fn load(path: Option<&Path>) -> Self {
        let explicit = path.is_some();
        let Some(path) = path.map(Path::to_path_buf).or_else(Self::default_path) else {
            return Self::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(text) => {
                debug!(path = %path.display(), "loading config");
                Self::from_toml_str(&text)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !explicit => Self::default(),
            Err(e) => {
                warn!(path = %path.display(), "cannot read config, using defaults: {e}");
                Self::default()
            }
        }
    }

    pub fn from_toml_str(text: &str) -> Self {
        let table = match parse_table(text) {
            Ok(t) => t,
            Err(e) => {
                warn!("{e}, using defaults");
                return Self::default();
            }
        };

        let colors: ColorsSection = section(&table, "colors");
        let display: DisplaySection = section(&table, "display");
        let charts: ChartsSection = section(&table, "charts");

        let mut config = Self::default();
        config.apply_colors(colors);
        config.apply_display(display);
        config.apply_charts(charts);
        config
    }

    pub fn without_color(mut self) -> Self {
        self.display.color = false;
        self.palette = Palette::plain();
        self
    }

    pub fn with_emoji(mut self, emoji: bool) -> Self {
        self.display.emoji = emoji;
        self
    }

    fn apply_colors(&mut self, colors: ColorsSection) {
        let p = &mut self.palette;
        let slots: [(&mut Style, Option<String>); 7] = [
            (&mut p.title, colors.title),
            (&mut p.date, colors.date),
            (&mut p.number, colors.number),
            (&mut p.bar, colors.bar),
            (&mut p.alert, colors.alert),
            (&mut p.added, colors.added),
            (&mut p.removed, colors.removed),
        ];
        for (slot, spec) in slots {
            if let Some(spec) = spec {
                *slot = Style::from_dotted_str(&spec);
            }
        }
    }

    fn apply_display(&mut self, display: DisplaySection) {
        if let Some(emoji) = display.emoji {
            self.display.emoji = emoji;
        }
        if let Some(c) = display.bar_char {
            self.display.bar_char = c;
        }
        if let Some(w) = display.max_width.filter(|w| *w >= 10) {
            self.display.max_width = Some(w);
        }
        if display.color == Some(false) {
            self.display.color = false;
            self.palette = Palette::plain();
        }
    }

    fn apply_charts(&mut self, charts: ChartsSection) {
        let c = &mut self.charts;
        if let Some(levels) = charts.heatmap_levels.filter(|l| *l >= 2) {
            c.heatmap.levels = levels;
        }
        if let Some(mut t) = charts.heatmap_thresholds {
            t.sort_unstable();
            t.dedup();
            c.heatmap.thresholds = Some(t);
        }
        if let Some(bw) = charts.violin_bandwidth.filter(|b| b.is_finite() && *b > 0.0) {
            c.violin.bandwidth = bw;
        }
        if let Some(samples) = charts.violin_samples.filter(|s| *s >= 2) {
            c.violin.samples = samples;
        }
        if let Some(top) = charts.churn_top.filter(|t| *t > 0) {
            c.churn_top = top;
        }
    }
}

fn parse_table(text: &str) -> Result<toml::Table> {
    text.parse::<toml::Table>()
        .map_err(|e| GitCountError::Config(e.message().to_string()))
}

fn section<T: DeserializeOwned + Default>(table: &toml::Table, name: &str) -> T {
    match table.get(name) {
        None => T::default(),
        Some(value) => value.clone().try_into().unwrap_or_else(|e| {
            warn!(section = name, "ignoring malformed config section: {e}");
            T::default()
        }),
    }
}
