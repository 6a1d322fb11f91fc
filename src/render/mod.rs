pub mod csv;
pub mod json;
pub mod svg;
pub mod text;

use crate::config::Config;
use crate::error::{GitCountError, Result};
use crate::report::Report;
use console::Term;
use std::fmt;
use std::str::FromStr;

pub const FALLBACK_WIDTH: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Text,
    Json,
    Csv,
    Svg,
}

impl OutputMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputMode::Text => "text",
            OutputMode::Json => "json",
            OutputMode::Csv => "csv",
            OutputMode::Svg => "svg",
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputMode {
    type Err = GitCountError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputMode::Text),
            "json" => Ok(OutputMode::Json),
            "csv" => Ok(OutputMode::Csv),
            "svg" => Ok(OutputMode::Svg),
            _ => Err(GitCountError::UnsupportedOutputMode(s.to_string())),
        }
    }
}

pub fn render(report: &Report, mode: OutputMode, config: &Config) -> Result<String> {
    match mode {
        OutputMode::Text => text::render(report, config, terminal_width(config)),
        OutputMode::Json => json::render(report),
        OutputMode::Csv => csv::render(report),
        OutputMode::Svg => svg::render(report),
    }
}

/// Terminal columns, capped by the configured maximum.
pub fn terminal_width(config: &Config) -> usize {
    let detected = Term::stdout()
        .size_checked()
        .map(|(_, cols)| cols as usize)
        .unwrap_or(FALLBACK_WIDTH);
    match config.display.max_width {
        Some(max) => detected.min(max),
        None => detected,
    }
}
