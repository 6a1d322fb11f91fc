use crate::error::Result;
use crate::report::Report;

pub fn render(report: &Report) -> Result<String> {
    let mut out = serde_json::to_string_pretty(report)?;
    out.push('\n');
    Ok(out)
}

pub fn parse(text: &str) -> Result<Report> {
    Ok(serde_json::from_str(text)?)
}
