use crate::aggregate::insights::WEEKDAY_NAMES;
use crate::aggregate::{ChurnEntry, Insights, VelocityReport};
use crate::encode::{BoxPlot, ChartDatum, Heatmap, Sparkline, ViolinPlot};
use crate::error::Result;
use crate::report::Report;
use std::fmt::Write;

const WIDTH: f64 = 800.0;
const MARGIN: f64 = 20.0;
const LABEL_WIDTH: f64 = 150.0;
const ROW: f64 = 16.0;
const CELL: f64 = 11.0;
const BAR_COLOR: &str = "#4c78a8";
const ADDED_COLOR: &str = "#2ca02c";
const REMOVED_COLOR: &str = "#d62728";
const HEAT_COLORS: [&str; 5] = ["#ebedf0", "#9be9a8", "#40c463", "#30a14e", "#216e39"];

pub fn render(report: &Report) -> Result<String> {
    let mut canvas = Canvas::default();

    if report.is_empty() {
        canvas.title("No commits found")?;
    } else {
        canvas.activity(report)?;
        if let Some(insights) = &report.insights {
            canvas.insights(insights)?;
        }
        if let Some(churn) = &report.churn {
            canvas.churn(churn)?;
        }
        if let Some(velocity) = &report.velocity {
            canvas.velocity(velocity)?;
        }
        for chart in &report.charts {
            match chart {
                ChartDatum::Heatmap(h) => canvas.heatmap(h)?,
                ChartDatum::Sparkline(s) => canvas.sparkline(s)?,
                ChartDatum::BoxPlot(b) => canvas.box_plot(b)?,
                ChartDatum::ViolinPlot(v) => canvas.violin(v)?,
            }
        }
    }

    let height = canvas.y + MARGIN;
    let mut out = String::with_capacity(canvas.body.len() + 256);
    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{height}" viewBox="0 0 {WIDTH} {height}" font-family="monospace" font-size="11">"#
    )?;
    writeln!(out, r#"<rect width="100%" height="100%" fill="white"/>"#)?;
    out.push_str(&canvas.body);
    out.push_str("</svg>\n");
    Ok(out)
}

struct Canvas {
    body: String,
    y: f64,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            body: String::new(),
            y: MARGIN,
        }
    }
}

impl Canvas {
    fn title(&mut self, text: &str) -> Result<()> {
        self.y += ROW;
        writeln!(
            self.body,
            r#"<text x="{MARGIN}" y="{}" font-size="14" font-weight="bold">{}</text>"#,
            self.y,
            escape(text)
        )?;
        self.y += ROW * 0.5;
        Ok(())
    }

    fn label(&mut self, x: f64, y: f64, text: &str) -> Result<()> {
        writeln!(self.body, r#"<text x="{x}" y="{y}">{}</text>"#, escape(text))?;
        Ok(())
    }

    fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: &str) -> Result<()> {
        writeln!(
            self.body,
            r#"<rect x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}" fill="{fill}"/>"#
        )?;
        Ok(())
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<()> {
        writeln!(
            self.body,
            r#"<line x1="{x1:.2}" y1="{y1:.2}" x2="{x2:.2}" y2="{y2:.2}" stroke="black"/>"#
        )?;
        Ok(())
    }

    fn bars(&mut self, rows: &[(String, u64)]) -> Result<()> {
        let max = rows.iter().map(|(_, n)| *n).max().unwrap_or(0);
        let span = WIDTH - 2.0 * MARGIN - LABEL_WIDTH - 50.0;
        for (label, n) in rows {
            self.y += ROW;
            let y = self.y;
            self.label(MARGIN, y, label)?;
            let w = scale(*n as f64, max as f64, span);
            self.rect(MARGIN + LABEL_WIDTH, y - ROW + 5.0, w, ROW - 4.0, BAR_COLOR)?;
            self.label(MARGIN + LABEL_WIDTH + w + 4.0, y, &n.to_string())?;
        }
        self.y += ROW * 0.5;
        Ok(())
    }

    fn activity(&mut self, report: &Report) -> Result<()> {
        self.title(&format!(
            "Activity ({} commits over {} {})",
            report.summary.total_commits,
            report.summary.active_periods,
            report.period.plural()
        ))?;
        let rows: Vec<(String, u64)> = report
            .activity
            .iter()
            .map(|a| (a.period.to_string(), a.commits))
            .collect();
        self.bars(&rows)
    }

    fn insights(&mut self, insights: &Insights) -> Result<()> {
        self.title("Commits by Day of Week")?;
        let weekdays: Vec<(String, u64)> = WEEKDAY_NAMES
            .iter()
            .zip(&insights.weekdays)
            .map(|(name, &n)| (name.to_string(), n))
            .collect();
        self.bars(&weekdays)?;

        self.title("Commits by Hour")?;
        let max = insights.hours.iter().copied().max().unwrap_or(0);
        let height = 80.0;
        let step = (WIDTH - 2.0 * MARGIN) / 24.0;
        let base = self.y + height;
        for (hour, &n) in insights.hours.iter().enumerate() {
            let x = MARGIN + hour as f64 * step;
            let h = scale(n as f64, max as f64, height);
            self.rect(x + 1.0, base - h, step - 2.0, h, BAR_COLOR)?;
            if hour % 3 == 0 {
                self.label(x + 1.0, base + ROW - 4.0, &format!("{hour:02}"))?;
            }
        }
        self.y = base + ROW;

        if !insights.contributors.is_empty() {
            self.title("Top Contributors")?;
            let rows: Vec<(String, u64)> = insights
                .contributors
                .iter()
                .map(|c| (c.author.clone(), c.commits))
                .collect();
            self.bars(&rows)?;
        }
        Ok(())
    }

    fn churn(&mut self, churn: &[ChurnEntry]) -> Result<()> {
        self.title("Most Frequently Changed Files")?;
        let rows: Vec<(String, u64)> = churn
            .iter()
            .map(|e| (crate::util::truncate_left(&e.path, 22), e.commits))
            .collect();
        self.bars(&rows)
    }

    fn velocity(&mut self, velocity: &VelocityReport) -> Result<()> {
        self.title(&format!(
            "Code Velocity (+{} / -{} / net {:+})",
            velocity.added, velocity.removed, velocity.net
        ))?;
        let max = velocity
            .rows
            .iter()
            .flat_map(|r| [r.added, r.removed])
            .max()
            .unwrap_or(0);
        let span = (WIDTH - 2.0 * MARGIN - LABEL_WIDTH) / 2.0;
        for row in &velocity.rows {
            self.y += ROW;
            let y = self.y;
            self.label(MARGIN, y, &row.period.to_string())?;
            let added = scale(row.added as f64, max as f64, span);
            let removed = scale(row.removed as f64, max as f64, span);
            let x = MARGIN + LABEL_WIDTH;
            self.rect(x, y - ROW + 5.0, added, ROW - 4.0, ADDED_COLOR)?;
            self.rect(x + added, y - ROW + 5.0, removed, ROW - 4.0, REMOVED_COLOR)?;
        }
        self.y += ROW * 0.5;
        Ok(())
    }

    fn heatmap(&mut self, heatmap: &Heatmap) -> Result<()> {
        self.title(&format!(
            "Commit Heatmap {} to {} ({} commits)",
            heatmap.start,
            heatmap.end,
            heatmap.total()
        ))?;
        let top = heatmap.levels.saturating_sub(1).max(1);
        let origin_x = MARGIN + 30.0;
        let origin_y = self.y + 4.0;

        for (row, name) in WEEKDAY_NAMES.iter().enumerate() {
            if row % 2 == 0 {
                self.label(MARGIN, origin_y + row as f64 * (CELL + 2.0) + CELL - 1.0, &name[..3])?;
            }
        }
        for (col, column) in heatmap.columns().iter().enumerate() {
            for (row, cell) in column.iter().enumerate() {
                let Some(cell) = cell else { continue };
                let x = origin_x + col as f64 * (CELL + 2.0);
                let y = origin_y + row as f64 * (CELL + 2.0);
                writeln!(
                    self.body,
                    r#"<rect x="{x:.2}" y="{y:.2}" width="{CELL}" height="{CELL}" fill="{}"><title>{}: {}</title></rect>"#,
                    heat_color(cell.level, top),
                    cell.date,
                    cell.count
                )?;
            }
        }
        self.y = origin_y + 7.0 * (CELL + 2.0) + ROW * 0.5;
        Ok(())
    }

    fn sparkline(&mut self, spark: &Sparkline) -> Result<()> {
        self.title("Activity Trend")?;
        let height = 40.0;
        let base = self.y + height;
        let min = spark.values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = spark.values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let n = spark.values.len();
        let step = if n > 1 { (WIDTH - 2.0 * MARGIN) / (n - 1) as f64 } else { 0.0 };

        let points: Vec<String> = spark
            .values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let h = if max > min { (v - min) / (max - min) * height } else { height / 2.0 };
                format!("{:.2},{:.2}", MARGIN + i as f64 * step, base - h)
            })
            .collect();
        writeln!(
            self.body,
            r#"<polyline points="{}" fill="none" stroke="{BAR_COLOR}" stroke-width="1.5"/>"#,
            points.join(" ")
        )?;
        self.y = base + ROW * 0.5;
        Ok(())
    }

    fn box_plot(&mut self, plot: &BoxPlot) -> Result<()> {
        self.title(&format!(
            "Commits per Period: median {} (IQR {})",
            plot.median,
            plot.iqr()
        ))?;
        let span = WIDTH - 2.0 * MARGIN;
        let x = |v: f64| MARGIN + position(v, plot.min, plot.max, span);
        let top = self.y + 4.0;
        let mid = top + 12.0;
        let bottom = top + 24.0;

        self.line(x(plot.lower_whisker), mid, x(plot.q1), mid)?;
        self.line(x(plot.q3), mid, x(plot.upper_whisker), mid)?;
        self.line(x(plot.lower_whisker), top + 6.0, x(plot.lower_whisker), bottom - 6.0)?;
        self.line(x(plot.upper_whisker), top + 6.0, x(plot.upper_whisker), bottom - 6.0)?;
        self.rect(x(plot.q1), top, (x(plot.q3) - x(plot.q1)).max(1.0), 24.0, BAR_COLOR)?;
        self.line(x(plot.median), top, x(plot.median), bottom)?;
        for &o in &plot.outliers {
            writeln!(
                self.body,
                r#"<circle cx="{:.2}" cy="{mid:.2}" r="2.5" fill="{REMOVED_COLOR}"/>"#,
                x(o)
            )?;
        }
        self.y = bottom + ROW * 0.5;
        Ok(())
    }

    fn violin(&mut self, plot: &ViolinPlot) -> Result<()> {
        self.title(&format!(
            "Commit Hour Density (bandwidth {})",
            plot.bandwidth
        ))?;
        let span = WIDTH - 2.0 * MARGIN;
        let half = 25.0;
        let mid = self.y + half + 4.0;
        let peak = plot.peak();

        let xy = |x: f64, d: f64, sign: f64| {
            let px = MARGIN + position(x, plot.min, plot.max, span);
            let h = if peak > 0.0 { d / peak * half } else { 0.0 };
            format!("{px:.2},{:.2}", mid - sign * h)
        };
        let mut points: Vec<String> = plot.density.iter().map(|p| xy(p.x, p.density, 1.0)).collect();
        points.extend(plot.density.iter().rev().map(|p| xy(p.x, p.density, -1.0)));
        writeln!(
            self.body,
            r#"<polygon points="{}" fill="{BAR_COLOR}" fill-opacity="0.6" stroke="{BAR_COLOR}"/>"#,
            points.join(" ")
        )?;
        self.y = mid + half + ROW * 0.5;
        Ok(())
    }
}

fn scale(value: f64, max: f64, span: f64) -> f64 {
    if max > 0.0 {
        value / max * span
    } else {
        0.0
    }
}

fn position(value: f64, min: f64, max: f64, span: f64) -> f64 {
    if max > min {
        ((value - min) / (max - min)).clamp(0.0, 1.0) * span
    } else {
        span / 2.0
    }
}

fn heat_color(level: u8, top: u8) -> &'static str {
    if level == 0 {
        return HEAT_COLORS[0];
    }
    let ramp = HEAT_COLORS.len() - 1;
    let idx = 1 + ((level - 1) as usize * ramp) / top.max(1) as usize;
    HEAT_COLORS[idx.min(ramp)]
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}
