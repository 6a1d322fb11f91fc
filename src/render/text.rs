use crate::aggregate::insights::WEEKDAY_NAMES;
use crate::aggregate::{ChurnEntry, Insights, StreakState, VelocityReport};
use crate::config::Config;
use crate::encode::sparkline::GLYPHS;
use crate::encode::{BoxPlot, ChartDatum, Heatmap, Sparkline, ViolinPlot};
use crate::error::Result;
use crate::report::Report;
use crate::util::truncate_left;
use std::fmt::Write;

const HEAT_RAMP: [char; 4] = ['░', '▒', '▓', '█'];
const EMPTY_DAY: char = '·';
const MEDALS: [&str; 3] = ["🏆", "🥈", "🥉"];
const CHURN_PATH_WIDTH: usize = 45;
const CHURN_BAR_WIDTH: usize = 30;
const MIN_BAR_WIDTH: usize = 10;

pub fn render(report: &Report, config: &Config, width: usize) -> Result<String> {
    let mut out = String::new();
    let r = Renderer { config, width: width.max(40) };

    if report.is_empty() {
        writeln!(
            out,
            "{}",
            config.palette.alert.apply_to("No commits found matching the specified criteria")
        )?;
        r.parse_errors(&mut out, report)?;
        return Ok(out);
    }

    r.activity(&mut out, report)?;
    if let Some(insights) = &report.insights {
        r.insights(&mut out, insights, report.streaks.as_ref())?;
    }
    if let Some(churn) = &report.churn {
        r.churn(&mut out, churn)?;
    }
    if let Some(velocity) = &report.velocity {
        r.velocity(&mut out, velocity)?;
    }
    for chart in &report.charts {
        match chart {
            ChartDatum::Heatmap(h) => r.heatmap(&mut out, h)?,
            ChartDatum::Sparkline(s) => r.sparkline(&mut out, s, report)?,
            ChartDatum::BoxPlot(b) => r.box_plot(&mut out, b)?,
            ChartDatum::ViolinPlot(v) => r.violin(&mut out, v)?,
        }
    }
    r.parse_errors(&mut out, report)?;

    Ok(out)
}

struct Renderer<'a> {
    config: &'a Config,
    width: usize,
}

impl Renderer<'_> {
    fn icon(&self, emoji: &str) -> String {
        if self.config.display.emoji {
            format!("{emoji} ")
        } else {
            String::new()
        }
    }

    fn title(&self, out: &mut String, emoji: &str, text: &str) -> Result<()> {
        let p = &self.config.palette;
        writeln!(out)?;
        writeln!(out, "{}{}", self.icon(emoji), p.title.apply_to(text))?;
        writeln!(out, "{}", "─".repeat(text.chars().count().min(self.width).max(20)))?;
        Ok(())
    }

    fn bar(&self, value: u64, max: u64, width: usize) -> String {
        self.config
            .display
            .bar_char
            .to_string()
            .repeat(scaled(value, max, width))
    }

    fn activity(&self, out: &mut String, report: &Report) -> Result<()> {
        let p = &self.config.palette;
        let title = format!(
            "Activity Summary ({} commits over {} {})",
            report.summary.total_commits,
            report.summary.active_periods,
            report.period.plural()
        );
        self.title(out, "📊", &title)?;

        let label_width = report
            .activity
            .iter()
            .map(|a| a.period.to_string().len())
            .max()
            .unwrap_or(0);
        let bar_width = self.width.saturating_sub(label_width + 10).max(MIN_BAR_WIDTH);
        let max = report.activity.iter().map(|a| a.commits).max().unwrap_or(0);

        for bucket in report.activity.iter().rev() {
            writeln!(
                out,
                "{}  {}  {}",
                p.date.apply_to(format!("{:<label_width$}", bucket.period.to_string())),
                p.number.apply_to(format!("{:>4}", bucket.commits)),
                p.bar.apply_to(self.bar(bucket.commits, max, bar_width)),
            )?;
        }
        Ok(())
    }

    fn insights(&self, out: &mut String, insights: &Insights, streaks: Option<&StreakState>) -> Result<()> {
        let p = &self.config.palette;
        self.title(out, "🔎", "Repository Insights")?;

        if let (Some(first), Some(last)) = (insights.first_commit, insights.last_commit) {
            writeln!(out, "First commit:  {}", p.date.apply_to(first.format("%Y-%m-%d")))?;
            writeln!(out, "Latest commit: {}", p.date.apply_to(last.format("%Y-%m-%d")))?;
        }
        writeln!(
            out,
            "Project age:   {}",
            p.number.apply_to(format!("{} days", insights.project_age_days))
        )?;
        writeln!(
            out,
            "Average commits per day: {}",
            p.number.apply_to(format!("{:.1}", insights.commits_per_day))
        )?;

        if let Some(streaks) = streaks {
            writeln!(out)?;
            writeln!(
                out,
                "{}Current streak: {}",
                self.icon("🔥"),
                p.number.apply_to(format!("{} days", streaks.current))
            )?;
            write!(
                out,
                "{}Longest streak: {}",
                self.icon("⚡"),
                p.number.apply_to(format!("{} days", streaks.longest))
            )?;
            if let (Some(start), Some(end)) = (streaks.longest_start, streaks.longest_end) {
                write!(out, " ({})", p.date.apply_to(format!("{start} → {end}")))?;
            }
            writeln!(out)?;
        }

        writeln!(out)?;
        if let Some(peak) = insights.peak_hour {
            writeln!(
                out,
                "{}Most active hour: {} ({} commits)",
                self.icon("🕐"),
                p.number.apply_to(format!("{:02}:00", peak.index)),
                peak.commits
            )?;
        }
        if let Some(peak) = insights.peak_weekday {
            let name = WEEKDAY_NAMES.get(peak.index as usize).copied().unwrap_or("?");
            writeln!(
                out,
                "{}Most active day:  {} ({} commits)",
                self.icon("📅"),
                p.number.apply_to(name),
                peak.commits
            )?;
        }

        let weekdays: Vec<(String, u64)> = WEEKDAY_NAMES
            .iter()
            .zip(&insights.weekdays)
            .map(|(name, &n)| (name.to_string(), n))
            .collect();
        self.labelled_chart(out, "Commits by Day of Week", &weekdays)?;

        let hours: Vec<(String, u64)> = insights
            .hours
            .iter()
            .enumerate()
            .filter(|&(_, &n)| n > 0)
            .map(|(h, &n)| (format!("{h:02}:00"), n))
            .collect();
        self.labelled_chart(out, "Commits by Hour", &hours)?;

        if !insights.commit_types.is_empty() {
            writeln!(out)?;
            writeln!(out, "{}", p.title.apply_to("Commit Types:"))?;
            let total = insights.total_commits.max(1) as f64;
            for t in &insights.commit_types {
                let pct = t.commits as f64 / total * 100.0;
                writeln!(
                    out,
                    "{:<15} {} {} ({:.1}%)",
                    capitalize(t.kind.as_str()),
                    p.number.apply_to(format!("{:4}", t.commits)),
                    p.bar.apply_to(self.config.display.bar_char.to_string().repeat((pct / 2.0) as usize)),
                    pct
                )?;
            }
        }

        if !insights.contributors.is_empty() {
            writeln!(out)?;
            writeln!(out, "{}", p.title.apply_to("Top Contributors:"))?;
            for (i, c) in insights.contributors.iter().enumerate() {
                let rank = match MEDALS.get(i) {
                    Some(medal) if self.config.display.emoji => medal.to_string(),
                    _ => format!("{}.", i + 1),
                };
                writeln!(
                    out,
                    "{rank} {}: {} commits",
                    c.author,
                    p.number.apply_to(c.commits)
                )?;
            }
        }

        Ok(())
    }

    fn labelled_chart(&self, out: &mut String, title: &str, rows: &[(String, u64)]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let p = &self.config.palette;
        writeln!(out)?;
        writeln!(out, "{}", p.title.apply_to(format!("{title}:")))?;
        let label_width = rows.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
        let max = rows.iter().map(|(_, n)| *n).max().unwrap_or(0);
        let width = self.width.saturating_sub(label_width + 8).clamp(MIN_BAR_WIDTH, 40);
        for (label, n) in rows {
            writeln!(
                out,
                "{label:<label_width$} {} {}",
                p.number.apply_to(format!("{n:>4}")),
                p.bar.apply_to(self.bar(*n, max, width))
            )?;
        }
        Ok(())
    }

    fn churn(&self, out: &mut String, churn: &[ChurnEntry]) -> Result<()> {
        let p = &self.config.palette;
        self.title(out, "📁", "Most Frequently Changed Files (hotspots)")?;
        if churn.is_empty() {
            writeln!(out, "{}", p.alert.apply_to("No file change data found"))?;
            return Ok(());
        }

        let max = churn.iter().map(|e| e.commits).max().unwrap_or(0);
        for entry in churn {
            let path = truncate_left(&entry.path, CHURN_PATH_WIDTH);
            writeln!(
                out,
                "{} {} {} {}/{}",
                p.date.apply_to(format!("{path:<48}")),
                p.number.apply_to(format!("{:>4}", entry.commits)),
                p.bar.apply_to(format!("{:<w$}", self.bar(entry.commits, max, CHURN_BAR_WIDTH), w = CHURN_BAR_WIDTH)),
                p.added.apply_to(format!("+{}", entry.lines_added)),
                p.removed.apply_to(format!("-{}", entry.lines_removed)),
            )?;
        }
        Ok(())
    }

    fn velocity(&self, out: &mut String, velocity: &VelocityReport) -> Result<()> {
        let p = &self.config.palette;
        self.title(out, "🚀", "Code Velocity (lines changed)")?;
        if velocity.rows.is_empty() {
            writeln!(out, "{}", p.alert.apply_to("No velocity data found"))?;
            return Ok(());
        }

        writeln!(
            out,
            "Total: {} / {} / net {}",
            p.added.apply_to(format!("+{}", velocity.added)),
            p.removed.apply_to(format!("-{}", velocity.removed)),
            p.number.apply_to(format!("{:+}", velocity.net)),
        )?;
        writeln!(out)?;

        let width = self.width.saturating_sub(40).clamp(MIN_BAR_WIDTH, 60);
        let max = velocity
            .rows
            .iter()
            .flat_map(|r| [r.added, r.removed])
            .max()
            .unwrap_or(0);
        for row in velocity.rows.iter().rev() {
            writeln!(
                out,
                "{}  {}{}  {}/{}",
                p.date.apply_to(row.period),
                p.added.apply_to("+".repeat(scaled(row.added, max, width))),
                p.removed.apply_to("-".repeat(scaled(row.removed, max, width))),
                p.added.apply_to(format!("+{}", row.added)),
                p.removed.apply_to(format!("-{}", row.removed)),
            )?;
        }
        Ok(())
    }

    fn heatmap(&self, out: &mut String, heatmap: &Heatmap) -> Result<()> {
        let p = &self.config.palette;
        let title = format!(
            "Commit Heatmap ({} → {}, {} commits)",
            heatmap.start,
            heatmap.end,
            heatmap.total()
        );
        self.title(out, "🗓", &title)?;

        let columns = heatmap.columns();
        let fit = self.width.saturating_sub(5);
        let shown = &columns[columns.len().saturating_sub(fit)..];
        let top = heatmap.levels.saturating_sub(1).max(1);

        for (row, name) in WEEKDAY_NAMES.iter().enumerate() {
            let label = if row % 2 == 0 { &name[..3] } else { "" };
            let mut line = String::with_capacity(shown.len() * 3);
            for column in shown {
                line.push(match column[row] {
                    None => ' ',
                    Some(cell) if cell.level == 0 => EMPTY_DAY,
                    Some(cell) => heat_glyph(cell.level, top),
                });
            }
            writeln!(out, "{label:<4} {}", p.bar.apply_to(line))?;
        }

        let legend: String = std::iter::once(EMPTY_DAY)
            .chain((1..=top).map(|l| heat_glyph(l, top)))
            .flat_map(|c| [c, ' '])
            .collect();
        writeln!(
            out,
            "{:<4} Less {}More (max {}/day)",
            "",
            p.bar.apply_to(legend),
            heatmap.max_count
        )?;
        Ok(())
    }

    fn sparkline(&self, out: &mut String, spark: &Sparkline, report: &Report) -> Result<()> {
        let p = &self.config.palette;
        self.title(out, "📈", &format!("Activity Trend (commits per {})", report.period))?;
        let glyphs: Vec<char> = spark.glyphs().chars().collect();
        let shown: String = glyphs[glyphs.len().saturating_sub(self.width)..].iter().collect();
        writeln!(out, "{}", p.bar.apply_to(shown))?;

        let min = spark.values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = spark.values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        writeln!(
            out,
            "min {}  max {}  over {} {}",
            p.number.apply_to(min),
            p.number.apply_to(max),
            spark.values.len(),
            report.period.plural()
        )?;
        Ok(())
    }

    fn box_plot(&self, out: &mut String, plot: &BoxPlot) -> Result<()> {
        let p = &self.config.palette;
        self.title(out, "📦", "Commits per Period (box plot)")?;

        let width = self.width.saturating_sub(4).clamp(MIN_BAR_WIDTH, 72);
        let pos = |v: f64| position(v, plot.min, plot.max, width);
        let mut strip = vec![' '; width];

        for slot in &mut strip[pos(plot.lower_whisker)..=pos(plot.upper_whisker)] {
            *slot = '─';
        }
        for slot in &mut strip[pos(plot.q1)..=pos(plot.q3)] {
            *slot = '█';
        }
        strip[pos(plot.lower_whisker)] = '├';
        strip[pos(plot.upper_whisker)] = '┤';
        strip[pos(plot.median)] = '│';
        for &o in &plot.outliers {
            strip[pos(o)] = '•';
        }

        writeln!(out, "{}", p.bar.apply_to(strip.into_iter().collect::<String>()))?;
        writeln!(
            out,
            "min {}  q1 {}  median {}  q3 {}  max {}  outliers {}",
            p.number.apply_to(plot.min),
            p.number.apply_to(plot.q1),
            p.number.apply_to(plot.median),
            p.number.apply_to(plot.q3),
            p.number.apply_to(plot.max),
            p.alert.apply_to(plot.outliers.len()),
        )?;
        Ok(())
    }

    fn violin(&self, out: &mut String, plot: &ViolinPlot) -> Result<()> {
        let p = &self.config.palette;
        self.title(out, "🎻", "Commit Hour Density (violin plot)")?;

        let peak = plot.peak();
        let top = (GLYPHS.len() - 1) as f64;
        let strip: String = plot
            .density
            .iter()
            .map(|d| {
                if peak > 0.0 {
                    GLYPHS[(((d.density / peak) * top).round() as usize).min(GLYPHS.len() - 1)]
                } else {
                    GLYPHS[0]
                }
            })
            .collect();
        writeln!(
            out,
            "{:>5.1} {} {:.1}",
            plot.min,
            p.bar.apply_to(&strip),
            plot.max
        )?;
        writeln!(
            out,
            "bandwidth {}  samples {}",
            p.number.apply_to(plot.bandwidth),
            plot.density.len()
        )?;
        Ok(())
    }

    fn parse_errors(&self, out: &mut String, report: &Report) -> Result<()> {
        if report.summary.parse_errors > 0 {
            writeln!(out)?;
            writeln!(
                out,
                "{}",
                self.config.palette.alert.apply_to(format!(
                    "Skipped {} malformed log records",
                    report.summary.parse_errors
                ))
            )?;
        }
        Ok(())
    }
}

fn scaled(value: u64, max: u64, width: usize) -> usize {
    if max == 0 {
        return 0;
    }
    ((value as u128 * width as u128) / max as u128) as usize
}

fn position(value: f64, min: f64, max: f64, width: usize) -> usize {
    let last = width.saturating_sub(1);
    if max > min {
        (((value - min) / (max - min)) * last as f64).round().clamp(0.0, last as f64) as usize
    } else {
        last / 2
    }
}

fn heat_glyph(level: u8, top: u8) -> char {
    let idx = ((level.max(1) - 1) as usize * HEAT_RAMP.len()) / top.max(1) as usize;
    HEAT_RAMP[idx.min(HEAT_RAMP.len() - 1)]
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CommitSeries;
    use crate::report::build_report;
    use crate::report::tests::{full_options, sample_report};
    use pretty_assertions::assert_eq;

    fn plain() -> Config {
        Config::default().without_color()
    }

    #[test]
    fn empty_report_prints_no_commits() {
        let report = build_report(&CommitSeries::new(), 0, &full_options());
        let text = render(&report, &plain(), 80).unwrap();
        assert!(text.contains("No commits found"));
        assert!(!text.contains("Activity Summary"));
        assert!(!text.contains("Heatmap"));
    }

    #[test]
    fn bars_are_proportional() {
        assert_eq!(scaled(5, 10, 40), 20);
        assert_eq!(scaled(10, 10, 40), 40);
        assert_eq!(scaled(0, 10, 40), 0);
        assert_eq!(scaled(3, 0, 40), 0);
    }

    #[test]
    fn renders_every_section() {
        let text = render(&sample_report(), &plain(), 100).unwrap();
        for heading in [
            "Activity Summary (3 commits over 3 days)",
            "Repository Insights",
            "Longest streak: 2 days",
            "Most Frequently Changed Files",
            "Code Velocity",
            "Commit Heatmap",
            "Activity Trend",
            "box plot",
            "violin plot",
            "Skipped 1 malformed log records",
        ] {
            assert!(text.contains(heading), "missing {heading:?} in\n{text}");
        }
    }

    #[test]
    fn activity_rows_newest_first() {
        let text = render(&sample_report(), &plain(), 100).unwrap();
        let jan4 = text.find("2024-01-04").unwrap();
        let jan1 = text.find("2024-01-01").unwrap();
        assert!(jan4 < jan1);
    }

    #[test]
    fn emoji_mode_adds_glyphs() {
        let text = render(&sample_report(), &plain().with_emoji(true), 100).unwrap();
        assert!(text.contains("🏆"));
        assert!(text.contains("🔥"));

        let text = render(&sample_report(), &plain(), 100).unwrap();
        assert!(!text.contains("🏆"));
        assert!(text.contains("1. Alice"));
    }

    #[test]
    fn plain_palette_has_no_escape_codes() {
        let text = render(&sample_report(), &plain(), 100).unwrap();
        assert!(!text.contains('\u{1b}'));
    }

    #[test]
    fn heat_glyphs_span_ramp() {
        assert_eq!(heat_glyph(1, 4), '░');
        assert_eq!(heat_glyph(4, 4), '█');
        assert_eq!(heat_glyph(1, 2), '░');
        assert_eq!(heat_glyph(2, 2), '▓');
    }

    #[test]
    fn positions_clamp_to_strip() {
        assert_eq!(position(0.0, 0.0, 10.0, 11), 0);
        assert_eq!(position(10.0, 0.0, 10.0, 11), 10);
        assert_eq!(position(4.0, 4.0, 4.0, 11), 5);
    }
}
