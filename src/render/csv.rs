use crate::aggregate::insights::WEEKDAY_NAMES;
use crate::encode::ChartDatum;
use crate::error::Result;
use crate::report::Report;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightsRow {
    pub total_commits: u64,
    pub parse_errors: u64,
    pub first_commit: Option<DateTime<FixedOffset>>,
    pub last_commit: Option<DateTime<FixedOffset>>,
    pub project_age_days: i64,
    pub commits_per_day: f64,
    pub peak_hour: Option<u32>,
    pub peak_hour_commits: Option<u64>,
    pub peak_weekday: Option<String>,
    pub peak_weekday_commits: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourRow {
    pub hour: u32,
    pub commits: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekdayRow {
    pub weekday: String,
    pub commits: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalsRow {
    pub added: u64,
    pub removed: u64,
    pub net: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesRow {
    pub index: usize,
    pub value: f64,
    pub level: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxRow {
    pub min: f64,
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub max: f64,
    pub outliers: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueRow {
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityRow {
    pub x: f64,
    pub density: f64,
    pub bandwidth: f64,
}

fn weekday_name(index: u32) -> String {
    WEEKDAY_NAMES
        .get(index as usize)
        .copied()
        .unwrap_or("?")
        .to_string()
}

fn write_table<T: Serialize>(out: &mut String, name: &str, rows: impl IntoIterator<Item = T>) -> Result<()> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let mut any = false;
    for row in rows {
        writer.serialize(row)?;
        any = true;
    }
    if !any {
        return Ok(());
    }
    let bytes = writer.into_inner()?;

    if !out.is_empty() {
        out.push('\n');
    }
    out.push_str("# ");
    out.push_str(name);
    out.push('\n');
    out.push_str(&String::from_utf8_lossy(&bytes));
    Ok(())
}

pub fn render(report: &Report) -> Result<String> {
    let mut out = String::new();

    write_table(&mut out, "summary", [&report.summary])?;
    write_table(&mut out, "activity", &report.activity)?;

    if let Some(streaks) = &report.streaks {
        write_table(&mut out, "streaks", [streaks])?;
    }

    if let Some(insights) = &report.insights {
        let row = InsightsRow {
            total_commits: insights.total_commits,
            parse_errors: insights.parse_errors,
            first_commit: insights.first_commit,
            last_commit: insights.last_commit,
            project_age_days: insights.project_age_days,
            commits_per_day: insights.commits_per_day,
            peak_hour: insights.peak_hour.map(|p| p.index),
            peak_hour_commits: insights.peak_hour.map(|p| p.commits),
            peak_weekday: insights.peak_weekday.map(|p| weekday_name(p.index)),
            peak_weekday_commits: insights.peak_weekday.map(|p| p.commits),
        };
        write_table(&mut out, "insights", [row])?;
        write_table(
            &mut out,
            "hours",
            insights.hours.iter().enumerate().map(|(h, &commits)| HourRow {
                hour: h as u32,
                commits,
            }),
        )?;
        write_table(
            &mut out,
            "weekdays",
            insights.weekdays.iter().enumerate().map(|(d, &commits)| WeekdayRow {
                weekday: weekday_name(d as u32),
                commits,
            }),
        )?;
        write_table(&mut out, "commit_types", &insights.commit_types)?;
        write_table(&mut out, "contributors", &insights.contributors)?;
    }

    if let Some(churn) = &report.churn {
        write_table(&mut out, "churn", churn)?;
    }

    if let Some(velocity) = &report.velocity {
        write_table(&mut out, "velocity", &velocity.rows)?;
        write_table(
            &mut out,
            "velocity_totals",
            [TotalsRow {
                added: velocity.added,
                removed: velocity.removed,
                net: velocity.net,
            }],
        )?;
    }

    for chart in &report.charts {
        write_chart(&mut out, chart)?;
    }

    write_table(&mut out, "commits", &report.commits)?;

    Ok(out)
}

fn write_chart(out: &mut String, chart: &ChartDatum) -> Result<()> {
    match chart {
        ChartDatum::Heatmap(heatmap) => write_table(out, chart.name(), &heatmap.cells),
        ChartDatum::Sparkline(spark) => write_table(
            out,
            chart.name(),
            spark
                .values
                .iter()
                .zip(&spark.levels)
                .enumerate()
                .map(|(index, (&value, &level))| SeriesRow { index, value, level }),
        ),
        ChartDatum::BoxPlot(plot) => {
            write_table(
                out,
                chart.name(),
                [BoxRow {
                    min: plot.min,
                    lower_whisker: plot.lower_whisker,
                    q1: plot.q1,
                    median: plot.median,
                    q3: plot.q3,
                    upper_whisker: plot.upper_whisker,
                    max: plot.max,
                    outliers: plot.outliers.len(),
                }],
            )?;
            write_table(
                out,
                "box_plot_outliers",
                plot.outliers.iter().map(|&value| ValueRow { value }),
            )
        }
        ChartDatum::ViolinPlot(plot) => write_table(
            out,
            chart.name(),
            plot.density.iter().map(|p| DensityRow {
                x: p.x,
                density: p.density,
                bandwidth: plot.bandwidth,
            }),
        ),
    }
}
