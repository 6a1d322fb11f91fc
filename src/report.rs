use crate::aggregate::{
    churn_ranking, compute_streaks, fill_gaps, insights, period_counts, velocity, ChurnEntry,
    Insights, PeriodCount, StreakState, VelocityReport,
};
use crate::aggregate::churn::DEFAULT_TOP;
use crate::aggregate::insights::DEFAULT_CONTRIBUTORS;
use crate::encode::{box_plot, build_heatmap, violin_plot, ChartDatum, HeatmapOptions, Sparkline, ViolinOptions};
use crate::model::{Commit, CommitSeries, Period, SCHEMA_VERSION};
use chrono::{DateTime, FixedOffset, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total_commits: u64,
    pub parse_errors: u64,
    pub active_periods: u64,
    pub lines_added: u64,
    pub lines_removed: u64,
    pub first_commit: Option<DateTime<FixedOffset>>,
    pub last_commit: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRow {
    pub hash: String,
    pub timestamp: DateTime<FixedOffset>,
    pub author: String,
    pub message: String,
    pub files_changed: u64,
    pub lines_added: u64,
    pub lines_removed: u64,
}

impl From<&Commit> for CommitRow {
    fn from(commit: &Commit) -> Self {
        Self {
            hash: commit.hash.clone(),
            timestamp: commit.timestamp,
            author: commit.author.clone(),
            message: commit.message.clone(),
            files_changed: commit.files.len() as u64,
            lines_added: commit.lines_added(),
            lines_removed: commit.lines_removed(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub repository: Option<String>,
    pub period: Period,
    pub summary: Summary,
    pub activity: Vec<PeriodCount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub streaks: Option<StreakState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insights: Option<Insights>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub churn: Option<Vec<ChurnEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity: Option<VelocityReport>,
    #[serde(default)]
    pub charts: Vec<ChartDatum>,
    #[serde(default)]
    pub commits: Vec<CommitRow>,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        self.summary.total_commits == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportOptions {
    pub period: Period,
    pub repository: Option<String>,
    pub insights: bool,
    pub churn: bool,
    pub churn_top: usize,
    pub churn_depth: Option<u32>,
    pub velocity: bool,
    pub heatmap: bool,
    pub sparkline: bool,
    pub boxplot: bool,
    pub violinplot: bool,
    pub heatmap_options: HeatmapOptions,
    pub heatmap_anchor: Option<NaiveDate>,
    pub violin_options: ViolinOptions,
    pub contributors: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            period: Period::Day,
            repository: None,
            insights: false,
            churn: false,
            churn_top: DEFAULT_TOP,
            churn_depth: None,
            velocity: false,
            heatmap: false,
            sparkline: false,
            boxplot: false,
            violinplot: false,
            heatmap_options: HeatmapOptions::default(),
            heatmap_anchor: None,
            violin_options: ViolinOptions::default(),
            contributors: DEFAULT_CONTRIBUTORS,
        }
    }
}

pub fn build_report(series: &CommitSeries, parse_errors: usize, options: &ReportOptions) -> Report {
    let activity = period_counts(series, options.period);
    debug!(
        commits = series.len(),
        buckets = activity.len(),
        period = %options.period,
        "aggregated activity"
    );

    let summary = Summary {
        total_commits: series.len() as u64,
        parse_errors: parse_errors as u64,
        active_periods: activity.len() as u64,
        lines_added: series.iter().map(Commit::lines_added).sum(),
        lines_removed: series.iter().map(Commit::lines_removed).sum(),
        first_commit: series.first().map(|c| c.timestamp),
        last_commit: series.last().map(|c| c.timestamp),
    };

    let streaks = options.insights.then(|| compute_streaks(series));
    let insights = options
        .insights
        .then(|| insights(series, parse_errors, options.contributors));
    let churn = options
        .churn
        .then(|| churn_ranking(series, options.churn_top, options.churn_depth));
    let velocity = options.velocity.then(|| velocity(series, options.period));

    let charts = build_charts(series, &activity, options);
    debug!(charts = charts.len(), "encoded charts");

    Report {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        repository: options.repository.clone(),
        period: options.period,
        summary,
        activity,
        streaks,
        insights,
        churn,
        velocity,
        charts,
        commits: series.iter().map(CommitRow::from).collect(),
    }
}

fn build_charts(series: &CommitSeries, activity: &[PeriodCount], options: &ReportOptions) -> Vec<ChartDatum> {
    let mut charts = Vec::new();

    if options.heatmap {
        let anchor = options
            .heatmap_anchor
            .or_else(|| series.last().map(Commit::day))
            .unwrap_or_else(|| Utc::now().date_naive());
        charts.push(ChartDatum::Heatmap(build_heatmap(
            series,
            anchor,
            &options.heatmap_options,
        )));
    }

    let counts: Vec<f64> = if options.sparkline || options.boxplot {
        fill_gaps(activity).iter().map(|p| p.commits as f64).collect()
    } else {
        Vec::new()
    };

    if options.sparkline && !counts.is_empty() {
        charts.push(ChartDatum::Sparkline(Sparkline::from_values(counts.clone())));
    }
    if options.boxplot {
        if let Some(plot) = box_plot(&counts) {
            charts.push(ChartDatum::BoxPlot(plot));
        }
    }
    if options.violinplot {
        let hours: Vec<f64> = series.iter().map(|c| c.timestamp.hour() as f64).collect();
        if let Some(plot) = violin_plot(&hours, &options.violin_options) {
            charts.push(ChartDatum::ViolinPlot(plot));
        }
    }

    charts
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::fixtures::*;
    use pretty_assertions::assert_eq;

    pub(crate) fn full_options() -> ReportOptions {
        ReportOptions {
            repository: Some("/tmp/demo".to_string()),
            insights: true,
            churn: true,
            velocity: true,
            heatmap: true,
            sparkline: true,
            boxplot: true,
            violinplot: true,
            ..ReportOptions::default()
        }
    }

    pub(crate) fn sample_series() -> CommitSeries {
        series(vec![
            commit_with_files("a1", "2024-01-01T09:15:00+02:00", &[("src/a.rs", 10, 2)]),
            commit_with_files("a2", "2024-01-02T10:00:00+00:00", &[("src/a.rs", 3, 1), ("README.md", 4, 0)]),
            commit("a3", "Bob", "2024-01-04T14:30:00-05:00", "fix: crash on empty input"),
        ])
    }

    pub(crate) fn sample_report() -> Report {
        build_report(&sample_series(), 1, &full_options())
    }

    #[test]
    fn summary_counts_everything() {
        let report = sample_report();
        assert_eq!(report.summary.total_commits, 3);
        assert_eq!(report.summary.parse_errors, 1);
        assert_eq!(report.summary.active_periods, 3);
        assert_eq!(report.summary.lines_added, 17);
        assert_eq!(report.summary.lines_removed, 3);
        assert_eq!(report.commits.len(), 3);
    }

    #[test]
    fn optional_sections_follow_options() {
        let report = build_report(&sample_series(), 0, &ReportOptions::default());
        assert!(report.streaks.is_none());
        assert!(report.insights.is_none());
        assert!(report.churn.is_none());
        assert!(report.velocity.is_none());
        assert!(report.charts.is_empty());

        let report = sample_report();
        assert_eq!(report.streaks.as_ref().map(|s| s.longest), Some(2));
        assert!(report.insights.is_some());
        let names: Vec<_> = report.charts.iter().map(ChartDatum::name).collect();
        assert_eq!(names, vec!["heatmap", "sparkline", "box_plot", "violin_plot"]);
    }

    #[test]
    fn charts_use_gap_filled_activity() {
        let report = sample_report();
        let spark = report.charts.iter().find_map(|c| match c {
            ChartDatum::Sparkline(s) => Some(s),
            _ => None,
        });
        // Jan 1, 2 and 4 plus the empty Jan 3.
        assert_eq!(spark.map(|s| s.values.clone()), Some(vec![1.0, 1.0, 0.0, 1.0]));
    }

    #[test]
    fn heatmap_anchors_on_latest_commit() {
        let report = sample_report();
        let heatmap = report.charts.iter().find_map(|c| match c {
            ChartDatum::Heatmap(h) => Some(h),
            _ => None,
        });
        let end = NaiveDate::from_ymd_opt(2024, 1, 4);
        assert_eq!(heatmap.map(|h| h.end), end);
        assert_eq!(heatmap.map(|h| h.total()), Some(3));
    }

    #[test]
    fn empty_series_gives_empty_report() {
        let report = build_report(&CommitSeries::new(), 0, &full_options());
        assert!(report.is_empty());
        assert!(report.activity.is_empty());
        assert_eq!(report.streaks, Some(StreakState::default()));
        assert_eq!(report.churn, Some(Vec::new()));
        // Only the heatmap has a defined empty form.
        let names: Vec<_> = report.charts.iter().map(ChartDatum::name).collect();
        assert_eq!(names, vec!["heatmap"]);
    }
}
