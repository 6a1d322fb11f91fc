use crate::config::Config;
use crate::filter::CommitFilter;
use crate::git::{GitRepo, LogRequest};
use crate::model::Period;
use crate::parse::parse_log;
use crate::render::{render, OutputMode};
use crate::report::{build_report, Report, ReportOptions};
use crate::util::BoundKind;
use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "git-count")]
#[command(about = "Git commit activity: period bars, streaks, hotspots, velocity and charts")]
#[command(version)]
pub struct Cli {
    #[arg(short, long, value_enum, default_value_t = Period::Day, help = "Group commits by period")]
    pub period: Period,

    #[arg(short, long, help = "Only count commits whose author contains this text")]
    pub author: Option<String>,

    #[arg(short, long, help = "Start from this date or commit (YYYY-MM-DD, RFC3339, \"2 weeks ago\", or a revision)")]
    pub since: Option<String>,

    #[arg(short, long, help = "End at this date or commit")]
    pub until: Option<String>,

    #[arg(short, long, help = "Only count changes under this directory")]
    pub directory: Option<String>,

    #[arg(short, long, help = "Keep only the most recent N commits")]
    pub max_commits: Option<usize>,

    #[arg(short, long, default_value = "text", help = "Output format: text, json, csv or svg")]
    pub output: String,

    #[arg(short, long, help = "Show repository insights and streaks")]
    pub insights: bool,

    #[arg(short, long, help = "Show most frequently changed files (hotspots)")]
    pub churn: bool,

    #[arg(long, help = "Number of hotspot files to show")]
    pub churn_top: Option<usize>,

    #[arg(long, help = "Directory depth for hotspot aggregation")]
    pub depth: Option<u32>,

    #[arg(short, long, help = "Show code velocity (lines added/removed per period)")]
    pub velocity: bool,

    #[arg(long, help = "Show a calendar heatmap of the last year")]
    pub heatmap: bool,

    #[arg(long, help = "Show a sparkline of commits per period")]
    pub sparkline: bool,

    #[arg(long, help = "Show a box plot of commits per period")]
    pub boxplot: bool,

    #[arg(long, help = "Show a violin plot of commit hours")]
    pub violinplot: bool,

    #[arg(long, help = "Decorate text output with emoji")]
    pub emoji: bool,

    #[arg(long, help = "Disable colored output")]
    pub no_color: bool,

    #[arg(long, help = "Skip merge commits")]
    pub no_merges: bool,

    #[arg(long, help = "Path to git repository")]
    pub repo: Option<PathBuf>,

    #[arg(long, help = "Path to config file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Ring the terminal bell and print a summary when done")]
    pub notify: bool,

    #[arg(short, long, conflicts_with = "verbose", help = "Only print errors")]
    pub quiet: bool,

    #[arg(long, help = "Print debug logs")]
    pub verbose: bool,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn execute(self) -> Result<()> {
        init_tracing(self.verbose, self.quiet);

        let mode: OutputMode = self.output.parse()?;
        let config = self.load_config();

        let repo = GitRepo::open(self.repo.as_ref()).context("Failed to open git repository")?;
        let since = self
            .since
            .as_deref()
            .map(|s| repo.resolve_bound(s, BoundKind::Since))
            .transpose()
            .context("Failed to resolve --since")?;
        let until = self
            .until
            .as_deref()
            .map(|s| repo.resolve_bound(s, BoundKind::Until))
            .transpose()
            .context("Failed to resolve --until")?;

        let request = LogRequest {
            with_numstat: mode != OutputMode::Text
                || self.churn
                || self.velocity
                || self.directory.is_some(),
            include_merges: !self.no_merges,
            show_progress: !self.quiet,
        };
        let raw = repo.raw_log(&request).context("Failed to read commit log")?;
        let parsed = parse_log(&raw);

        let filter = CommitFilter {
            author: self.author.clone(),
            since,
            until,
            directory: self.directory.clone(),
            max_commits: self.max_commits,
        };
        let series = filter.apply(parsed.series);
        debug!(kept = series.len(), parsed = parsed.total_records, "filtered commits");

        let options = ReportOptions {
            period: self.period,
            repository: Some(repo.path().to_string_lossy().to_string()),
            insights: self.insights,
            churn: self.churn,
            churn_top: config.charts.churn_top,
            churn_depth: self.depth,
            velocity: self.velocity,
            heatmap: self.heatmap,
            sparkline: self.sparkline,
            boxplot: self.boxplot,
            violinplot: self.violinplot,
            heatmap_options: config.charts.heatmap.clone(),
            heatmap_anchor: until.map(|u| u.with_timezone(&Utc).date_naive()),
            violin_options: config.charts.violin,
            ..ReportOptions::default()
        };
        let report = build_report(&series, parsed.parse_errors, &options);

        let rendered = render(&report, mode, &config).context("Failed to render output")?;
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(rendered.as_bytes())?;
        stdout.flush()?;

        if self.notify {
            notify(&report);
        }
        Ok(())
    }

    fn load_config(&self) -> Config {
        let mut config = Config::load(self.config.as_deref());
        if self.no_color {
            config = config.without_color();
        }
        if self.emoji {
            config = config.with_emoji(true);
        }
        if let Some(top) = self.churn_top.filter(|t| *t > 0) {
            config.charts.churn_top = top;
        }
        config
    }
}

fn init_tracing(verbose: bool, quiet: bool) {
    let default = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn notify(report: &Report) {
    eprint!("\x07");
    eprintln!(
        "git-count: {} commits analysed ({} skipped)",
        report.summary.total_commits, report.summary.parse_errors
    );
}
