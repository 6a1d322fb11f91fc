use crate::model::{Commit, CommitSeries};
use crate::util::{normalize_dir, path_under};
use chrono::{DateTime, FixedOffset};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitFilter {
    pub author: Option<String>,
    pub since: Option<DateTime<FixedOffset>>,
    pub until: Option<DateTime<FixedOffset>>,
    pub directory: Option<String>,
    pub max_commits: Option<usize>,
}

impl CommitFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_since(mut self, since: DateTime<FixedOffset>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn with_until(mut self, until: DateTime<FixedOffset>) -> Self {
        self.until = Some(until);
        self
    }

    pub fn with_directory(mut self, directory: impl Into<String>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    pub fn with_max_commits(mut self, max: usize) -> Self {
        self.max_commits = Some(max);
        self
    }

    pub fn contains(&self, timestamp: &DateTime<FixedOffset>) -> bool {
        if let Some(since) = &self.since {
            if timestamp < since {
                return false;
            }
        }
        if let Some(until) = &self.until {
            if timestamp > until {
                return false;
            }
        }
        true
    }

    /// Applies every constraint. Commits kept by the directory constraint
    /// only retain the files under that directory. `max_commits` runs last
    /// and keeps the most recent commits.
    pub fn apply(&self, series: CommitSeries) -> CommitSeries {
        let before = series.len();
        let author = self.author.as_deref().map(str::to_lowercase);
        let directory = self.directory.as_deref().and_then(normalize_dir);

        let mut kept: Vec<Commit> = series
            .into_vec()
            .into_iter()
            .filter(|c| match &author {
                Some(a) => c.author.to_lowercase().contains(a.as_str()),
                None => true,
            })
            .filter(|c| self.contains(&c.timestamp))
            .filter_map(|c| match directory {
                Some(dir) => narrow_to_directory(c, dir),
                None => Some(c),
            })
            .collect();

        if let Some(max) = self.max_commits {
            if kept.len() > max {
                kept.drain(..kept.len() - max);
            }
        }

        debug!(before, after = kept.len(), "filtered commit series");
        CommitSeries::from_ordered(kept)
    }
}

fn narrow_to_directory(mut commit: Commit, dir: &str) -> Option<Commit> {
    commit.files.retain(|f| path_under(&f.path, dir));
    if commit.files.is_empty() {
        None
    } else {
        Some(commit)
    }
}
