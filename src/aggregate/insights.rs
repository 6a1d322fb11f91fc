use crate::model::{Commit, CommitSeries};
use chrono::{DateTime, Datelike, FixedOffset, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

pub const DEFAULT_CONTRIBUTORS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitType {
    Feature,
    Fix,
    Docs,
    Refactor,
    Test,
    Chore,
    Other,
}

impl CommitType {
    pub const ALL: [CommitType; 7] = [
        CommitType::Feature,
        CommitType::Fix,
        CommitType::Docs,
        CommitType::Refactor,
        CommitType::Test,
        CommitType::Chore,
        CommitType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommitType::Feature => "feature",
            CommitType::Fix => "fix",
            CommitType::Docs => "docs",
            CommitType::Refactor => "refactor",
            CommitType::Test => "test",
            CommitType::Chore => "chore",
            CommitType::Other => "other",
        }
    }
}

impl fmt::Display for CommitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const RULES: &[(&[&str], CommitType)] = &[
    (&["fix", "fixes", "fixed", "bug", "bugfix", "hotfix"], CommitType::Fix),
    (&["feat", "feature", "features", "add", "adds", "added"], CommitType::Feature),
    (&["doc", "docs", "documentation", "readme"], CommitType::Docs),
    (&["refactor", "refactoring", "style", "clean", "cleanup"], CommitType::Refactor),
    (&["test", "tests", "testing"], CommitType::Test),
    (&["chore", "build", "ci", "bump", "release", "merge"], CommitType::Chore),
];

pub fn classify(message: &str) -> CommitType {
    let message = message.trim_start().to_lowercase();
    let token = message
        .split(|c: char| !c.is_alphanumeric())
        .next()
        .unwrap_or_default();
    RULES
        .iter()
        .find(|(words, _)| words.contains(&token))
        .map(|(_, kind)| *kind)
        .unwrap_or(CommitType::Other)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCount {
    pub kind: CommitType,
    pub commits: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    pub author: String,
    pub commits: u64,
    pub first_commit: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peak {
    pub index: u32,
    pub commits: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    pub total_commits: u64,
    pub parse_errors: u64,
    pub first_commit: Option<DateTime<FixedOffset>>,
    pub last_commit: Option<DateTime<FixedOffset>>,
    pub project_age_days: i64,
    pub commits_per_day: f64,
    pub hours: Vec<u64>,
    /// Index 0 = Monday, author-local weekday.
    pub weekdays: Vec<u64>,
    pub peak_hour: Option<Peak>,
    pub peak_weekday: Option<Peak>,
    pub commit_types: Vec<TypeCount>,
    pub contributors: Vec<Contributor>,
}

pub fn hour_histogram(series: &CommitSeries) -> Vec<u64> {
    let mut hours = vec![0u64; 24];
    for commit in series {
        hours[commit.timestamp.hour() as usize] += 1;
    }
    hours
}

pub fn weekday_histogram(series: &CommitSeries) -> Vec<u64> {
    let mut days = vec![0u64; 7];
    for commit in series {
        days[commit.timestamp.weekday().num_days_from_monday() as usize] += 1;
    }
    days
}

pub fn commit_type_mix(series: &CommitSeries) -> Vec<TypeCount> {
    let mut counts: HashMap<CommitType, u64> = HashMap::new();
    for commit in series {
        *counts.entry(classify(&commit.message)).or_insert(0) += 1;
    }
    CommitType::ALL
        .iter()
        .filter_map(|kind| {
            counts.get(kind).map(|&commits| TypeCount {
                kind: *kind,
                commits,
            })
        })
        .collect()
}

pub fn top_contributors(series: &CommitSeries, limit: usize) -> Vec<Contributor> {
    let mut order: Vec<Contributor> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for commit in series {
        match index.get(commit.author.as_str()) {
            Some(&i) => order[i].commits += 1,
            None => {
                index.insert(commit.author.as_str(), order.len());
                order.push(Contributor {
                    author: commit.author.clone(),
                    commits: 1,
                    first_commit: commit.timestamp,
                });
            }
        }
    }

    order.sort_by(|a, b| {
        b.commits
            .cmp(&a.commits)
            .then_with(|| a.first_commit.cmp(&b.first_commit))
    });
    order.truncate(limit);
    order
}

fn peak(histogram: &[u64]) -> Option<Peak> {
    histogram
        .iter()
        .enumerate()
        .filter(|&(_, &n)| n > 0)
        .fold(None, |best: Option<Peak>, (i, &n)| match best {
            Some(p) if p.commits >= n => Some(p),
            _ => Some(Peak {
                index: i as u32,
                commits: n,
            }),
        })
}

pub fn insights(series: &CommitSeries, parse_errors: usize, contributors: usize) -> Insights {
    let first = series.first().map(|c: &Commit| c.timestamp);
    let last = series.last().map(|c: &Commit| c.timestamp);
    let project_age_days = match (first, last) {
        (Some(f), Some(l)) => (l - f).num_days(),
        _ => 0,
    };
    let total = series.len() as u64;
    let commits_per_day = if total == 0 {
        0.0
    } else {
        total as f64 / project_age_days.max(1) as f64
    };

    let hours = hour_histogram(series);
    let weekdays = weekday_histogram(series);

    Insights {
        total_commits: total,
        parse_errors: parse_errors as u64,
        first_commit: first,
        last_commit: last,
        project_age_days,
        commits_per_day,
        peak_hour: peak(&hours),
        peak_weekday: peak(&weekdays),
        hours,
        weekdays,
        commit_types: commit_type_mix(series),
        contributors: top_contributors(series, contributors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn classification_first_rule_wins() {
        assert_eq!(classify("fix login bug"), CommitType::Fix);
        assert_eq!(classify("bug in parser"), CommitType::Fix);
        assert_eq!(classify("feat: new dashboard"), CommitType::Feature);
        assert_eq!(classify("Add search"), CommitType::Feature);
        assert_eq!(classify("docs update"), CommitType::Docs);
        assert_eq!(classify("README changes"), CommitType::Docs);
        assert_eq!(classify("refactor auth module"), CommitType::Refactor);
        assert_eq!(classify("style cleanup"), CommitType::Refactor);
        assert_eq!(classify("tests for parser"), CommitType::Test);
        assert_eq!(classify("chore(deps): bump serde"), CommitType::Chore);
        assert_eq!(classify("Merge branch 'main'"), CommitType::Chore);
        assert_eq!(classify("update dependencies"), CommitType::Other);
        assert_eq!(classify(""), CommitType::Other);
    }

    #[test]
    fn classification_matches_whole_leading_word() {
        assert_eq!(classify("feat(ui): dark mode"), CommitType::Feature);
        assert_eq!(classify("ci: cache cargo registry"), CommitType::Chore);
        assert_eq!(classify("fix!: drop legacy flag"), CommitType::Fix);
        assert_eq!(classify("city map loader"), CommitType::Other);
        assert_eq!(classify("builder pattern for config"), CommitType::Other);
        assert_eq!(classify("testimonials page"), CommitType::Other);
        assert_eq!(classify("address parsing edge case"), CommitType::Other);
        assert_eq!(classify("documentary footage"), CommitType::Other);
    }

    #[test]
    fn histograms_use_author_local_time() {
        let s = series(vec![
            commit("a", "A", "2024-06-10T14:30:00+02:00", "x"),
            commit("b", "A", "2024-06-11T09:00:00-07:00", "x"),
            commit("c", "A", "2024-06-16T14:00:00+00:00", "x"),
        ]);
        let hours = hour_histogram(&s);
        assert_eq!(hours[14], 2);
        assert_eq!(hours[9], 1);
        let days = weekday_histogram(&s);
        assert_eq!(days[0], 1);
        assert_eq!(days[1], 1);
        assert_eq!(days[6], 1);
    }

    #[test]
    fn contributors_rank_by_count_then_first_commit() {
        let s = series(vec![
            commit("1", "Bob", "2024-01-01T00:00:00+00:00", "x"),
            commit("2", "Alice", "2024-01-02T00:00:00+00:00", "x"),
            commit("3", "Carol", "2024-01-03T00:00:00+00:00", "x"),
            commit("4", "Alice", "2024-01-04T00:00:00+00:00", "x"),
            commit("5", "Carol", "2024-01-05T00:00:00+00:00", "x"),
        ]);
        let ranked = top_contributors(&s, 10);
        let names: Vec<_> = ranked.iter().map(|c| c.author.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Carol", "Bob"]);
        assert_eq!(top_contributors(&s, 1).len(), 1);
    }

    #[test]
    fn insights_summarise_series() {
        let s = series(vec![
            commit("1", "Alice", "2024-06-10T14:30:00+00:00", "fix bug"),
            commit("2", "Bob", "2024-06-11T09:00:00+00:00", "add feature"),
            commit("3", "Alice", "2024-06-12T14:00:00+00:00", "refactor code"),
        ]);
        let i = insights(&s, 2, DEFAULT_CONTRIBUTORS);
        assert_eq!(i.total_commits, 3);
        assert_eq!(i.parse_errors, 2);
        assert_eq!(i.project_age_days, 1);
        assert_eq!(i.peak_hour, Some(Peak { index: 14, commits: 2 }));
        assert_eq!(i.peak_weekday, Some(Peak { index: 0, commits: 1 }));
        assert_eq!(i.contributors[0].author, "Alice");
        let kinds: Vec<_> = i.commit_types.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![CommitType::Feature, CommitType::Fix, CommitType::Refactor]);
    }

    #[test]
    fn empty_series_gives_zero_insights() {
        let i = insights(&CommitSeries::new(), 0, DEFAULT_CONTRIBUTORS);
        assert_eq!(i.total_commits, 0);
        assert_eq!(i.commits_per_day, 0.0);
        assert!(i.hours.iter().all(|&n| n == 0));
        assert_eq!(i.peak_hour, None);
        assert!(i.commit_types.is_empty());
        assert!(i.contributors.is_empty());
    }
}
