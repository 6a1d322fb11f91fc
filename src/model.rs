use crate::error::GitCountError;
use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    pub path: String,
    pub lines_added: u32,
    pub lines_removed: u32,
    pub binary: bool,
}

impl FileChange {
    pub fn new(path: impl Into<String>, lines_added: u32, lines_removed: u32) -> Self {
        Self {
            path: path.into(),
            lines_added,
            lines_removed,
            binary: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub hash: String,
    pub author: String,
    pub timestamp: DateTime<FixedOffset>,
    pub message: String,
    pub files: Vec<FileChange>,
}

impl Commit {
    pub fn lines_added(&self) -> u64 {
        self.files.iter().map(|f| f.lines_added as u64).sum()
    }

    pub fn lines_removed(&self) -> u64 {
        self.files.iter().map(|f| f.lines_removed as u64).sum()
    }

    pub fn utc(&self) -> DateTime<Utc> {
        self.timestamp.with_timezone(&Utc)
    }

    pub fn day(&self) -> NaiveDate {
        self.utc().date_naive()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitSeries {
    commits: Vec<Commit>,
}

impl CommitSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a series from commits in any order. Later occurrences of an
    /// already seen hash are dropped; the number dropped is returned.
    pub fn from_commits(commits: Vec<Commit>) -> (Self, usize) {
        let total = commits.len();
        let mut seen: HashSet<String> = HashSet::with_capacity(total);
        let mut unique: Vec<Commit> = commits
            .into_iter()
            .filter(|c| seen.insert(c.hash.clone()))
            .collect();
        unique.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        let duplicates = total - unique.len();
        (Self { commits: unique }, duplicates)
    }

    pub(crate) fn from_ordered(commits: Vec<Commit>) -> Self {
        Self { commits }
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Commit> {
        self.commits.iter()
    }

    pub fn as_slice(&self) -> &[Commit] {
        &self.commits
    }

    pub fn first(&self) -> Option<&Commit> {
        self.commits.first()
    }

    pub fn last(&self) -> Option<&Commit> {
        self.commits.last()
    }

    pub fn into_vec(self) -> Vec<Commit> {
        self.commits
    }
}

impl<'a> IntoIterator for &'a CommitSeries {
    type Item = &'a Commit;
    type IntoIter = std::slice::Iter<'a, Commit>;

    fn into_iter(self) -> Self::IntoIter {
        self.commits.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Day,
    Week,
    Month,
    Year,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
        }
    }

    pub fn plural(&self) -> &'static str {
        match self {
            Period::Day => "days",
            Period::Week => "weeks",
            Period::Month => "months",
            Period::Year => "years",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum PeriodKey {
    Day(NaiveDate),
    Week { year: i32, week: u32 },
    Month { year: i32, month: u32 },
    Year(i32),
}

impl PeriodKey {
    /// Buckets the commit instant in UTC so the key does not depend on the
    /// author's offset.
    pub fn of(timestamp: &DateTime<FixedOffset>, period: Period) -> Self {
        let utc = timestamp.with_timezone(&Utc);
        Self::of_date(utc.date_naive(), period)
    }

    pub fn of_date(date: NaiveDate, period: Period) -> Self {
        match period {
            Period::Day => PeriodKey::Day(date),
            Period::Week => {
                let iso = date.iso_week();
                PeriodKey::Week {
                    year: iso.year(),
                    week: iso.week(),
                }
            }
            Period::Month => PeriodKey::Month {
                year: date.year(),
                month: date.month(),
            },
            Period::Year => PeriodKey::Year(date.year()),
        }
    }

    pub fn succ(&self) -> Option<Self> {
        match *self {
            PeriodKey::Day(d) => d.succ_opt().map(PeriodKey::Day),
            PeriodKey::Week { year, week } => {
                let monday = NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)?;
                let next = monday.checked_add_signed(Duration::days(7))?;
                Some(Self::of_date(next, Period::Week))
            }
            PeriodKey::Month { year, month } if month >= 12 => Some(PeriodKey::Month {
                year: year + 1,
                month: 1,
            }),
            PeriodKey::Month { year, month } => Some(PeriodKey::Month {
                year,
                month: month + 1,
            }),
            PeriodKey::Year(y) => Some(PeriodKey::Year(y + 1)),
        }
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodKey::Day(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            PeriodKey::Week { year, week } => write!(f, "{year:04}-W{week:02}"),
            PeriodKey::Month { year, month } => write!(f, "{year:04}-{month:02}"),
            PeriodKey::Year(y) => write!(f, "{y:04}"),
        }
    }
}

impl FromStr for PeriodKey {
    type Err = GitCountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GitCountError::Parse(format!("Invalid period key '{s}'"));
        let s = s.trim();

        if let Some((y, w)) = s.split_once("-W") {
            let year: i32 = y.parse().map_err(|_| invalid())?;
            let week: u32 = w.parse().map_err(|_| invalid())?;
            NaiveDate::from_isoywd_opt(year, week, Weekday::Mon).ok_or_else(invalid)?;
            return Ok(PeriodKey::Week { year, week });
        }
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Ok(PeriodKey::Day(date));
        }
        if let Some((y, m)) = s.split_once('-') {
            let year: i32 = y.parse().map_err(|_| invalid())?;
            let month: u32 = m.parse().map_err(|_| invalid())?;
            if !(1..=12).contains(&month) {
                return Err(invalid());
            }
            return Ok(PeriodKey::Month { year, month });
        }
        s.parse::<i32>().map(PeriodKey::Year).map_err(|_| invalid())
    }
}

impl From<PeriodKey> for String {
    fn from(key: PeriodKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for PeriodKey {
    type Error = GitCountError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn series_sorts_and_drops_duplicate_hashes() {
        let (series, dups) = CommitSeries::from_commits(vec![
            commit("b", "A", "2024-01-02T00:00:00+00:00", "two"),
            commit("a", "A", "2024-01-01T00:00:00+00:00", "one"),
            commit("b", "A", "2024-01-03T00:00:00+00:00", "dup"),
        ]);
        assert_eq!(dups, 1);
        let hashes: Vec<_> = series.iter().map(|c| c.hash.as_str()).collect();
        assert_eq!(hashes, vec!["a", "b"]);
        assert_eq!(series.last().unwrap().message, "two");
    }

    #[test]
    fn period_key_uses_utc_instant() {
        let late_evening = ts("2024-03-01T23:30:00-05:00");
        assert_eq!(
            PeriodKey::of(&late_evening, Period::Day).to_string(),
            "2024-03-02"
        );
        assert_eq!(PeriodKey::of(&late_evening, Period::Month).to_string(), "2024-03");
        assert_eq!(PeriodKey::of(&late_evening, Period::Year).to_string(), "2024");
    }

    #[test]
    fn week_keys_follow_iso_years() {
        let key = PeriodKey::of(&ts("2021-01-03T10:00:00+00:00"), Period::Week);
        assert_eq!(key.to_string(), "2020-W53");
        assert_eq!(key.succ().unwrap().to_string(), "2021-W01");
    }

    #[test]
    fn period_key_text_form_parses_back() {
        for text in ["2024-02-29", "2024-W09", "2024-12", "1999"] {
            let key: PeriodKey = text.parse().unwrap();
            assert_eq!(key.to_string(), text);
        }
        assert!("2024-13".parse::<PeriodKey>().is_err());
        assert!("not-a-key".parse::<PeriodKey>().is_err());
    }

    #[test]
    fn month_successor_rolls_over_year() {
        let dec = PeriodKey::Month { year: 2023, month: 12 };
        assert_eq!(dec.succ(), Some(PeriodKey::Month { year: 2024, month: 1 }));
    }
}
