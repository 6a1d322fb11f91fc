use crate::model::CommitSeries;
use chrono::{Duration, NaiveDate};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayGrid {
    start: NaiveDate,
    counts: Vec<u32>,
}

impl DayGrid {
    pub fn spanning(series: &CommitSeries) -> Option<Self> {
        let start = series.iter().map(|c| c.day()).min()?;
        let end = series.iter().map(|c| c.day()).max()?;
        Some(Self::over(series, start, end))
    }

    pub fn over(series: &CommitSeries, start: NaiveDate, end: NaiveDate) -> Self {
        let len = if end < start {
            0
        } else {
            (end - start).num_days() as usize + 1
        };
        let mut counts = vec![0u32; len];
        for commit in series {
            let offset = (commit.day() - start).num_days();
            if offset >= 0 && (offset as usize) < len {
                counts[offset as usize] += 1;
            }
        }
        Self { start, counts }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    pub fn date_at(&self, offset: usize) -> NaiveDate {
        self.start + Duration::days(offset as i64)
    }

    pub fn days(&self) -> impl Iterator<Item = (NaiveDate, u32)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .map(|(i, &count)| (self.date_at(i), count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn spanning_marks_inactive_gap_days() {
        let grid = DayGrid::spanning(&daily(&["2024-01-01", "2024-01-01", "2024-01-04"])).unwrap();
        assert_eq!(grid.start(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(grid.counts(), &[2, 0, 0, 1]);
    }

    #[test]
    fn empty_series_has_no_grid() {
        assert!(DayGrid::spanning(&CommitSeries::new()).is_none());
    }

    #[test]
    fn over_ignores_commits_outside_range() {
        let s = daily(&["2023-12-31", "2024-01-02", "2024-01-05"]);
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        assert_eq!(DayGrid::over(&s, start, end).counts(), &[0, 1, 0]);
    }
}
