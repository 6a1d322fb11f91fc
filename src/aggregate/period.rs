use crate::model::{CommitSeries, Period, PeriodKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodCount {
    pub period: PeriodKey,
    pub commits: u64,
    pub lines_added: u64,
    pub lines_removed: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VelocityRow {
    pub period: PeriodKey,
    pub added: u64,
    pub removed: u64,
    pub net: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VelocityReport {
    pub added: u64,
    pub removed: u64,
    pub net: i64,
    pub rows: Vec<VelocityRow>,
}

pub fn period_counts(series: &CommitSeries, period: Period) -> Vec<PeriodCount> {
    let mut buckets: BTreeMap<PeriodKey, PeriodCount> = BTreeMap::new();

    for commit in series {
        let key = PeriodKey::of(&commit.timestamp, period);
        let entry = buckets.entry(key).or_insert_with(|| PeriodCount {
            period: key,
            commits: 0,
            lines_added: 0,
            lines_removed: 0,
        });
        entry.commits += 1;
        entry.lines_added += commit.lines_added();
        entry.lines_removed += commit.lines_removed();
    }

    buckets.into_values().collect()
}

pub fn velocity(series: &CommitSeries, period: Period) -> VelocityReport {
    let rows: Vec<VelocityRow> = period_counts(series, period)
        .into_iter()
        .map(|c| VelocityRow {
            period: c.period,
            added: c.lines_added,
            removed: c.lines_removed,
            net: c.lines_added as i64 - c.lines_removed as i64,
        })
        .collect();

    let added = rows.iter().map(|r| r.added).sum::<u64>();
    let removed = rows.iter().map(|r| r.removed).sum::<u64>();
    VelocityReport {
        added,
        removed,
        net: added as i64 - removed as i64,
        rows,
    }
}

/// Inserts zero-count buckets for every missing period between the first
/// and last entry.
pub fn fill_gaps(counts: &[PeriodCount]) -> Vec<PeriodCount> {
    let (Some(first), Some(last)) = (counts.first(), counts.last()) else {
        return Vec::new();
    };

    let by_key: BTreeMap<PeriodKey, &PeriodCount> = counts.iter().map(|c| (c.period, c)).collect();
    let mut filled = Vec::with_capacity(counts.len());
    let mut key = Some(first.period);

    while let Some(k) = key {
        if k > last.period {
            break;
        }
        filled.push(match by_key.get(&k) {
            Some(c) => (*c).clone(),
            None => PeriodCount {
                period: k,
                commits: 0,
                lines_added: 0,
                lines_removed: 0,
            },
        });
        key = k.succ();
    }
    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::*;
    use pretty_assertions::assert_eq;

    fn keys(counts: &[PeriodCount]) -> Vec<String> {
        counts.iter().map(|c| c.period.to_string()).collect()
    }

    #[test]
    fn empty_series_has_no_buckets() {
        assert!(period_counts(&CommitSeries::new(), Period::Day).is_empty());
        assert_eq!(velocity(&CommitSeries::new(), Period::Month), VelocityReport::default());
    }

    #[test]
    fn counts_are_chronological_per_granularity() {
        let s = daily(&["2024-01-31", "2024-01-31", "2024-02-01", "2023-12-30"]);
        let days = period_counts(&s, Period::Day);
        assert_eq!(keys(&days), vec!["2023-12-30", "2024-01-31", "2024-02-01"]);
        assert_eq!(days[1].commits, 2);

        let months = period_counts(&s, Period::Month);
        assert_eq!(keys(&months), vec!["2023-12", "2024-01", "2024-02"]);

        let years = period_counts(&s, Period::Year);
        assert_eq!(keys(&years), vec!["2023", "2024"]);
        assert_eq!(years[1].commits, 3);
    }

    #[test]
    fn every_commit_lands_in_exactly_one_bucket() {
        let s = daily(&["2024-01-01", "2024-03-09", "2024-03-10", "2025-07-04"]);
        for period in [Period::Day, Period::Week, Period::Month, Period::Year] {
            let total: u64 = period_counts(&s, period).iter().map(|c| c.commits).sum();
            assert_eq!(total, s.len() as u64);
        }
    }

    #[test]
    fn velocity_sums_lines_and_computes_net() {
        let s = series(vec![
            commit_with_files("a", "2024-01-01T08:00:00+00:00", &[("a.rs", 10, 2), ("b.rs", 5, 0)]),
            commit_with_files("b", "2024-01-01T18:00:00+00:00", &[("a.rs", 0, 20)]),
            commit_with_files("c", "2024-01-02T18:00:00+00:00", &[("c.rs", 7, 1)]),
        ]);
        let v = velocity(&s, Period::Day);
        assert_eq!(v.rows.len(), 2);
        assert_eq!((v.rows[0].added, v.rows[0].removed, v.rows[0].net), (15, 22, -7));
        assert_eq!((v.added, v.removed, v.net), (22, 23, -1));
    }

    #[test]
    fn fill_gaps_inserts_zero_buckets() {
        let s = daily(&["2024-01-01", "2024-01-04"]);
        let filled = fill_gaps(&period_counts(&s, Period::Day));
        assert_eq!(keys(&filled), vec!["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-04"]);
        assert_eq!(filled.iter().map(|c| c.commits).collect::<Vec<_>>(), vec![1, 0, 0, 1]);
    }
}
