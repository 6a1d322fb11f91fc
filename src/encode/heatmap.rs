use crate::aggregate::DayGrid;
use crate::model::CommitSeries;
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

pub const DEFAULT_LEVELS: u8 = 5;
pub const WINDOW_DAYS: i64 = 365;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatmapOptions {
    pub levels: u8,
    pub thresholds: Option<Vec<u32>>,
}

impl Default for HeatmapOptions {
    fn default() -> Self {
        Self {
            levels: DEFAULT_LEVELS,
            thresholds: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatCell {
    pub date: NaiveDate,
    pub count: u32,
    pub level: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heatmap {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub levels: u8,
    pub max_count: u32,
    pub cells: Vec<HeatCell>,
}

impl Heatmap {
    fn lead(&self) -> usize {
        self.start.weekday().num_days_from_monday() as usize
    }

    pub fn weeks(&self) -> usize {
        (self.lead() + self.cells.len()).div_ceil(7)
    }

    pub fn columns(&self) -> Vec<[Option<&HeatCell>; 7]> {
        let lead = self.lead();
        let mut columns = vec![[None; 7]; self.weeks()];
        for (i, cell) in self.cells.iter().enumerate() {
            let slot = lead + i;
            columns[slot / 7][slot % 7] = Some(cell);
        }
        columns
    }

    pub fn total(&self) -> u64 {
        self.cells.iter().map(|c| c.count as u64).sum()
    }
}

pub fn build_heatmap(series: &CommitSeries, anchor: NaiveDate, options: &HeatmapOptions) -> Heatmap {
    let start = anchor - Duration::days(WINDOW_DAYS - 1);
    let grid = DayGrid::over(series, start, anchor);
    let max_count = grid.counts().iter().copied().max().unwrap_or(0);

    let cells = grid
        .days()
        .map(|(date, count)| HeatCell {
            date,
            count,
            level: intensity(count, max_count, options),
        })
        .collect();

    Heatmap {
        start,
        end: anchor,
        levels: options.levels.max(2),
        max_count,
        cells,
    }
}

/// Maps a day's count to a level in `0..levels`. Zero always maps to 0.
pub fn intensity(count: u32, max_count: u32, options: &HeatmapOptions) -> u8 {
    let top = options.levels.max(2) - 1;
    if count == 0 {
        return 0;
    }

    let level = match &options.thresholds {
        Some(thresholds) if !thresholds.is_empty() => {
            thresholds.iter().filter(|&&t| count >= t).count()
        }
        _ if max_count == 0 => 0,
        _ => (count as u64 * top as u64).div_ceil(max_count as u64) as usize,
    };

    level.clamp(1, top as usize) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::*;
    use pretty_assertions::assert_eq;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn equal_width_bins_keep_zero_lowest() {
        let opts = HeatmapOptions::default();
        assert_eq!(intensity(0, 8, &opts), 0);
        assert_eq!(intensity(1, 8, &opts), 1);
        assert_eq!(intensity(2, 8, &opts), 1);
        assert_eq!(intensity(3, 8, &opts), 2);
        assert_eq!(intensity(6, 8, &opts), 3);
        assert_eq!(intensity(8, 8, &opts), 4);
    }

    #[test]
    fn explicit_thresholds_bin_counts() {
        let opts = HeatmapOptions {
            levels: 5,
            thresholds: Some(vec![1, 3, 6, 10]),
        };
        assert_eq!(intensity(0, 20, &opts), 0);
        assert_eq!(intensity(2, 20, &opts), 1);
        assert_eq!(intensity(3, 20, &opts), 2);
        assert_eq!(intensity(9, 20, &opts), 3);
        assert_eq!(intensity(25, 20, &opts), 4);
    }

    #[test]
    fn window_ends_at_anchor_and_spans_a_year() {
        let s = daily(&["2023-01-01", "2024-06-01", "2024-06-01", "2024-06-03"]);
        let map = build_heatmap(&s, date("2024-06-03"), &HeatmapOptions::default());
        assert_eq!(map.cells.len(), 365);
        assert_eq!(map.end, date("2024-06-03"));
        assert_eq!(map.max_count, 2);
        assert_eq!(map.total(), 3);
        let last = map.cells.last().unwrap();
        assert_eq!((last.count, last.level), (1, 2));
    }

    #[test]
    fn grid_columns_are_monday_first_weeks() {
        let map = build_heatmap(&CommitSeries::new(), date("2024-06-05"), &HeatmapOptions::default());
        assert!(map.weeks() == 53 || map.weeks() == 54);
        let columns = map.columns();
        assert_eq!(columns.len(), map.weeks());
        let first = columns[0].iter().flatten().next().unwrap();
        assert_eq!(first.date, map.start);
        let last_col = columns.last().unwrap();
        assert_eq!(last_col[2].unwrap().date, date("2024-06-05"));
        assert!(last_col[3].is_none());
        assert_eq!(map.max_count, 0);
        assert!(map.cells.iter().all(|c| c.level == 0));
    }
}
