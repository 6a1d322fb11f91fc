use super::calendar::DayGrid;
use crate::model::CommitSeries;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    pub current: u32,
    pub longest: u32,
    pub longest_start: Option<NaiveDate>,
    pub longest_end: Option<NaiveDate>,
}

/// Walks every calendar day from the first to the last commit. Days without
/// commits break a streak.
pub fn compute_streaks(series: &CommitSeries) -> StreakState {
    match DayGrid::spanning(series) {
        Some(grid) => streaks_in(&grid),
        None => StreakState::default(),
    }
}

pub(crate) fn streaks_in(grid: &DayGrid) -> StreakState {
    let mut state = StreakState::default();
    let mut run = 0u32;
    let mut run_start = 0usize;

    for (offset, &count) in grid.counts().iter().enumerate() {
        if count == 0 {
            run = 0;
            continue;
        }
        if run == 0 {
            run_start = offset;
        }
        run += 1;
        if run > state.longest {
            state.longest = run;
            state.longest_start = Some(grid.date_at(run_start));
            state.longest_end = Some(grid.date_at(offset));
        }
        state.current = run;
    }

    state
}
