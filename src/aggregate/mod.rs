pub mod calendar;
pub mod churn;
pub mod insights;
pub mod period;
pub mod streak;

pub use calendar::DayGrid;
pub use churn::{churn_ranking, ChurnEntry};
pub use insights::{classify, insights, CommitType, Contributor, Insights, Peak, TypeCount};
pub use period::{fill_gaps, period_counts, velocity, PeriodCount, VelocityReport, VelocityRow};
pub use streak::{compute_streaks, StreakState};
