//! Statistics module.
//!
//! Derives productivity figures from the session log:
//! - Totals for today, this week, this month and all time
//! - Focus streaks
//! - Average focus length
//! - Terminal charts for the last seven days

pub mod metrics;
pub mod visualization;

pub use metrics::{DailyFocus, PeriodTotals, StatsSnapshot, StreakInfo, WeekBoundary};
pub use visualization::{render_bar_chart, render_sparkline};
