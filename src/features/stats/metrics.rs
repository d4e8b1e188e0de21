//! Metric calculations for statistics.
//!
//! Everything here is a pure function of a log snapshot and "now".

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::features::focus::{Completion, SessionKind, SessionRecord};

/// Which days count as "this week".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WeekBoundary {
    /// The seven days ending today
    #[default]
    Rolling,
    /// Monday of the current ISO week through today
    Iso,
}

impl WeekBoundary {
    /// First day of the week that contains `today`.
    #[must_use]
    pub fn start(&self, today: NaiveDate) -> NaiveDate {
        match self {
            Self::Rolling => today - Duration::days(6),
            Self::Iso => today - Duration::days(i64::from(today.weekday().num_days_from_monday())),
        }
    }

    /// Get display name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Rolling => "last 7 days",
            Self::Iso => "since Monday",
        }
    }

    /// Config value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Rolling => "rolling",
            Self::Iso => "iso",
        }
    }
}

impl std::fmt::Display for WeekBoundary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Totals for one period. Only completed sessions count toward time and
/// session counts; cancelled ones are tallied on their own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodTotals {
    /// Seconds spent in completed focus sessions
    pub focus_seconds: u64,
    /// Seconds spent in completed breaks
    pub break_seconds: u64,
    /// Completed focus sessions
    pub focus_sessions: usize,
    /// Completed breaks
    pub break_sessions: usize,
    /// Cancelled sessions of either kind
    pub cancelled_sessions: usize,
}

impl PeriodTotals {
    /// Fold one record into the totals.
    pub fn add(&mut self, record: &SessionRecord) {
        match (record.completion, record.kind) {
            (Completion::Cancelled, _) => self.cancelled_sessions += 1,
            (Completion::Completed, SessionKind::Focus) => {
                self.focus_seconds = self.focus_seconds.saturating_add(record.actual_duration_seconds);
                self.focus_sessions += 1;
            }
            (Completion::Completed, SessionKind::Break) => {
                self.break_seconds = self.break_seconds.saturating_add(record.actual_duration_seconds);
                self.break_sessions += 1;
            }
        }
    }
}

/// Streak information.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakInfo {
    /// Consecutive days with a completed focus session, ending today (or
    /// yesterday when today has none yet)
    pub current: usize,
    /// Longest run ever
    pub longest: usize,
    /// Last day with a completed focus session
    pub last_focus_day: Option<NaiveDate>,
}

impl StreakInfo {
    /// Calculate streaks from the set of days with a completed focus session.
    #[must_use]
    pub fn calculate(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> Self {
        let Some(&last_focus_day) = days.range(..=today).next_back() else {
            return Self::default();
        };

        // A streak is still alive until a full day passes without focus.
        let mut current = 0;
        let mut check_date = if days.contains(&today) {
            today
        } else {
            today - Duration::days(1)
        };
        while days.contains(&check_date) {
            current += 1;
            check_date -= Duration::days(1);
        }

        let mut longest = 0;
        let mut streak = 0;
        let mut prev_date: Option<NaiveDate> = None;

        for &date in days.range(..=today) {
            streak = match prev_date {
                Some(prev) if (date - prev).num_days() == 1 => streak + 1,
                _ => 1,
            };
            longest = longest.max(streak);
            prev_date = Some(date);
        }

        Self {
            current,
            longest,
            last_focus_day: Some(last_focus_day),
        }
    }
}

/// Completed focus time on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyFocus {
    /// Local date
    pub date: NaiveDate,
    /// Completed focus seconds that day
    pub focus_seconds: u64,
}

/// Aggregates derived from the session log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// When the snapshot was computed
    pub generated_at: DateTime<Local>,
    /// Today's totals
    pub today: PeriodTotals,
    /// This week's totals
    pub week: PeriodTotals,
    /// This calendar month's totals
    pub month: PeriodTotals,
    /// Totals over the whole log
    pub all_time: PeriodTotals,
    /// Current streak in days
    pub current_streak_days: usize,
    /// Longest streak in days
    pub longest_streak_days: usize,
    /// All-time completed focus seconds per completed focus session
    pub average_focus_seconds: u64,
    /// Completed focus time for each of the last seven days, oldest first
    pub last_seven_days: Vec<DailyFocus>,
    /// How "this week" was computed
    pub week_boundary: WeekBoundary,
}

impl StatsSnapshot {
    /// Compute every aggregate from a log snapshot.
    #[must_use]
    pub fn compute(log: &[SessionRecord], now: DateTime<Local>, week: WeekBoundary) -> Self {
        let today = now.date_naive();
        let week_start = week.start(today);
        let month_start = today.with_day(1).unwrap_or(today);
        let seven_days_ago = today - Duration::days(6);

        let mut totals = [PeriodTotals::default(); 3];
        let starts = [today, week_start, month_start];
        let mut all_time = PeriodTotals::default();
        let mut focus_days = BTreeSet::new();
        let mut daily: BTreeMap<NaiveDate, u64> = BTreeMap::new();

        for record in log {
            let date = record.local_date();
            all_time.add(record);

            for (period, start) in totals.iter_mut().zip(starts) {
                if date >= start && date <= today {
                    period.add(record);
                }
            }

            if record.kind == SessionKind::Focus && record.is_completed() {
                focus_days.insert(date);
                if date >= seven_days_ago && date <= today {
                    *daily.entry(date).or_default() += record.actual_duration_seconds;
                }
            }
        }

        let streak = StreakInfo::calculate(&focus_days, today);

        let average_focus_seconds = if all_time.focus_sessions == 0 {
            0
        } else {
            all_time.focus_seconds / all_time.focus_sessions as u64
        };

        let last_seven_days = (0..7)
            .map(|offset| {
                let date = seven_days_ago + Duration::days(offset);
                DailyFocus {
                    date,
                    focus_seconds: daily.get(&date).copied().unwrap_or(0),
                }
            })
            .collect();

        let [today_totals, week_totals, month_totals] = totals;

        tracing::debug!(records = log.len(), %week, "computed statistics");

        Self {
            generated_at: now,
            today: today_totals,
            week: week_totals,
            month: month_totals,
            all_time,
            current_streak_days: streak.current,
            longest_streak_days: streak.longest,
            average_focus_seconds,
            last_seven_days,
            week_boundary: week,
        }
    }

    /// Last-seven-day focus minutes, for the sparkline.
    #[must_use]
    pub fn daily_minutes(&self) -> Vec<u64> {
        self.last_seven_days
            .iter()
            .map(|d| d.focus_seconds / 60)
            .collect()
    }
}
