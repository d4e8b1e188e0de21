use colored::Colorize;

use crate::config::Config;
use crate::features::focus::{format_seconds_short, Completion, SessionKind, SessionRecord};
use crate::features::stats::{render_bar_chart, render_sparkline, PeriodTotals, StatsSnapshot};

fn completion_icon(record: &SessionRecord) -> colored::ColoredString {
    match record.completion {
        Completion::Completed => "[x]".green(),
        Completion::Cancelled => "[-]".red(),
    }
}

fn kind_label(kind: SessionKind) -> colored::ColoredString {
    match kind {
        SessionKind::Focus => format!("{:<5}", kind.as_str()).cyan(),
        SessionKind::Break => format!("{:<5}", kind.as_str()).blue(),
    }
}

/// Format a list of sessions as a pretty table
pub fn format_sessions_pretty(records: &[SessionRecord], title: &str) -> String {
    if records.is_empty() {
        return format!("{title} (0 sessions)\n  No sessions");
    }

    let mut output = format!("{} ({} sessions)\n", title, records.len());
    output.push_str(&"─".repeat(60));
    output.push('\n');

    for record in records {
        let mut line = format!(
            "{} {}  {}  {:>7}",
            completion_icon(record),
            kind_label(record.kind),
            record.started_at.format("%Y-%m-%d %H:%M"),
            format_seconds_short(record.actual_duration_seconds),
        );

        if record.completion == Completion::Cancelled {
            line.push_str(&format!(
                "  {}",
                format!("of {}", format_seconds_short(record.planned_duration_seconds)).dimmed()
            ));
        }

        if let Some(note) = &record.note {
            line.push_str(&format!("  {}", note.bold()));
        }

        output.push_str(&line);
        output.push('\n');
    }

    output
}

/// Summary shown when a session ends
pub fn format_record_pretty(record: &SessionRecord) -> String {
    let (icon, status) = match record.completion {
        Completion::Completed => ("✅", "completed".green()),
        Completion::Cancelled => ("⏹️", "cancelled".yellow()),
    };

    let mut output = vec![format!(
        "{} {} session {}",
        icon,
        record.kind.display_name(),
        status
    )];
    output.push(format!(
        "   Duration: {}",
        format_seconds_short(record.actual_duration_seconds)
    ));
    if record.completion == Completion::Cancelled {
        output.push(format!(
            "   Planned:  {}",
            format_seconds_short(record.planned_duration_seconds)
        ));
    }
    if let Some(note) = &record.note {
        output.push(format!("   Note:     {note}"));
    }

    output.join("\n")
}

fn period_line(label: &str, totals: &PeriodTotals) -> String {
    let mut line = format!(
        "  {:<10} {:>8} focus  {:>3} sessions  {:>8} break",
        label,
        format_seconds_short(totals.focus_seconds),
        totals.focus_sessions,
        format_seconds_short(totals.break_seconds),
    );
    if totals.cancelled_sessions > 0 {
        line.push_str(&format!(
            "  {}",
            format!("({} cancelled)", totals.cancelled_sessions).dimmed()
        ));
    }
    line
}

fn days(n: usize) -> String {
    format!("{} day{}", n, if n == 1 { "" } else { "s" })
}

/// Format statistics as a dashboard
pub fn format_stats_pretty(stats: &StatsSnapshot) -> String {
    let mut output = Vec::new();

    output.push("📊 FOCUS STATISTICS".bold().to_string());
    output.push("─".repeat(60));
    output.push(period_line("Today", &stats.today));
    output.push(period_line(
        &format!("Week ({})", stats.week_boundary.as_str()),
        &stats.week,
    ));
    output.push(period_line("Month", &stats.month));
    output.push(period_line("All time", &stats.all_time));
    output.push(String::new());

    output.push("🔥 STREAK".bold().to_string());
    output.push("─".repeat(60));
    let current = if stats.current_streak_days > 0 {
        days(stats.current_streak_days).green().to_string()
    } else {
        days(0).dimmed().to_string()
    };
    output.push(format!("  Current: {current}"));
    output.push(format!("  Longest: {}", days(stats.longest_streak_days)));
    output.push(format!(
        "  Average focus session: {}",
        if stats.all_time.focus_sessions == 0 {
            "-".to_string()
        } else {
            format_seconds_short(stats.average_focus_seconds)
        }
    ));
    output.push(String::new());

    output.push("📈 LAST 7 DAYS (minutes)".bold().to_string());
    output.push("─".repeat(60));
    let chart: Vec<(String, u64)> = stats
        .last_seven_days
        .iter()
        .map(|d| (d.date.format("%a").to_string(), d.focus_seconds / 60))
        .collect();
    output.push(render_bar_chart(&chart, 3, 30));
    output.push(format!("  Trend: {}", render_sparkline(&stats.daily_minutes())));

    output.join("\n")
}

/// One-line summary shown after a session
pub fn format_quick_stats(stats: &StatsSnapshot) -> String {
    format!(
        "Today: {} in {} focus session{}  ·  Streak: {}",
        format_seconds_short(stats.today.focus_seconds),
        stats.today.focus_sessions,
        if stats.today.focus_sessions == 1 { "" } else { "s" },
        days(stats.current_streak_days)
    )
}

/// Format the configuration
pub fn format_config_pretty(config: &Config, export_dir: &std::path::Path) -> String {
    let on_off = |b: bool| if b { "on".green() } else { "off".red() };

    let mut output = vec!["⚙️  CONFIGURATION".bold().to_string(), "─".repeat(40)];
    output.push(format!(
        "  Focus duration:   {} min",
        config.focus.default_duration_minutes
    ));
    output.push(format!(
        "  Break duration:   {} min",
        config.focus.break_duration_minutes
    ));
    output.push(format!(
        "  Break extension:  {} min",
        config.focus.extend_increment_minutes
    ));
    output.push(format!("  Auto break:       {}", on_off(config.focus.auto_break)));
    output.push(format!("  Sound:            {}", on_off(config.sound.enabled)));
    output.push(format!(
        "  Focus sound:      {} {}",
        config.sound.focus_sound.icon(),
        config.sound.focus_sound
    ));
    output.push(format!("  Volume:           {}", config.sound.volume));
    output.push(format!("  Export format:    {}", config.export.format));
    output.push(format!("  Export directory: {}", export_dir.display()));
    output.push(format!(
        "  Week:             {} ({})",
        config.stats.week,
        config.stats.week.display_name()
    ));

    output.join("\n")
}
