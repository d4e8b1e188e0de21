//! Focus mode command implementation.
//!
//! Runs focus and break countdowns in the terminal, logs the finished
//! session, and offers a break after a completed focus session.

use std::fmt;
use std::io::{IsTerminal, Write};

use chrono::Local;
use colored::Colorize;
use crossterm::cursor::MoveToColumn;
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};

use crate::cli::args::{BreakArgs, OutputFormat, StartArgs};
use crate::config::{Config, Paths};
use crate::error::TomoError;
use crate::features::focus::{
    cancel_on_interrupt, default_ticks, format_seconds_short, parse_duration, render_progress_bar,
    run_countdown, CancellationToken, SessionKind, SessionRecord, SoundRequest, SystemClock,
    TerminalBell, Timer, TimerSession, TimerState,
};
use crate::features::stats::StatsSnapshot;
use crate::output::{format_quick_stats, format_record_pretty, to_json};
use crate::storage::SessionRecorder;

/// Run a focus session.
///
/// # Errors
///
/// Returns an error for an invalid duration or volume, or when the finished
/// session cannot be saved.
pub fn start(
    paths: &Paths,
    config: &Config,
    args: StartArgs,
    format: OutputFormat,
) -> Result<String, TomoError> {
    let duration = resolve_duration(args.duration.as_deref(), config.focus.focus_seconds())?;
    let sound = sound_request(config, &args);
    if let Some(request) = &sound {
        request.validate()?;
    }

    let runner = SessionRunner::new(paths, config, format);
    let mut record = runner.run(SessionKind::Focus, duration, args.note, sound)?;

    if format == OutputFormat::Json {
        return to_json(&record);
    }

    let mut output = runner.summary(&record)?;

    while record.suggests_break() && config.focus.auto_break {
        let Some((kind, seconds)) = prompt_break(config) else {
            output.push_str(&format!(
                "\n\n   {}",
                "Time for a break? 'tomo break'".dimmed()
            ));
            break;
        };
        println!("{output}\n");
        let next_sound = if kind == SessionKind::Focus { sound } else { None };
        record = runner.run(kind, seconds, None, next_sound)?;
        output = runner.summary(&record)?;
    }

    Ok(output)
}

/// Run a break.
///
/// # Errors
///
/// Returns an error for an invalid duration, or when the finished break
/// cannot be saved.
pub fn take_break(
    paths: &Paths,
    config: &Config,
    args: &BreakArgs,
    format: OutputFormat,
) -> Result<String, TomoError> {
    let duration = resolve_duration(args.duration.as_deref(), config.focus.break_seconds())?;

    let runner = SessionRunner::new(paths, config, format);
    let record = runner.run(SessionKind::Break, duration, None, None)?;

    match format {
        OutputFormat::Json => to_json(&record),
        OutputFormat::Pretty => {
            let mut output = runner.summary(&record)?;
            output.push_str(&format!(
                "\n\n   {}",
                "Ready to focus again? 'tomo start'".dimmed()
            ));
            Ok(output)
        }
    }
}

/// Parse a duration flag, falling back to the configured default.
fn resolve_duration(input: Option<&str>, default_seconds: u64) -> Result<u64, TomoError> {
    let Some(input) = input else {
        return Ok(default_seconds);
    };
    parse_duration(input)
        .and_then(|d| u64::try_from(d.num_seconds()).ok())
        .filter(|&seconds| seconds > 0)
        .ok_or_else(|| {
            TomoError::Validation(format!(
                "invalid duration '{input}' (try 25, 25m, 1h30m or 90s)"
            ))
        })
}

/// Flags win over the config. Explicit flags request sound even when it is
/// switched off in the config.
fn sound_request(config: &Config, args: &StartArgs) -> Option<SoundRequest> {
    if args.sound.is_none() && args.volume.is_none() {
        return config.sound.focus_request();
    }
    Some(SoundRequest {
        kind: args.sound.unwrap_or(config.sound.focus_sound),
        volume: args.volume.unwrap_or(config.sound.volume),
    })
}

/// Runs one session at a time and records it.
///
/// SIGINT and SIGTERM set the runner's token, so an interrupted countdown
/// still ends with a cancelled record.
struct SessionRunner<'a> {
    config: &'a Config,
    format: OutputFormat,
    recorder: SessionRecorder,
    token: CancellationToken,
}

impl<'a> SessionRunner<'a> {
    fn new(paths: &Paths, config: &'a Config, format: OutputFormat) -> Self {
        let token = CancellationToken::new();
        if let Err(e) = cancel_on_interrupt(&token) {
            tracing::warn!(error = %e, "interrupted sessions will not be recorded");
        }
        Self {
            config,
            format,
            recorder: SessionRecorder::from_paths(paths),
            token,
        }
    }

    const fn live(&self) -> bool {
        matches!(self.format, OutputFormat::Pretty)
    }

    fn run(
        &self,
        kind: SessionKind,
        duration_seconds: u64,
        note: Option<String>,
        sound: Option<SoundRequest>,
    ) -> Result<SessionRecord, TomoError> {
        let mut timer = Timer::new(
            Box::new(SystemClock),
            Box::new(TerminalBell::new(self.config.sound.enabled)),
        );
        timer.start(kind, duration_seconds, note, sound)?;
        self.token.reset();

        if self.live() {
            println!("{}", banner(kind, duration_seconds));
        }

        let record = {
            let mut ticks = default_ticks();
            if let Some(session) = timer.session() {
                self.render(session, TimerState::Running);
            }
            run_countdown(
                &mut timer,
                ticks.as_mut(),
                &self.token,
                self.config.focus.extend_seconds(),
                |session, state| self.render(session, state),
            )?
        };

        if self.live() {
            println!();
        }

        self.recorder.record(&record)?;

        if record.is_completed() && self.live() {
            TerminalBell::new(self.config.sound.enabled).ring();
        }

        Ok(record)
    }

    fn render(&self, session: &TimerSession, state: TimerState) {
        if !self.live() {
            return;
        }
        let mut stdout = std::io::stdout();
        let result = crossterm::queue!(
            stdout,
            MoveToColumn(0),
            Print(countdown_line(session, state)),
            Clear(ClearType::UntilNewLine)
        )
        .and_then(|()| stdout.flush());
        if let Err(e) = result {
            tracing::debug!(error = %e, "could not draw countdown");
        }
    }

    fn summary(&self, record: &SessionRecord) -> Result<String, TomoError> {
        let log = self.recorder.store().load_all()?;
        let stats = StatsSnapshot::compute(&log, Local::now(), self.config.stats.week);
        Ok(format!(
            "{}\n\n   {}",
            format_record_pretty(record),
            format_quick_stats(&stats).dimmed()
        ))
    }
}

fn banner(kind: SessionKind, duration_seconds: u64) -> String {
    let (icon, keys) = match kind {
        SessionKind::Focus => ("🎯", "q to stop"),
        SessionKind::Break => ("☕", "e to extend, q to stop"),
    };
    format!(
        "{} {} for {}  {}",
        icon,
        format!("{} session", kind.display_name()).green(),
        format_seconds_short(duration_seconds),
        format!("({keys})").dimmed()
    )
}

fn countdown_line(session: &TimerSession, state: TimerState) -> String {
    let icon = session
        .sound_request
        .filter(|r| !r.is_empty())
        .map_or("⏱️", |r| r.kind.icon());
    let extended = if session.extended_seconds > 0 {
        format!(" +{}", format_seconds_short(session.extended_seconds))
    } else {
        String::new()
    };
    let marker = if state == TimerState::Extended { " ⏩" } else { "" };

    format!(
        "{} {} {} {:>3.0}%{}{}",
        icon,
        session.format_remaining().bold(),
        render_progress_bar(session.progress(), 30),
        session.progress() * 100.0,
        extended,
        marker
    )
}

/// What to do after a completed focus session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BreakChoice {
    Regular(u64),
    Extended(u64),
    Skip,
    NextFocus(u64),
}

impl fmt::Display for BreakChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Regular(seconds) => write!(f, "Start break ({})", format_seconds_short(*seconds)),
            Self::Extended(seconds) => {
                write!(f, "Extended break ({})", format_seconds_short(*seconds))
            }
            Self::Skip => write!(f, "Skip break"),
            Self::NextFocus(seconds) => {
                write!(f, "Start next focus session ({})", format_seconds_short(*seconds))
            }
        }
    }
}

impl BreakChoice {
    fn options(config: &Config) -> Vec<Self> {
        let regular = config.focus.break_seconds();
        vec![
            Self::Regular(regular),
            Self::Extended(regular.saturating_add(config.focus.extend_seconds())),
            Self::Skip,
            Self::NextFocus(config.focus.focus_seconds()),
        ]
    }

    /// The session to run next, if any.
    const fn next_session(self) -> Option<(SessionKind, u64)> {
        match self {
            Self::Regular(seconds) | Self::Extended(seconds) => Some((SessionKind::Break, seconds)),
            Self::Skip => None,
            Self::NextFocus(seconds) => Some((SessionKind::Focus, seconds)),
        }
    }
}

/// Ask what comes next. Non-interactive runs skip it.
fn prompt_break(config: &Config) -> Option<(SessionKind, u64)> {
    if !std::io::stdin().is_terminal() {
        return None;
    }
    match inquire::Select::new("Take a break?", BreakChoice::options(config))
        .with_help_message("Esc to skip")
        .prompt()
    {
        Ok(choice) => choice.next_session(),
        Err(e) => {
            tracing::debug!(error = %e, "break prompt dismissed");
            None
        }
    }
}
