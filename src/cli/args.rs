use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use serde::{Deserialize, Serialize};

use crate::features::export::ExportFormat;
use crate::features::focus::{SessionKind, SoundKind};
use crate::features::stats::WeekBoundary;

#[derive(Parser)]
#[command(name = "tomo")]
#[command(about = "A Pomodoro focus timer with session history and statistics")]
#[command(long_about = "tomo - a focus timer for the terminal

Runs focus and break countdowns, keeps a log of every finished session,
and turns that log into streaks and totals.

QUICK START:
  tomo start                 25-minute focus session
  tomo start -d 50m -n \"essay\"   50 minutes, with a note
  tomo break                 5-minute break
  tomo stats                 Today, this week, this month, all time
  tomo history               Recent sessions

DURING A SESSION:
  q, Esc, Ctrl+C    Cancel (the partial session is still logged)
  e                 Add time to a break

OUTPUT FORMATS:
  --output pretty    Human-readable colored output (default)
  --output json      Machine-readable JSON for scripting

Data lives in ~/.tomo/. For more information on a specific command, run:
  tomo <command> --help")]
#[command(version, propagate_version = true)]
pub struct Cli {
    /// Output format for command results
    ///
    /// Use 'pretty' for human-readable colored output (default),
    /// or 'json' for machine-readable output suitable for scripting.
    #[arg(short, long, value_enum, default_value = "pretty", global = true)]
    pub output: OutputFormat,

    /// Log debug details to stderr (RUST_LOG overrides this)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for command results.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable colored output.
    #[default]
    Pretty,
    /// Machine-readable JSON output.
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start a focus session
    ///
    /// Counts down in the terminal and logs the session when it finishes
    /// or is cancelled. When the session completes and auto_break is on,
    /// you are offered a break.
    ///
    /// # Examples
    ///
    ///   tomo start                       Default duration (25m)
    ///   tomo s -d 50m                    Short alias, 50 minutes
    ///   tomo start -n "chapter 3"        Attach a note
    ///   tomo start --sound rain          Ask for rain sounds
    #[command(alias = "s")]
    Start(StartArgs),

    /// Start a break
    ///
    /// Breaks can be extended while running by pressing 'e'.
    ///
    /// # Examples
    ///
    ///   tomo break                       Default break (5m)
    ///   tomo b -d 15m                    Longer break
    #[command(alias = "b")]
    Break(BreakArgs),

    /// Show focus statistics
    ///
    /// Totals for today, this week, this month and all time, the current
    /// and longest streak, and the average focus session length.
    ///
    /// # Examples
    ///
    ///   tomo stats
    ///   tomo stats -o json
    Stats,

    /// Show recent sessions, newest first
    ///
    /// # Examples
    ///
    ///   tomo history                     Last 10 sessions
    ///   tomo history -l 50 --kind focus
    ///   tomo history --from monday
    ///   tomo history --from 2026-03-01 --to 2026-03-31
    History(HistoryArgs),

    /// Export sessions to JSON or CSV
    ///
    /// Writes to ~/.tomo/exports/ unless --out is given.
    ///
    /// # Examples
    ///
    ///   tomo export                      JSON, all sessions
    ///   tomo export -f csv --out week.csv --from 7d
    Export(ExportArgs),

    /// Show or change configuration
    ///
    /// With no flags, prints the current configuration.
    ///
    /// # Examples
    ///
    ///   tomo config
    ///   tomo config --duration 50 --break-duration 10
    ///   tomo config --auto-break off --week iso
    ///   tomo config --focus-sound rain --volume 30
    Config(ConfigArgs),

    /// Generate shell completions
    ///
    /// # Examples
    ///
    ///   tomo completions bash > ~/.bash_completion.d/tomo
    ///   tomo completions zsh > ~/.zfunc/_tomo
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments for starting a focus session.
#[derive(Args, Debug, Default)]
pub struct StartArgs {
    /// Session duration (e.g., 25, 25m, 1h30m, 90s)
    #[arg(long, short = 'd')]
    pub duration: Option<String>,

    /// Note to attach to the session
    #[arg(long, short = 'n')]
    pub note: Option<String>,

    /// Ambient sound to request
    #[arg(long, value_enum)]
    pub sound: Option<SoundKind>,

    /// Sound volume (0-100)
    #[arg(long)]
    pub volume: Option<u8>,
}

/// Arguments for starting a break.
#[derive(Args, Debug, Default)]
pub struct BreakArgs {
    /// Break duration (e.g., 5, 5m, 90s)
    #[arg(long, short = 'd')]
    pub duration: Option<String>,
}

/// Filters shared by history and export.
#[derive(Args, Debug, Default, Clone)]
pub struct FilterArgs {
    /// Only sessions of this kind
    #[arg(long, value_enum)]
    pub kind: Option<SessionKind>,

    /// Only sessions on or after this date (YYYY-MM-DD, today, monday, 7d, ...)
    #[arg(long)]
    pub from: Option<String>,

    /// Only sessions on or before this date
    #[arg(long)]
    pub to: Option<String>,
}

/// Arguments for history.
#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Maximum number of sessions to show
    #[arg(long, short = 'l', default_value = "10")]
    pub limit: usize,

    #[command(flatten)]
    pub filter: FilterArgs,
}

/// Arguments for export.
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Export format (defaults to export.format from the config)
    #[arg(long, short = 'f', value_enum)]
    pub format: Option<ExportFormat>,

    /// Destination file
    #[arg(long)]
    pub out: Option<std::path::PathBuf>,

    #[command(flatten)]
    pub filter: FilterArgs,
}

/// On/off switch for boolean settings.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Toggle {
    /// Enable
    On,
    /// Disable
    Off,
}

impl Toggle {
    /// As a boolean.
    #[must_use]
    pub const fn enabled(self) -> bool {
        matches!(self, Self::On)
    }
}

/// Arguments for config.
#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// Default focus duration in minutes
    #[arg(long)]
    pub duration: Option<u32>,

    /// Break duration in minutes
    #[arg(long)]
    pub break_duration: Option<u32>,

    /// Minutes added when a break is extended
    #[arg(long)]
    pub extend_increment: Option<u32>,

    /// Offer a break after each completed focus session
    #[arg(long, value_enum)]
    pub auto_break: Option<Toggle>,

    /// Turn sound on or off
    #[arg(long, value_enum)]
    pub sound: Option<Toggle>,

    /// Ambient sound for focus sessions
    #[arg(long, value_enum)]
    pub focus_sound: Option<SoundKind>,

    /// Sound volume (0-100)
    #[arg(long)]
    pub volume: Option<u8>,

    /// Default export format
    #[arg(long, value_enum)]
    pub export_format: Option<ExportFormat>,

    /// Default export directory
    #[arg(long)]
    pub export_dir: Option<std::path::PathBuf>,

    /// How "this week" is counted in stats
    #[arg(long, value_enum)]
    pub week: Option<WeekBoundary>,
}

impl ConfigArgs {
    /// Whether any setting was given.
    #[must_use]
    pub const fn has_changes(&self) -> bool {
        self.duration.is_some()
            || self.break_duration.is_some()
            || self.extend_increment.is_some()
            || self.auto_break.is_some()
            || self.sound.is_some()
            || self.focus_sound.is_some()
            || self.volume.is_some()
            || self.export_format.is_some()
            || self.export_dir.is_some()
            || self.week.is_some()
    }
}
