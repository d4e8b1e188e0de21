//! Config command implementation.

use colored::Colorize;

use crate::cli::args::{ConfigArgs, OutputFormat};
use crate::config::{Config, Paths};
use crate::error::TomoError;
use crate::output::{format_config_pretty, to_json};

/// Show the configuration, or apply the given changes and save it.
///
/// # Errors
///
/// Returns an error if the new values are invalid or the file cannot be
/// written. Nothing is saved in that case.
pub fn config(
    paths: &Paths,
    current: &Config,
    args: ConfigArgs,
    format: OutputFormat,
) -> Result<String, TomoError> {
    let changed = args.has_changes();
    let config = if changed {
        let updated = apply(current.clone(), args);
        updated.save_to_path(&paths.config_file)?;
        tracing::debug!(path = %paths.config_file.display(), "configuration saved");
        updated
    } else {
        current.clone()
    };

    match format {
        OutputFormat::Json => to_json(&config),
        OutputFormat::Pretty => {
            let mut output = format_config_pretty(&config, &config.export_directory(paths));
            if changed {
                output.push_str(&format!(
                    "\n\n{} Saved to {}",
                    "✓".green(),
                    paths.config_file.display()
                ));
            }
            Ok(output)
        }
    }
}

fn apply(mut config: Config, args: ConfigArgs) -> Config {
    if let Some(minutes) = args.duration {
        config.focus.default_duration_minutes = minutes;
    }
    if let Some(minutes) = args.break_duration {
        config.focus.break_duration_minutes = minutes;
    }
    if let Some(minutes) = args.extend_increment {
        config.focus.extend_increment_minutes = minutes;
    }
    if let Some(toggle) = args.auto_break {
        config.focus.auto_break = toggle.enabled();
    }
    if let Some(toggle) = args.sound {
        config.sound.enabled = toggle.enabled();
    }
    if let Some(kind) = args.focus_sound {
        config.sound.focus_sound = kind;
    }
    if let Some(volume) = args.volume {
        config.sound.volume = volume;
    }
    if let Some(format) = args.export_format {
        config.export.format = format;
    }
    if let Some(dir) = args.export_dir {
        config.export.directory = Some(dir);
    }
    if let Some(week) = args.week {
        config.stats.week = week;
    }
    config
}
