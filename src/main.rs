use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use tomo::cli::args::{Cli, Commands, OutputFormat};
use tomo::cli::commands;
use tomo::config::{Config, Paths};
use tomo::error::TomoError;
use tomo::logging::{default_level, init_logging};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(default_level(cli.verbose));

    let output = match cli.command {
        Commands::Completions { shell } => commands::completions(shell)?,
        command => dispatch(command, cli.output)?,
    };

    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}

fn dispatch(command: Commands, format: OutputFormat) -> Result<String, TomoError> {
    let paths = Paths::new()?;
    let config = Config::load_from_path(&paths.config_file)?;

    if !matches!(command, Commands::Config(_)) {
        commands::merge_pending(&paths);
    }

    match command {
        Commands::Start(args) => commands::start(&paths, &config, args, format),
        Commands::Break(args) => commands::take_break(&paths, &config, &args, format),
        Commands::Stats => commands::stats(&paths, &config, format),
        Commands::History(args) => commands::history(&paths, &args, format),
        Commands::Export(args) => commands::export(&paths, &config, &args, format),
        Commands::Config(args) => commands::config(&paths, &config, args, format),
        Commands::Completions { shell } => commands::completions(shell),
    }
}
