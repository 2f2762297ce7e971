//! cursorlog - print what was appended to log files since the last run.
//!
//! Each file's read position is kept in a JSON state file. Running
//! `cursorlog tail` prints only the lines added since the previous run and
//! then records the new positions.
//!
//!   cursorlog tail /var/log/app.log       # New lines since last run
//!   cursorlog show                        # Stored cursors and unread bytes
//!   cursorlog reset /var/log/app.log      # Read from the start next time
//!   cursorlog reset-to app.log 1024       # Resume from a given offset

mod cli;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};
use cursorlog::application::{
    format_cursors_json, format_cursors_table, format_tail_summary, tail_files, CursorLog,
    OutputFormat, TailOptions,
};
use cursorlog::domain::{self, AppConfig, AppError};
use cursorlog::infrastructure::{ensure_config_exists, load_config, render_config};

fn main() {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose);

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

/// Main application logic. Returns `false` when some files failed but the run completed.
fn run(cli: Cli) -> domain::Result<bool> {
    let format = cli
        .command
        .output_format()
        .map_err(|message| AppError::Config { message })?;

    let config = load_config()?;
    let state_path = config.state_path(cli.state.as_deref());

    match cli.command {
        Commands::Tail {
            files,
            with_filename,
        } => {
            let options = TailOptions {
                with_filename: with_filename || config.tail.with_filename,
            };
            return cmd_tail(&state_path, &files, options, cli.verbose);
        }
        Commands::Reset { files } => {
            cmd_reset(&state_path, &files)?;
        }
        Commands::ResetTo { file, offset } => {
            cmd_reset_to(&state_path, &file, offset)?;
        }
        Commands::Show { .. } => {
            cmd_show(&state_path, format)?;
        }
        Commands::Config { init } => {
            cmd_config(&state_path, init)?;
        }
    }

    Ok(true)
}

/// Tail files and persist their new cursors.
fn cmd_tail(
    state_path: &Path,
    files: &[PathBuf],
    options: TailOptions,
    verbose: u8,
) -> domain::Result<bool> {
    let log = CursorLog::new(state_path)?;
    tracing::info!(state = %state_path.display(), files = files.len(), "Tailing");

    let out = Mutex::new(std::io::BufWriter::new(std::io::stdout()));
    let summary = tail_files(&log, files, options, &out);

    let flushed = out
        .into_inner()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .flush();

    // Save even if output failed: every committed cursor covers printed lines only.
    log.close()?;
    flushed.map_err(|e| AppError::io("Failed to flush output", e))?;

    if summary.has_failures() || verbose > 0 {
        eprintln!("{}", format_tail_summary(&summary));
    }

    Ok(!summary.has_failures())
}

/// Forget cursors for files.
fn cmd_reset(state_path: &Path, files: &[PathBuf]) -> domain::Result<()> {
    let log = CursorLog::new(state_path)?;

    for file in files {
        log.reset(file);
        println!("{} {}", "✓".green(), log.resolve(file).display());
    }

    log.close()?;
    tracing::info!(state = %state_path.display(), files = files.len(), "Cursors reset");

    Ok(())
}

/// Set one file's cursor.
fn cmd_reset_to(state_path: &Path, file: &Path, offset: i64) -> domain::Result<()> {
    let log = CursorLog::new(state_path)?;
    log.reset_to(file, offset);
    log.close()?;

    println!(
        "{} {} → {}",
        "✓".green(),
        log.resolve(file).display(),
        offset.max(0).to_string().cyan()
    );

    Ok(())
}

/// Show stored cursors.
fn cmd_show(state_path: &Path, format: OutputFormat) -> domain::Result<()> {
    let log = CursorLog::new(state_path)?;
    let cursors = log.cursors();

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                format_cursors_json(&cursors).map_err(AppError::json_parse)?
            );
        }
        OutputFormat::Table => {
            if cursors.is_empty() {
                println!("No cursors stored in {}", state_path.display());
            } else {
                println!("{}", format_cursors_table(&cursors));
            }
        }
    }

    Ok(())
}

/// Show the effective configuration, optionally writing the default file.
fn cmd_config(state_path: &Path, init: bool) -> domain::Result<()> {
    let config_path = AppConfig::config_file_path();

    if init {
        if ensure_config_exists(&config_path)? {
            println!("{} Created {}", "✓".green(), config_path.display());
        } else {
            println!("Config already exists at {}", config_path.display());
        }
    }

    let config = load_config()?;

    println!("{} {}", "Config file:".bold(), config_path.display());
    println!("{} {}", "State file:".bold(), state_path.display());
    println!();
    print!("{}", render_config(&config)?);

    Ok(())
}

/// Setup tracing/logging based on verbosity level.
fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .with(filter)
        .init();
}
