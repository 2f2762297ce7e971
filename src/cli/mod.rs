//! CLI interface using clap.
//!
//! Provides command-line arguments and subcommands for the tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use cursorlog::application::OutputFormat;

/// cursorlog - print only what was appended to log files since the last run.
#[derive(Parser, Debug)]
#[command(name = "cursorlog")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging (use multiple times for more verbosity).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to the cursor state file (overrides the config file).
    #[arg(short, long, global = true)]
    pub state: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print lines appended to each file since its last committed cursor.
    Tail {
        /// Files to tail.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Prefix each line with the name of its file.
        #[arg(short = 'H', long)]
        with_filename: bool,
    },

    /// Forget the cursors of the given files so they are read from the start.
    Reset {
        /// Files whose cursors are removed.
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Set the cursor of a file to a byte offset (negative values become 0).
    ResetTo {
        /// File whose cursor is set.
        file: PathBuf,

        /// Byte offset to resume from.
        #[arg(allow_negative_numbers = true)]
        offset: i64,
    },

    /// Show stored cursors with the current size of each file.
    Show {
        /// Output format: table or json.
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Show the effective configuration.
    Config {
        /// Write the default config file if none exists.
        #[arg(long)]
        init: bool,
    },
}

impl Commands {
    /// Parse the output format of `show`.
    pub fn output_format(&self) -> Result<OutputFormat, String> {
        match self {
            Self::Show { format } => format.parse(),
            _ => Ok(OutputFormat::default()),
        }
    }
}
