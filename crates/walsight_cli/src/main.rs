//! walsight CLI
//!
//! Read-only inspection of consensus log directories.
//!
//! # Commands
//!
//! - `dump` - Print the decoded records of a WAL directory
//! - `entry-types` - List the entry type names accepted by `--entry-type`
//! - `version` - Show version information

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Decodes and prints the entries of a consensus write-ahead log.
#[derive(Parser)]
#[command(name = "walsight")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the decoded records of a WAL directory
    Dump {
        /// Directory holding the WAL segment files
        wal_dir: PathBuf,

        /// Comma-separated entry type names to include (default: all)
        #[arg(short, long, default_value = "")]
        entry_type: String,

        /// External decoder program for payloads the built-in decoder does not know
        #[arg(long)]
        stream_decoder: Option<PathBuf>,

        /// Argument passed to the external decoder (repeatable)
        #[arg(long = "stream-decoder-arg", requires = "stream_decoder")]
        stream_decoder_args: Vec<String>,

        /// Records sent to the external decoder (unknown, normal)
        #[arg(long, default_value = "unknown", requires = "stream_decoder")]
        decoder_scope: String,

        /// Maximum wait for one external decoder reply, in milliseconds
        #[arg(long, requires = "stream_decoder")]
        decoder_timeout_ms: Option<u64>,

        /// First entry index to print
        #[arg(short, long)]
        start_index: Option<u64>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// List the entry type names accepted by --entry-type
    EntryTypes,

    /// Show version information
    Version,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the report.
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Dump {
            wal_dir,
            entry_type,
            stream_decoder,
            stream_decoder_args,
            decoder_scope,
            decoder_timeout_ms,
            start_index,
            format,
        } => {
            let options = commands::dump::DumpOptions {
                wal_dir,
                entry_types: entry_type,
                decoder: stream_decoder,
                decoder_args: stream_decoder_args,
                decoder_scope,
                decoder_timeout_ms,
                start_index,
            };
            commands::dump::run(&options, &format)?;
        }
        Commands::EntryTypes => {
            commands::entry_types::run();
        }
        Commands::Version => {
            println!("walsight CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("walsight core v{}", walsight_core::VERSION);
        }
    }

    Ok(())
}
