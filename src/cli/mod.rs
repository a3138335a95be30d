//! Command-line interface for reportcheck
//!
//! `reportcheck [SOURCE]` runs the compile check; `reportcheck config ...`
//! inspects the effective configuration.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;
mod output;

pub use output::Output;

use commands::check::{CheckArgs, OutputFormat};
use commands::config::ConfigCommands;
use crate::errors::DriverError;

/// Compile every report template and fail if any of them is broken
#[derive(Parser)]
#[command(
    name = "reportcheck",
    version,
    about = "Compile every report template and fail if any of them is broken",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    /// Directory containing report templates [default: templates]
    #[arg(value_name = "SOURCE")]
    pub source: Option<PathBuf>,

    /// Directory compiled reports are written to [default: target/compiled]
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Output format for the run summary
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Run as if started in <DIR> instead of current working directory
    #[arg(short = 'C', long = "directory", value_name = "DIR", global = true)]
    pub directory: Option<PathBuf>,

    /// Increase verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Use custom configuration file
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

impl Cli {
    /// Execute the CLI command
    pub async fn run(self) -> Result<()> {
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir).map_err(|e| {
                DriverError::Config(format!("cannot change to directory '{}': {e}", dir.display()))
            })?;
        }

        setup_logging(self.verbose, self.quiet);

        let json = matches!(self.format, OutputFormat::Json);
        // JSON goes to stdout alone
        let output = Output::new(self.verbose > 0, self.quiet || json);

        match self.command {
            Some(Commands::Config(cmd)) => commands::config::execute(cmd, self.config.as_deref(), &output),
            None => {
                let args = CheckArgs {
                    source: self.source,
                    output: self.output,
                    format: self.format,
                };
                commands::check::execute(args, self.config.as_deref(), &output).await
            }
        }
    }
}

fn setup_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => tracing_subscriber::EnvFilter::new("warn"),
        1 => tracing_subscriber::EnvFilter::new("info,ignore=warn,globset=warn"),
        2 => tracing_subscriber::EnvFilter::new("debug,ignore=warn,globset=warn"),
        _ => tracing_subscriber::EnvFilter::new("trace"),
    });

    // Logs share stderr with failure diagnostics
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
