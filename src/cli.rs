// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `pageflow`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pageflow",
    version,
    about = "Build pages, scripts, styles and static assets into a deployable tree.",
    long_about = None
)]
pub struct CliArgs {
    /// Project directory all configured paths are resolved against.
    ///
    /// Default: the current working directory.
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Path to the project config file (TOML), relative to `--cwd`.
    #[arg(long, value_name = "PATH", default_value = crate::config::DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PAGEFLOW_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

/// The published top-level tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Clean, compile, bundle and minify into the dist directory.
    Build,
    /// Compile once, then serve and rebuild on change.
    Start,
    /// Remove the temp and dist directories.
    Clean,
    /// Print the task trees without running anything.
    Tasks,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
