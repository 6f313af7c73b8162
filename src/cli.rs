// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! Every input can also come from the config file or, failing that, from an
//! interactive prompt.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `jarsync`.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "jarsync",
    version,
    about = "Pack a directory into a JAR and keep it updated as files change.",
    long_about = None
)]
pub struct CliArgs {
    /// Directory to package.
    ///
    /// Prompted for when omitted (unless `--no-prompt`).
    #[arg(value_name = "SOURCE")]
    pub source: Option<String>,

    /// Archive to write. Default: `<source basename>.jar`.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<String>,

    /// Seconds between change polls (default 5).
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,

    /// Keep the archive updated after the first build.
    #[arg(long, conflicts_with = "no_watch")]
    pub watch: bool,

    /// Build once and exit.
    #[arg(long)]
    pub no_watch: bool,

    /// Path to a TOML config file.
    ///
    /// Default: `Jarsync.toml` in the current directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Never ask questions; use defaults for anything not given.
    #[arg(long)]
    pub no_prompt: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `JARSYNC_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Validate inputs and list what would be archived, without writing.
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    /// The explicit watch choice, if one was given on the command line.
    pub fn watch_choice(&self) -> Option<bool> {
        match (self.watch, self.no_watch) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
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

impl LogLevel {
    /// The level as a `tracing` filter directive.
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
