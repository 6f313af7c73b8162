// src/logging.rs

//! Logging setup for `jarsync` using `tracing` + `tracing-subscriber`.
//!
//! The filter comes from, in order:
//! 1. `--log-level` on the command line
//! 2. `JARSYNC_LOG`, which takes full filter directives
//!    (e.g. `debug` or `info,jarsync::monitor=trace`)
//! 3. `info`
//!
//! Logs go to STDERR; prompts and the dry-run plan use STDOUT.

use anyhow::Result;
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

/// Environment variable consulted when `--log-level` is not given.
pub const LOG_ENV_VAR: &str = "JARSYNC_LOG";

const DEFAULT_DIRECTIVE: &str = "info";

/// Install the global subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env = std::env::var(LOG_ENV_VAR).ok();

    fmt()
        .with_env_filter(build_filter(cli_level, env.as_deref()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))?;

    Ok(())
}

/// Pick the filter for a CLI level and the raw value of [`LOG_ENV_VAR`].
///
/// A CLI level wins outright. Blank or invalid env directives fall back to
/// `info`; the invalid case is reported on stderr since logging is not up yet.
pub fn build_filter(cli_level: Option<LogLevel>, env: Option<&str>) -> EnvFilter {
    if let Some(level) = cli_level {
        return EnvFilter::new(level.as_directive());
    }

    match env.map(str::trim).filter(|s| !s.is_empty()) {
        Some(directives) => EnvFilter::try_new(directives).unwrap_or_else(|e| {
            eprintln!("ignoring invalid {LOG_ENV_VAR}={directives:?}: {e}");
            EnvFilter::new(DEFAULT_DIRECTIVE)
        }),
        None => EnvFilter::new(DEFAULT_DIRECTIVE),
    }
}
