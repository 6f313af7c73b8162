// src/config/resolve.rs

//! Merge the three input layers into one [`Settings`] value.
//!
//! Precedence, highest first: CLI flag, config file, interactive prompt,
//! built-in default.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;

use crate::archive::{default_output_name, ArchiveOptions};
use crate::cli::CliArgs;
use crate::config::model::ConfigFile;
use crate::errors::{JarsyncError, Result};
use crate::fs::FileSystem;
use crate::monitor::DEFAULT_INTERVAL;
use crate::prompt::Prompter;

/// Everything the run needs, fully decided.
#[derive(Debug, Clone)]
pub struct Settings {
    pub source: PathBuf,
    pub output: PathBuf,
    pub watch: bool,
    pub interval: Duration,
    pub archive: ArchiveOptions,
}

/// Decide every input, asking `prompter` for whatever is still missing.
///
/// With no prompter, a missing source is a `PathError` and every other input
/// takes its default (no watching, 5 second interval). The source is checked
/// right after it is known so the user is not asked further questions about a
/// directory that does not exist.
pub fn resolve_settings<R: BufRead, W: Write>(
    args: &CliArgs,
    cfg: &ConfigFile,
    fs: &dyn FileSystem,
    mut prompter: Option<&mut Prompter<R, W>>,
) -> Result<Settings> {
    let source = match args.source.clone().or_else(|| cfg.archive.source.clone()) {
        Some(s) => s,
        None => match prompter.as_deref_mut() {
            Some(p) => p
                .ask("Directory to package: ")?
                .filter(|s| !s.is_empty())
                .ok_or_else(|| JarsyncError::PathError("no source directory given".into()))?,
            None => {
                return Err(JarsyncError::PathError(
                    "no source directory given (pass SOURCE or set [archive].source)".into(),
                ));
            }
        },
    };
    let source = PathBuf::from(source);
    if !fs.is_dir(&source) {
        return Err(JarsyncError::PathError(format!(
            "directory {:?} does not exist or is not a directory",
            source
        )));
    }

    let default_output = default_output_name(fs, &source);
    let output = match args.output.clone().or_else(|| cfg.archive.output.clone()) {
        Some(o) => o,
        None => match prompter.as_deref_mut() {
            Some(p) => p.ask_or(
                &format!("Archive path (default {default_output}): "),
                &default_output,
            )?,
            None => default_output,
        },
    };

    let watch = match args.watch_choice().or(cfg.monitor.watch) {
        Some(w) => w,
        None => match prompter.as_deref_mut() {
            Some(p) => p.ask_yes_no("Keep the archive updated when files change?", false)?,
            None => false,
        },
    };

    let default_secs = DEFAULT_INTERVAL.as_secs();
    let interval_secs = match args.interval.or(cfg.monitor.interval_secs) {
        Some(secs) => secs,
        None => match prompter.as_deref_mut() {
            Some(p) if watch => p.ask_positive(
                &format!("Polling interval in seconds (default {default_secs}): "),
                default_secs,
            )?,
            _ => default_secs,
        },
    };
    if interval_secs == 0 {
        return Err(JarsyncError::ConfigError(
            "polling interval must be >= 1 second".to_string(),
        ));
    }

    let settings = Settings {
        source,
        output: PathBuf::from(output),
        watch,
        interval: Duration::from_secs(interval_secs),
        archive: ArchiveOptions {
            compression: cfg.archive.compression,
            exclude: cfg.exclude().clone(),
            allow_nested_output: cfg.archive.allow_nested_output,
            atomic: cfg.archive.atomic,
        },
    };
    debug!(?settings, "resolved settings");
    Ok(settings)
}
