// src/lib.rs

pub mod archive;
pub mod cli;
pub mod config;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod monitor;
pub mod prompt;
pub mod types;

use std::io::{StdinLock, Stdout};
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::archive::archiver::format_bytes;
use crate::archive::{Archiver, ResolvedPaths};
use crate::cli::CliArgs;
use crate::config::{load_optional, resolve_settings, Settings};
use crate::fs::{FileSystem, RealFileSystem};
use crate::monitor::{ArchiveJob, Monitor, MonitorEvent, MonitorOptions};
use crate::prompt::Prompter;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and interactive input
/// - the initial archive build (fatal on failure)
/// - (optional) the change monitor
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_optional(args.config.as_deref().map(Path::new))?;
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);

    let settings = if args.no_prompt {
        resolve_settings::<StdinLock<'static>, Stdout>(&args, &cfg, &*fs, None)?
    } else {
        println!("=== jarsync: directory to JAR packager ===");
        let mut prompter = Prompter::new(std::io::stdin().lock(), std::io::stdout());
        resolve_settings(&args, &cfg, &*fs, Some(&mut prompter))?
    };

    let archiver = Archiver::new(Arc::clone(&fs), settings.archive.clone());
    let paths = archiver.validate(&settings.source, &settings.output)?;

    if args.dry_run {
        print_dry_run(&archiver, &paths, &settings)?;
        return Ok(());
    }

    let report = archiver.build(&paths.source, &paths.output)?;
    println!(
        "Archive created: {} ({} entries, {}, {:.2}s)",
        report.output.display(),
        report.entries,
        format_bytes(report.bytes),
        report.elapsed.as_secs_f64()
    );

    if !settings.watch {
        debug!("watching not requested; done");
        return Ok(());
    }

    let (tx, rx) = mpsc::channel::<MonitorEvent>(8);

    // Ctrl-C → graceful shutdown.
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("failed to listen for Ctrl+C: {e}");
            return;
        }
        let _ = tx.send(MonitorEvent::ShutdownRequested).await;
    });

    let options = MonitorOptions {
        interval: settings.interval,
        exclude: settings.archive.exclude.clone(),
        excluded_output: Some(paths.output.clone()),
    };
    let root = paths.source.clone();
    let monitor = Monitor::new(fs, root, options, ArchiveJob::new(archiver, paths))?;

    println!(
        "Watching {} every {}s. Press Ctrl+C to stop.",
        settings.source.display(),
        settings.interval.as_secs()
    );

    let core = monitor.run(rx).await;
    info!(state = %core.state(), "monitor finished");
    println!("Monitoring stopped.");
    Ok(())
}

/// Dry-run output: resolved paths, options and the entry list.
fn print_dry_run(archiver: &Archiver, paths: &ResolvedPaths, settings: &Settings) -> Result<()> {
    let plan = archiver.plan(paths)?;
    let options = archiver.options();

    println!("jarsync dry-run");
    println!("  source      = {}", paths.source.display());
    println!("  output      = {}", paths.output.display());
    println!("  compression = {:?}", options.compression);
    println!("  atomic      = {}", options.atomic);
    if !options.exclude.patterns().is_empty() {
        println!("  exclude     = {:?}", options.exclude.patterns());
    }
    if settings.watch {
        println!("  watch every {}s", settings.interval.as_secs());
    }
    println!();

    println!("entries ({}):", plan.len());
    for name in plan.entry_names() {
        println!("  {name}");
    }
    if plan.synthesize_manifest {
        println!("(manifest will be generated)");
    }

    debug!("dry-run complete (nothing written)");
    Ok(())
}
