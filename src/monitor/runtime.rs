// src/monitor/runtime.rs

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::archive::archiver::format_bytes;
use crate::archive::{ArchiveReport, Archiver, ExcludeSet, ResolvedPaths};
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::monitor::changes::ChangeSet;
use crate::monitor::core::MonitorCore;
use crate::monitor::snapshot::DirectorySnapshot;
use crate::types::MonitorState;

/// Poll interval used when none is configured.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Something that can rebuild the archive on demand.
///
/// The monitor calls this synchronously and waits for it to return before
/// polling again.
pub trait Rebuild {
    fn rebuild(&mut self) -> Result<ArchiveReport>;
}

/// Production rebuilder: the archiver bound to one source/output pair.
#[derive(Debug)]
pub struct ArchiveJob {
    archiver: Archiver,
    paths: ResolvedPaths,
}

impl ArchiveJob {
    pub fn new(archiver: Archiver, paths: ResolvedPaths) -> Self {
        Self { archiver, paths }
    }
}

impl Rebuild for ArchiveJob {
    fn rebuild(&mut self) -> Result<ArchiveReport> {
        self.archiver.build(&self.paths.source, &self.paths.output)
    }
}

/// Control messages for a running monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorEvent {
    /// Poll immediately instead of waiting for the interval.
    PollNow,
    /// Stop after the current cycle (e.g. Ctrl-C).
    ShutdownRequested,
}

#[derive(Debug, Clone)]
pub struct MonitorOptions {
    pub interval: Duration,
    /// Same patterns the archiver uses, so excluded files never trigger.
    pub exclude: ExcludeSet,
    /// The archive itself; rewriting it must not look like a change.
    pub excluded_output: Option<PathBuf>,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            exclude: ExcludeSet::default(),
            excluded_output: None,
        }
    }
}

/// How a single poll ended.
#[derive(Debug)]
pub enum CycleOutcome {
    Unchanged,
    Rebuilt(ArchiveReport),
    /// The rebuild failed; the previous archive (if any) is still on disk.
    RebuildFailed(String),
    /// The directory could not be scanned; the baseline was kept.
    ScanFailed(String),
}

#[derive(Debug)]
pub struct CycleReport {
    pub changes: ChangeSet,
    pub outcome: CycleOutcome,
}

impl CycleReport {
    /// Whether a rebuild was attempted in this cycle.
    pub fn rebuild_attempted(&self) -> bool {
        matches!(
            self.outcome,
            CycleOutcome::Rebuilt(_) | CycleOutcome::RebuildFailed(_)
        )
    }
}

/// Polling loop that keeps an archive in sync with a directory.
///
/// This is the IO shell around [`MonitorCore`]: it scans the filesystem,
/// reports changes, calls the rebuilder and sleeps between polls.
pub struct Monitor<R: Rebuild> {
    fs: Arc<dyn FileSystem>,
    root: PathBuf,
    options: MonitorOptions,
    core: MonitorCore,
    rebuilder: R,
}

impl<R: Rebuild> fmt::Debug for Monitor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Monitor")
            .field("root", &self.root)
            .field("interval", &self.options.interval)
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<R: Rebuild> Monitor<R> {
    /// Take the baseline snapshot of `root` and build an idle monitor.
    pub fn new(
        fs: Arc<dyn FileSystem>,
        root: impl Into<PathBuf>,
        options: MonitorOptions,
        rebuilder: R,
    ) -> Result<Self> {
        let root = root.into();
        let baseline = DirectorySnapshot::scan(
            &*fs,
            &root,
            options.excluded_output.as_deref(),
            &options.exclude,
        )?;
        debug!(files = baseline.len(), root = ?root, "baseline snapshot taken");

        Ok(Self {
            fs,
            root,
            options,
            core: MonitorCore::new(baseline),
            rebuilder,
        })
    }

    pub fn state(&self) -> MonitorState {
        self.core.state()
    }

    pub fn core(&self) -> &MonitorCore {
        &self.core
    }

    pub fn rebuilder(&self) -> &R {
        &self.rebuilder
    }

    /// Run one cycle: scan, diff, report, and rebuild if anything changed.
    ///
    /// Never fails: scan and rebuild errors are logged and reflected in the
    /// returned report so the loop can carry on.
    pub fn poll_once(&mut self) -> CycleReport {
        let fresh = match DirectorySnapshot::scan(
            &*self.fs,
            &self.root,
            self.options.excluded_output.as_deref(),
            &self.options.exclude,
        ) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(root = ?self.root, error = %e, "scan failed; keeping previous snapshot");
                return CycleReport {
                    changes: ChangeSet::default(),
                    outcome: CycleOutcome::ScanFailed(e.to_string()),
                };
            }
        };

        let decision = self.core.observe(fresh);
        if !decision.rebuild {
            debug!("no changes");
            return CycleReport {
                changes: decision.changes,
                outcome: CycleOutcome::Unchanged,
            };
        }

        for change in decision.changes.iter() {
            info!(path = ?change.path, "{}", change.kind.describe());
        }
        info!(changes = decision.changes.len(), "rebuilding archive");

        let outcome = match self.rebuilder.rebuild() {
            Ok(report) => {
                info!(
                    output = ?report.output,
                    size = %format_bytes(report.bytes),
                    "archive updated"
                );
                self.core.rebuild_finished(true);
                CycleOutcome::Rebuilt(report)
            }
            Err(e) => {
                error!(error = %e, "archive rebuild failed");
                self.core.rebuild_finished(false);
                CycleOutcome::RebuildFailed(e.to_string())
            }
        };

        CycleReport {
            changes: decision.changes,
            outcome,
        }
    }

    /// [`poll_once`](Self::poll_once) from inside the async loop.
    ///
    /// A cycle walks the tree and may write a whole archive, so on a
    /// multi-threaded runtime the worker is handed over to blocking work for
    /// its duration. A current-thread runtime has no other worker to hand
    /// over to, so the cycle runs inline there.
    fn poll_blocking(&mut self) -> CycleReport {
        match Handle::current().runtime_flavor() {
            RuntimeFlavor::MultiThread => tokio::task::block_in_place(|| self.poll_once()),
            _ => self.poll_once(),
        }
    }

    /// Poll until `ShutdownRequested` arrives, then return the final core.
    ///
    /// Between cycles the loop waits for the interval or for an event,
    /// whichever comes first. If the event channel closes, polling continues
    /// on the interval alone.
    pub async fn run(mut self, mut events: mpsc::Receiver<MonitorEvent>) -> MonitorCore {
        info!(
            root = ?self.root,
            interval_secs = self.options.interval.as_secs_f64(),
            "monitoring started"
        );

        let mut events_open = true;
        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.options.interval) => {}
                event = events.recv(), if events_open => match event {
                    Some(MonitorEvent::PollNow) => debug!("poll requested"),
                    Some(MonitorEvent::ShutdownRequested) => break,
                    None => {
                        debug!("monitor event channel closed; polling on interval only");
                        events_open = false;
                        continue;
                    }
                },
            }

            self.poll_blocking();
        }

        self.core.stop();
        let stats = self.core.stats();
        info!(
            cycles = stats.cycles,
            rebuilds = stats.rebuilds,
            failed = stats.failed_rebuilds,
            "monitoring stopped"
        );
        self.core
    }
}
