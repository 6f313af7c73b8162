use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use jarsync::archive::ArchiveReport;
use jarsync::errors::{JarsyncError, Result};
use jarsync::monitor::Rebuild;

/// A fake rebuilder that:
/// - counts how often it was called
/// - succeeds, or fails with an `ArchiveError` while `fail` is set.
///
/// Clones share the counters, so a test can keep one handle while the
/// monitor owns another.
#[derive(Debug, Clone, Default)]
pub struct FakeRebuilder {
    calls: Arc<AtomicUsize>,
    fail: Arc<AtomicBool>,
}

impl FakeRebuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl Rebuild for FakeRebuilder {
    fn rebuild(&mut self) -> Result<ArchiveReport> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(JarsyncError::ArchiveError {
                context: "fake rebuild".to_string(),
                source: std::io::Error::other("disk full"),
            });
        }
        Ok(ArchiveReport {
            output: PathBuf::from("/fake/out.jar"),
            entries: 0,
            manifest_synthesized: true,
            bytes: 0,
            elapsed: Duration::ZERO,
        })
    }
}
