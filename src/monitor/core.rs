// src/monitor/core.rs

//! Pure monitor state machine.
//!
//! `MonitorCore` owns the baseline snapshot and the `Idle` / `Rebuilding` /
//! `Stopped` state. It is fed fresh snapshots and rebuild outcomes and decides
//! what the IO shell (`monitor::runtime::Monitor`) should do next. It never
//! touches the filesystem, so it can be tested with hand-built snapshots.

use crate::monitor::changes::ChangeSet;
use crate::monitor::snapshot::DirectorySnapshot;
use crate::types::MonitorState;

/// Counters kept across the monitor's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorStats {
    /// Polls that produced a snapshot.
    pub cycles: u64,
    /// Rebuilds attempted, successful or not.
    pub rebuilds: u64,
    pub failed_rebuilds: u64,
}

/// What one observed snapshot means for the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleDecision {
    pub changes: ChangeSet,
    /// True when the archive must be rebuilt before the next poll.
    pub rebuild: bool,
}

#[derive(Debug)]
pub struct MonitorCore {
    baseline: DirectorySnapshot,
    state: MonitorState,
    stats: MonitorStats,
}

impl MonitorCore {
    pub fn new(baseline: DirectorySnapshot) -> Self {
        Self {
            baseline,
            state: MonitorState::Idle,
            stats: MonitorStats::default(),
        }
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn baseline(&self) -> &DirectorySnapshot {
        &self.baseline
    }

    pub fn stats(&self) -> MonitorStats {
        self.stats
    }

    /// Compare `fresh` with the baseline and adopt it as the new baseline.
    ///
    /// The baseline is replaced even when a rebuild follows and later fails,
    /// so a failed rebuild is only retried if the tree changes again.
    pub fn observe(&mut self, fresh: DirectorySnapshot) -> CycleDecision {
        if self.state == MonitorState::Stopped {
            return CycleDecision {
                changes: ChangeSet::default(),
                rebuild: false,
            };
        }

        self.stats.cycles += 1;
        let changes = self.baseline.diff(&fresh);
        self.baseline = fresh;

        let rebuild = !changes.is_empty();
        if rebuild {
            self.state = MonitorState::Rebuilding;
        }
        CycleDecision { changes, rebuild }
    }

    /// Record the end of a rebuild and return to `Idle`.
    pub fn rebuild_finished(&mut self, succeeded: bool) {
        if self.state != MonitorState::Rebuilding {
            return;
        }
        self.stats.rebuilds += 1;
        if !succeeded {
            self.stats.failed_rebuilds += 1;
        }
        self.state = MonitorState::Idle;
    }

    /// Enter the terminal `Stopped` state.
    pub fn stop(&mut self) {
        self.state = MonitorState::Stopped;
    }
}
