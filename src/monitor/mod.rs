// src/monitor/mod.rs

//! Polling change detection.
//!
//! Each cycle takes a full [`DirectorySnapshot`] of the watched directory,
//! diffs it against the previous one and rebuilds the archive when anything
//! was added, removed or modified. There is no debouncing and no content
//! hashing: a changed modification time is a change.
//!
//! The pure state machine lives in [`core`]; the polling shell is in
//! [`runtime`].

pub mod changes;
pub mod core;
pub mod runtime;
pub mod snapshot;

pub use changes::{Change, ChangeKind, ChangeSet};
pub use self::core::{CycleDecision, MonitorCore, MonitorStats};
pub use runtime::{
    ArchiveJob, CycleOutcome, CycleReport, DEFAULT_INTERVAL, Monitor, MonitorEvent,
    MonitorOptions, Rebuild,
};
pub use snapshot::DirectorySnapshot;
