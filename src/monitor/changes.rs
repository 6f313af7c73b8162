// src/monitor/changes.rs

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Kind of difference between two snapshots for one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ChangeKind {
    /// Present now, absent from the previous snapshot.
    Added,
    /// Present before, absent now.
    Removed,
    /// Present in both with a different modification time.
    Modified,
}

impl ChangeKind {
    pub fn describe(self) -> &'static str {
        match self {
            ChangeKind::Added => "file added",
            ChangeKind::Removed => "file removed",
            ChangeKind::Modified => "file modified",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Added => write!(f, "+"),
            ChangeKind::Removed => write!(f, "-"),
            ChangeKind::Modified => write!(f, "~"),
        }
    }
}

/// A single changed path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Change<'a> {
    pub path: &'a Path,
    pub kind: ChangeKind,
}

/// Differences between two snapshots, split into three disjoint sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub added: BTreeSet<PathBuf>,
    pub removed: BTreeSet<PathBuf>,
    pub modified: BTreeSet<PathBuf>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }

    pub fn len(&self) -> usize {
        self.added.len() + self.removed.len() + self.modified.len()
    }

    /// Every change, ordered by kind and then path.
    pub fn iter(&self) -> impl Iterator<Item = Change<'_>> {
        tagged(&self.added, ChangeKind::Added)
            .chain(tagged(&self.removed, ChangeKind::Removed))
            .chain(tagged(&self.modified, ChangeKind::Modified))
    }
}

fn tagged(set: &BTreeSet<PathBuf>, kind: ChangeKind) -> impl Iterator<Item = Change<'_>> {
    set.iter().map(move |path| Change {
        path: path.as_path(),
        kind,
    })
}
