// src/monitor/snapshot.rs

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

use crate::archive::{collect_entries, ExcludeSet};
use crate::fs::FileSystem;
use crate::monitor::changes::ChangeSet;

/// Modification times of every tracked file under a directory, keyed by
/// absolute path.
///
/// A snapshot is an immutable value: each poll builds a fresh one and the
/// monitor swaps it in as the new baseline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectorySnapshot {
    files: BTreeMap<PathBuf, SystemTime>,
}

impl DirectorySnapshot {
    /// Full recursive scan of `root`.
    ///
    /// Uses the same selection as the archiver: `excluded_output` and paths
    /// matching `exclude` are left out. A file that disappears between the
    /// walk and its `stat` is treated as absent.
    pub fn scan(
        fs: &dyn FileSystem,
        root: &Path,
        excluded_output: Option<&Path>,
        exclude: &ExcludeSet,
    ) -> io::Result<Self> {
        let mut files = BTreeMap::new();
        for entry in collect_entries(fs, root, excluded_output, exclude)? {
            match fs.modified(&entry.path) {
                Ok(modified) => {
                    files.insert(entry.path, modified);
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    debug!(path = ?entry.path, "file vanished during scan");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(Self { files })
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn get(&self, path: &Path) -> Option<SystemTime> {
        self.files.get(path).copied()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }

    /// Classify every path that differs between `self` (the previous
    /// snapshot) and `current`.
    ///
    /// Only modification times are compared; content is never read.
    pub fn diff(&self, current: &DirectorySnapshot) -> ChangeSet {
        let mut changes = ChangeSet::default();

        for (path, before) in &self.files {
            match current.files.get(path) {
                Some(now) if now != before => {
                    changes.modified.insert(path.clone());
                }
                Some(_) => {}
                None => {
                    changes.removed.insert(path.clone());
                }
            }
        }

        for path in current.files.keys() {
            if !self.files.contains_key(path) {
                changes.added.insert(path.clone());
            }
        }

        changes
    }
}

impl FromIterator<(PathBuf, SystemTime)> for DirectorySnapshot {
    fn from_iter<I: IntoIterator<Item = (PathBuf, SystemTime)>>(iter: I) -> Self {
        Self {
            files: iter.into_iter().collect(),
        }
    }
}
