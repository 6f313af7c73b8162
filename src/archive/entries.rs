// src/archive/entries.rs

//! Building the list of entries an archive will contain.

use std::io;
use std::path::{Path, PathBuf};

use crate::archive::exclude::ExcludeSet;
use crate::archive::MANIFEST_PATH;
use crate::fs::FileSystem;

/// One file to be archived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Entry name inside the archive, `/`-separated and relative to the root.
    pub name: String,
    /// Absolute path of the source file.
    pub path: PathBuf,
}

/// Everything needed to write one archive.
#[derive(Debug, Clone)]
pub struct ArchivePlan {
    pub source: PathBuf,
    pub entries: Vec<ArchiveEntry>,
    /// True when the tree has no manifest and one will be injected.
    pub synthesize_manifest: bool,
}

impl ArchivePlan {
    /// Names of every entry the archive will hold, manifest first.
    pub fn entry_names(&self) -> Vec<&str> {
        let mut names = Vec::with_capacity(self.entries.len() + 1);
        if self.synthesize_manifest {
            names.push(MANIFEST_PATH);
        }
        names.extend(self.entries.iter().map(|e| e.name.as_str()));
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len() + usize::from(self.synthesize_manifest)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// Returns `None` if `path` is not below `root`.
pub fn relative_name(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    if rel.as_os_str().is_empty() {
        return None;
    }
    Some(rel.to_string_lossy().replace('\\', "/"))
}

/// Walk `root` and return the archive entries, sorted by name.
///
/// - `excluded_output` (absolute) is skipped so an archive written inside its
///   own source tree never contains itself.
/// - Paths matching `exclude` are skipped, except the manifest.
/// - An existing manifest is moved to the front, where JAR readers expect it.
pub fn collect_entries(
    fs: &dyn FileSystem,
    root: &Path,
    excluded_output: Option<&Path>,
    exclude: &ExcludeSet,
) -> io::Result<Vec<ArchiveEntry>> {
    let mut entries = Vec::new();

    for path in fs.walk_files(root)? {
        if excluded_output.is_some_and(|out| out == path) {
            continue;
        }
        let Some(name) = relative_name(root, &path) else {
            continue;
        };
        if name != MANIFEST_PATH && exclude.is_excluded(&name) {
            continue;
        }
        entries.push(ArchiveEntry { name, path });
    }

    entries.sort_by(|a, b| {
        (a.name != MANIFEST_PATH)
            .cmp(&(b.name != MANIFEST_PATH))
            .then_with(|| a.name.cmp(&b.name))
    });
    Ok(entries)
}
