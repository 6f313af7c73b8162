// src/archive/mod.rs

//! Archive construction.
//!
//! Turns a directory tree into a JAR-compatible ZIP file:
//! - every regular file becomes one entry named by its `/`-separated path
//!   relative to the source root,
//! - the output file itself is never archived,
//! - a `META-INF/MANIFEST.MF` entry is injected when the tree has none.
//!
//! Every build rewrites the whole archive.

use std::path::{Component, Path};

use crate::fs::FileSystem;

pub mod archiver;
pub mod entries;
pub mod exclude;

pub use archiver::{ArchiveOptions, ArchiveReport, Archiver, ResolvedPaths};
pub use entries::{collect_entries, relative_name, ArchiveEntry, ArchivePlan};
pub use exclude::ExcludeSet;

/// Entry name of the JAR manifest.
pub const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";

/// Payload used when the source tree has no manifest of its own.
pub const MANIFEST_CONTENT: &str = "Manifest-Version: 1.0\nCreated-By: jarsync\n";

/// Default output file name for a source directory: `<basename>.jar`.
///
/// `.` and `..` are resolved through `fs`, so
/// `./app/` and `app` both give `app.jar`. Falls back to `archive.jar` when
/// no name can be found (e.g. `/`).
pub fn default_output_name(fs: &dyn FileSystem, source: &Path) -> String {
    let lexical = match source.components().next_back() {
        Some(Component::Normal(name)) => name.to_str().map(str::to_owned),
        _ => None,
    };
    let name = lexical.or_else(|| {
        fs.canonicalize(source)
            .ok()
            .and_then(|p| p.file_name().and_then(|n| n.to_str()).map(str::to_owned))
    });
    match name {
        Some(n) if !n.is_empty() => format!("{n}.jar"),
        _ => "archive.jar".to_string(),
    }
}
