// src/archive/archiver.rs

use std::ffi::OsString;
use std::io::{self, Seek, Write};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};
use zip::result::ZipError;
use zip::write::FileOptions;
use zip::ZipWriter;

use crate::archive::entries::{collect_entries, ArchivePlan};
use crate::archive::exclude::ExcludeSet;
use crate::archive::{MANIFEST_CONTENT, MANIFEST_PATH};
use crate::errors::{JarsyncError, Result};
use crate::fs::FileSystem;
use crate::types::Compression;

/// Entries at or above this size need the ZIP64 extension.
const ZIP64_THRESHOLD: u64 = u32::MAX as u64;

/// Knobs for archive construction.
#[derive(Debug, Clone)]
pub struct ArchiveOptions {
    pub compression: Compression,
    pub exclude: ExcludeSet,
    /// Accept an output path inside the source directory. The output file is
    /// then skipped during the walk instead of being rejected up front.
    pub allow_nested_output: bool,
    /// Write to a temporary sibling and rename over the output on success.
    pub atomic: bool,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            compression: Compression::default(),
            exclude: ExcludeSet::default(),
            allow_nested_output: false,
            atomic: true,
        }
    }
}

/// Source and output after validation, both absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub source: PathBuf,
    pub output: PathBuf,
}

impl ResolvedPaths {
    pub fn output_is_nested(&self) -> bool {
        self.output.starts_with(&self.source)
    }
}

/// Result of a successful build. Informational only.
#[derive(Debug, Clone)]
pub struct ArchiveReport {
    pub output: PathBuf,
    /// Number of entries written, manifest included.
    pub entries: usize,
    pub manifest_synthesized: bool,
    /// Size of the finished archive on disk.
    pub bytes: u64,
    pub elapsed: Duration,
}

/// Builds ZIP archives from directory trees.
#[derive(Debug, Clone)]
pub struct Archiver {
    fs: Arc<dyn FileSystem>,
    options: ArchiveOptions,
}

impl Archiver {
    pub fn new(fs: Arc<dyn FileSystem>, options: ArchiveOptions) -> Self {
        Self { fs, options }
    }

    pub fn options(&self) -> &ArchiveOptions {
        &self.options
    }

    pub fn fs(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    /// Check the source/output pair and resolve both to absolute paths.
    ///
    /// Symlinks and `..` are resolved on both sides before the nesting check,
    /// including for output directories that do not exist yet.
    ///
    /// Fails with `PathError` when:
    /// - `source` is missing or not a directory,
    /// - `output` is a directory or the source itself,
    /// - `output` lies inside `source` and nesting is not allowed.
    ///
    /// Nothing on disk is touched.
    pub fn validate(&self, source: &Path, output: &Path) -> Result<ResolvedPaths> {
        if !self.fs.is_dir(source) {
            return Err(JarsyncError::PathError(format!(
                "source directory {:?} does not exist or is not a directory",
                source
            )));
        }
        let source = self.fs.canonicalize(source).map_err(|e| {
            JarsyncError::PathError(format!("cannot resolve source {:?}: {e}", source))
        })?;
        let output = absolute_output(&*self.fs, output)?;

        if output == source || self.fs.is_dir(&output) {
            return Err(JarsyncError::PathError(format!(
                "output {:?} is a directory",
                output
            )));
        }

        let resolved = ResolvedPaths { source, output };
        if resolved.output_is_nested() && !self.options.allow_nested_output {
            return Err(JarsyncError::PathError(format!(
                "output {:?} is inside the source directory {:?}",
                resolved.output, resolved.source
            )));
        }

        Ok(resolved)
    }

    /// Walk the source tree and decide what the archive will contain.
    pub fn plan(&self, paths: &ResolvedPaths) -> Result<ArchivePlan> {
        let entries = collect_entries(
            &*self.fs,
            &paths.source,
            Some(&paths.output),
            &self.options.exclude,
        )
        .map_err(|e| JarsyncError::archive(format!("walking {:?}", paths.source), e))?;

        let synthesize_manifest = !entries.iter().any(|e| e.name == MANIFEST_PATH);

        Ok(ArchivePlan {
            source: paths.source.clone(),
            entries,
            synthesize_manifest,
        })
    }

    /// Write the archive described by `plan` into `writer`.
    ///
    /// Returns the writer after the central directory has been written.
    pub fn write_to<W: Write + Seek>(&self, plan: &ArchivePlan, writer: W) -> Result<W> {
        let mut zip = ZipWriter::new(writer);
        let options = FileOptions::default()
            .compression_method(self.options.compression.method())
            .unix_permissions(0o644);

        if plan.synthesize_manifest {
            zip.start_file(MANIFEST_PATH, options)
                .map_err(|e| zip_error(MANIFEST_PATH, e))?;
            zip.write_all(MANIFEST_CONTENT.as_bytes())
                .map_err(|e| JarsyncError::archive(MANIFEST_PATH, e))?;
        }

        for entry in &plan.entries {
            let context = || format!("archiving {:?}", entry.path);

            let size = self
                .fs
                .len(&entry.path)
                .map_err(|e| JarsyncError::archive(context(), e))?;
            let mut reader = self
                .fs
                .open_read(&entry.path)
                .map_err(|e| JarsyncError::archive(context(), e))?;

            zip.start_file(
                entry.name.as_str(),
                options.large_file(size >= ZIP64_THRESHOLD),
            )
            .map_err(|e| zip_error(&context(), e))?;
            io::copy(&mut reader, &mut zip).map_err(|e| JarsyncError::archive(context(), e))?;

            debug!(entry = %entry.name, size, "archived entry");
        }

        zip.finish().map_err(|e| zip_error("finishing archive", e))
    }

    /// Validate, then write the archive for `source` to `output` on disk.
    ///
    /// An existing output is replaced. With `atomic` the previous archive
    /// survives any failure; without it the output may be left partial.
    pub fn build(&self, source: &Path, output: &Path) -> Result<ArchiveReport> {
        let started = Instant::now();
        let paths = self.validate(source, output)?;
        let plan = self.plan(&paths)?;

        if let Some(parent) = paths.output.parent() {
            self.fs.create_dir_all(parent).map_err(|e| {
                JarsyncError::archive(format!("creating output directory {:?}", parent), e)
            })?;
        }

        if self.options.atomic {
            let tmp = temp_path_for(&paths.output);
            let result = self.write_file(&plan, &tmp).and_then(|()| {
                self.fs.rename(&tmp, &paths.output).map_err(|e| {
                    JarsyncError::archive(format!("replacing {:?}", paths.output), e)
                })
            });
            if result.is_err() {
                self.discard_temp(&tmp);
            }
            result?;
        } else {
            self.write_file(&plan, &paths.output)?;
        }

        let bytes = self
            .fs
            .len(&paths.output)
            .map_err(|e| JarsyncError::archive(format!("reading {:?}", paths.output), e))?;

        let report = ArchiveReport {
            output: paths.output,
            entries: plan.len(),
            manifest_synthesized: plan.synthesize_manifest,
            bytes,
            elapsed: started.elapsed(),
        };

        info!(
            output = ?report.output,
            entries = report.entries,
            size = %format_bytes(report.bytes),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "archive written"
        );

        Ok(report)
    }

    fn write_file(&self, plan: &ArchivePlan, path: &Path) -> Result<()> {
        let file = self
            .fs
            .create(path)
            .map_err(|e| JarsyncError::archive(format!("creating {:?}", path), e))?;
        let mut writer = self.write_to(plan, file)?;
        writer
            .sync()
            .map_err(|e| JarsyncError::archive(format!("flushing {:?}", path), e))
    }

    /// Best-effort removal of a temporary archive after a failed build.
    fn discard_temp(&self, tmp: &Path) {
        match self.fs.remove_file(tmp) {
            Ok(()) => debug!(path = ?tmp, "removed temporary archive"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                path = ?tmp,
                error = %e,
                "could not remove temporary archive; delete it by hand"
            ),
        }
    }
}

/// Resolve `output` to an absolute, symlink-free path without requiring it
/// to exist.
///
/// The deepest existing ancestor is canonicalized and the missing tail is
/// appended to it. A `..` in that missing tail cannot be resolved reliably and
/// is rejected.
fn absolute_output(fs: &dyn FileSystem, output: &Path) -> Result<PathBuf> {
    if let Ok(path) = fs.canonicalize(output) {
        return Ok(path);
    }

    let unresolved = |reason: String| {
        JarsyncError::PathError(format!("cannot resolve output {:?}: {reason}", output))
    };
    let absolute = std::path::absolute(output).map_err(|e| unresolved(e.to_string()))?;

    let mut missing: Vec<OsString> = Vec::new();
    let mut cursor = absolute.as_path();
    loop {
        if let Ok(mut resolved) = fs.canonicalize(cursor) {
            for name in missing.iter().rev() {
                resolved.push(name);
            }
            return Ok(resolved);
        }

        match cursor.components().next_back() {
            Some(Component::Normal(name)) => missing.push(name.to_os_string()),
            Some(Component::ParentDir) => {
                return Err(unresolved(format!(
                    "'..' follows {:?}, which does not exist",
                    cursor.parent().unwrap_or(cursor)
                )));
            }
            _ => return Err(unresolved("no existing ancestor directory".to_string())),
        }
        cursor = cursor
            .parent()
            .ok_or_else(|| unresolved("no existing ancestor directory".to_string()))?;
    }
}

/// `<dir>/.<name>.tmp-<pid>` next to the final output.
fn temp_path_for(output: &Path) -> PathBuf {
    let name = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    output.with_file_name(format!(".{name}.tmp-{}", std::process::id()))
}

fn zip_error(context: &str, err: ZipError) -> JarsyncError {
    let source = match err {
        ZipError::Io(e) => e,
        other => io::Error::other(other),
    };
    JarsyncError::archive(context, source)
}

/// Format a byte count as a human-readable string.
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    const GB: u64 = 1024 * MB;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}
